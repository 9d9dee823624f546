//! # Email rendering
//!
//! Turns a `Notification` into a ready-to-send HTML email. Dates are shown
//! in UTC with English month and weekday names.

use askama::Template;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use domains::{ClaimExpired, ClaimReceived, Notification, NotifyError, DEFAULT_WINDOW_HOURS};

pub const CLAIM_RECEIVED_SUBJECT: &str = "Lost & Found: Item Claim Verification";
pub const CLAIM_EXPIRED_SUBJECT: &str = "Lost & Found: Your Claim Has Expired";

/// Sender identity and the facts every email mentions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub from_name: String,
    pub from_email: String,
    pub portal_url: String,
    pub verification_desk: String,
    pub window_hours: i64,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            from_name: "Lost and Found".to_string(),
            from_email: "lostfound@localhost".to_string(),
            portal_url: "http://localhost:5173/lost-items".to_string(),
            verification_desk: "Security Counter, A1 Building".to_string(),
            window_hours: DEFAULT_WINDOW_HOURS,
        }
    }
}

impl MailSettings {
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Template)]
#[template(path = "claim_received.html")]
struct ClaimReceivedTemplate<'a> {
    team_name: &'a str,
    claimant_name: &'a str,
    role: &'a str,
    item_name: &'a str,
    verification_date: String,
    verification_time: String,
    verification_desk: &'a str,
    found_location: &'a str,
    year: i32,
}

#[derive(Template)]
#[template(path = "claim_expired.html")]
struct ClaimExpiredTemplate<'a> {
    team_name: &'a str,
    claimant_name: &'a str,
    item_name: &'a str,
    category: &'a str,
    location: &'a str,
    found_date: String,
    claim_date: String,
    portal_url: &'a str,
    window_hours: i64,
}

/// "Monday, March 11, 2024"
fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// "09:00 AM UTC"
fn clock_time(at: DateTime<Utc>) -> String {
    at.format("%I:%M %p UTC").to_string()
}

fn short_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

pub fn render(notification: &Notification, settings: &MailSettings) -> Result<EmailMessage, NotifyError> {
    let (subject, html) = match notification {
        Notification::ClaimReceived(n) => (CLAIM_RECEIVED_SUBJECT, render_received(n, settings)?),
        Notification::ClaimExpired(n) => (CLAIM_EXPIRED_SUBJECT, render_expired(n, settings)?),
    };
    Ok(EmailMessage {
        from: settings.from_header(),
        to: notification.recipient().to_string(),
        subject: subject.to_string(),
        html,
    })
}

fn render_received(n: &ClaimReceived, settings: &MailSettings) -> Result<String, NotifyError> {
    ClaimReceivedTemplate {
        team_name: &settings.from_name,
        claimant_name: &n.claimant_name,
        role: n.role.as_str(),
        item_name: &n.item_name,
        verification_date: long_date(n.verification_deadline.date_naive()),
        verification_time: clock_time(n.verification_deadline),
        verification_desk: &settings.verification_desk,
        found_location: n.found_location.as_str(),
        year: n.verification_deadline.year(),
    }
    .render()
    .map_err(|err| NotifyError::Render(err.to_string()))
}

fn render_expired(n: &ClaimExpired, settings: &MailSettings) -> Result<String, NotifyError> {
    ClaimExpiredTemplate {
        team_name: &settings.from_name,
        claimant_name: &n.claimant_name,
        item_name: &n.item_name,
        category: n.category.as_str(),
        location: n.location.as_str(),
        found_date: short_date(n.found_date),
        claim_date: short_date(n.claimed_at.date_naive()),
        portal_url: &settings.portal_url,
        window_hours: settings.window_hours,
    }
    .render()
    .map_err(|err| NotifyError::Render(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domains::{Category, ClaimantRole, ItemId, Location};

    fn received() -> Notification {
        Notification::ClaimReceived(ClaimReceived {
            recipient: "asha@college.edu".into(),
            claimant_name: "Asha <Patil>".into(),
            role: ClaimantRole::Student,
            item_id: ItemId::new(),
            item_name: "Blue bottle".into(),
            found_location: Location::Library,
            verification_deadline: Utc.with_ymd_and_hms(2024, 3, 11, 9, 0, 0).unwrap(),
        })
    }

    #[test]
    fn claim_received_mentions_deadline_and_desk() {
        let msg = render(&received(), &MailSettings::default()).unwrap();
        assert_eq!(msg.subject, CLAIM_RECEIVED_SUBJECT);
        assert_eq!(msg.to, "asha@college.edu");
        assert_eq!(msg.from, "Lost and Found <lostfound@localhost>");
        assert!(msg.html.contains("Monday, March 11, 2024"));
        assert!(msg.html.contains("09:00 AM UTC"));
        assert!(msg.html.contains("Security Counter, A1 Building"));
        assert!(msg.html.contains("found at Library"));
    }

    #[test]
    fn claimant_supplied_text_is_escaped() {
        let msg = render(&received(), &MailSettings::default()).unwrap();
        assert!(!msg.html.contains("<Patil>"));
    }

    #[test]
    fn claim_expired_links_back_to_portal() {
        let settings = MailSettings {
            portal_url: "https://lostfound.college.edu/lost-items".into(),
            ..Default::default()
        };
        let n = Notification::ClaimExpired(ClaimExpired {
            recipient: "rk@college.edu".into(),
            claimant_name: "R. Kulkarni".into(),
            item_id: ItemId::new(),
            item_name: "Keys".into(),
            category: Category::Keys,
            location: Location::ParkingLot,
            found_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            claimed_at: Utc.with_ymd_and_hms(2024, 3, 10, 10, 0, 0).unwrap(),
        });
        let msg = render(&n, &settings).unwrap();
        assert_eq!(msg.subject, CLAIM_EXPIRED_SUBJECT);
        assert!(msg.html.contains("https://lostfound.college.edu/lost-items"));
        assert!(msg.html.contains("3/9/2024"));
        assert!(msg.html.contains("3/10/2024"));
        assert!(msg.html.contains("Parking Lot"));
        assert!(msg.html.contains("24 hours"));
    }
}
