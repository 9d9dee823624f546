//! # Verification Window
//!
//! Claimants must appear in person before an item's verification deadline.
//! The deadline is always `reference + window` in UTC; there is no timezone
//! logic here, display localization belongs to the UI.

use chrono::{DateTime, Duration, Utc};

use crate::error::{AppError, Result};

pub const DEFAULT_WINDOW_HOURS: i64 = 24;
/// One year. Longer windows would push deadlines out of any useful range.
pub const MAX_WINDOW_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationWindow {
    length: Duration,
}

impl VerificationWindow {
    /// A window of `hours`, which must lie in `1..=MAX_WINDOW_HOURS`.
    pub fn hours(hours: i64) -> Result<Self> {
        Duration::try_hours(hours)
            .filter(|_| (1..=MAX_WINDOW_HOURS).contains(&hours))
            .map(|length| Self { length })
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Verification window must be between 1 and {MAX_WINDOW_HOURS} hours"
                ))
            })
    }

    pub fn length(&self) -> Duration {
        self.length
    }

    /// Deadline for a window opening at `reference`.
    pub fn compute_deadline(&self, reference: DateTime<Utc>) -> DateTime<Utc> {
        reference + self.length
    }
}

impl Default for VerificationWindow {
    fn default() -> Self {
        Self {
            length: Duration::hours(DEFAULT_WINDOW_HOURS),
        }
    }
}

/// A deadline has lapsed only once `now` is strictly past it.
pub fn has_lapsed(deadline: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    deadline < now
}
