//! Field format rules shared by claim and item validation.

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, Result};

static ROLL_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}$").expect("static regex"));
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{10}$").expect("static regex"));
static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("static regex"));
static YMD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").expect("static regex"));
static DMY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}-\d{1,2}-\d{4}$").expect("static regex"));

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

pub fn is_valid_roll_number(value: &str) -> bool {
    ROLL_NUMBER.is_match(value)
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE.is_match(value)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Parses a found date in `YYYY-MM-DD`, `DD-MM-YYYY` or RFC 3339 form.
///
/// Only the calendar day is kept. Dates after `today` are rejected.
pub fn parse_found_date(raw: &str, today: NaiveDate) -> Result<NaiveDate> {
    let raw = raw.trim();
    let parsed = if YMD.is_match(raw) {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    } else if DMY.is_match(raw) {
        NaiveDate::parse_from_str(raw, "%d-%m-%Y").ok()
    } else {
        DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
    };

    let date = parsed.ok_or_else(|| AppError::validation("Invalid date format"))?;
    if date > today {
        return Err(AppError::validation("Found date cannot be in the future"));
    }
    Ok(date)
}
