//! Input validation for tool requests.
//!
//! Every check here is pure and synchronous, and runs before any network
//! round-trip. Failures are reported as [`ValidationError`] and are never
//! retried.

use std::sync::OnceLock;

use chrono::{DateTime, Months, NaiveDate, Utc};
use regex::Regex;
use thiserror::Error;
use url::Url;

/// How far back Search Console keeps performance data.
pub const MAX_DATA_AGE_MONTHS: u32 = 16;

/// Smallest accepted `rowLimit`.
pub const MIN_ROW_LIMIT: i64 = 1;

/// Largest accepted `rowLimit`.
pub const MAX_ROW_LIMIT: i64 = 25_000;

/// Example shown when a site URL is malformed.
pub const SITE_URL_EXAMPLE: &str = r#""https://example.com/" or "sc-domain:example.com""#;

/// Example shown when a page URL is malformed.
pub const PAGE_URL_EXAMPLE: &str = r#""https://example.com/page""#;

/// An input rejected before any remote call was attempted.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was empty.
    #[error("{field} is required")]
    EmptyInput { field: String },
    /// A URL field could not be parsed.
    #[error("Invalid {} format", lowercase_first(.field))]
    MalformedUrl { field: String, example: &'static str },
    /// A date did not match `YYYY-MM-DD`.
    #[error("Invalid {field} format")]
    BadFormat { field: String },
    /// A date matched the pattern but is not a real calendar date.
    #[error("Invalid {field}")]
    InvalidCalendarDate { field: String },
    /// The range starts after it ends.
    #[error("Invalid date range")]
    RangeInverted,
    /// The range starts before the retention window.
    #[error("Date range too old")]
    RangeTooOld,
    /// A numeric field is outside its accepted bounds.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

impl ValidationError {
    /// What the caller should change to make the request valid.
    pub fn remediation(&self) -> String {
        match self {
            ValidationError::EmptyInput { field } => {
                format!("Please provide a valid {}", lowercase_first(field))
            }
            ValidationError::MalformedUrl { field, example } => {
                format!("{} must be a valid URL (e.g., {})", field, example)
            }
            ValidationError::BadFormat { field } => {
                format!(r#"{} must be in YYYY-MM-DD format (e.g., "2025-01-01")"#, field)
            }
            ValidationError::InvalidCalendarDate { field } => {
                format!("{} is not a valid date", field)
            }
            ValidationError::RangeInverted => {
                "startDate must be before or equal to endDate".to_string()
            }
            ValidationError::RangeTooOld => format!(
                "Search Console data is only available for the last {} months",
                MAX_DATA_AGE_MONTHS
            ),
            ValidationError::OutOfRange { field, min, max } => {
                format!("Choose a {} between {} and {}", field, min, max)
            }
        }
    }
}

/// A validated, inclusive date range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern is valid"))
}

/// Validates a Search Console site identifier.
///
/// Accepts URL-prefix properties (`https://example.com/`) and domain
/// properties (`sc-domain:example.com`). Whether the property is registered is
/// only revealed by the API call.
pub fn validate_site_url(value: &str) -> Result<(), ValidationError> {
    validate_url(value, "Site URL", SITE_URL_EXAMPLE)
}

/// Validates that `value` is a non-empty, parseable URL.
pub fn validate_url(value: &str, field: &str, example: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyInput {
            field: field.to_string(),
        });
    }

    Url::parse(value).map_err(|_| ValidationError::MalformedUrl {
        field: field.to_string(),
        example,
    })?;

    Ok(())
}

/// Validates a `YYYY-MM-DD` date string and returns the parsed date.
pub fn validate_date(value: &str, field: &str) -> Result<NaiveDate, ValidationError> {
    if !date_pattern().is_match(value) {
        return Err(ValidationError::BadFormat {
            field: field.to_string(),
        });
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidCalendarDate {
            field: field.to_string(),
        }
    })
}

/// Validates a date range against the current wall clock.
pub fn validate_date_range(start: &str, end: &str) -> Result<DateRange, ValidationError> {
    validate_date_range_at(start, end, Utc::now())
}

/// Validates a date range against an explicit "now".
///
/// The start date may be no earlier than the calendar date sixteen months
/// before `now`.
pub fn validate_date_range_at(
    start: &str,
    end: &str,
    now: DateTime<Utc>,
) -> Result<DateRange, ValidationError> {
    let start = validate_date(start, "startDate")?;
    let end = validate_date(end, "endDate")?;

    if start > end {
        return Err(ValidationError::RangeInverted);
    }

    if start < retention_cutoff(now) {
        return Err(ValidationError::RangeTooOld);
    }

    Ok(DateRange { start, end })
}

/// The earliest start date accepted at `now`.
pub fn retention_cutoff(now: DateTime<Utc>) -> NaiveDate {
    let today = now.date_naive();
    today
        .checked_sub_months(Months::new(MAX_DATA_AGE_MONTHS))
        .unwrap_or(NaiveDate::MIN)
}

/// Validates a `rowLimit` and narrows it to the API's integer type.
pub fn validate_row_limit(value: i64) -> Result<u32, ValidationError> {
    if !(MIN_ROW_LIMIT..=MAX_ROW_LIMIT).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: "rowLimit".to_string(),
            min: MIN_ROW_LIMIT,
            max: MAX_ROW_LIMIT,
        });
    }
    // Bounded above by MAX_ROW_LIMIT.
    Ok(value as u32)
}

/// Lowercases the first letter of a field label unless it starts an acronym.
fn lowercase_first(label: &str) -> String {
    let mut chars = label.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if second.is_lowercase() => {
            first.to_lowercase().chain(label.chars().skip(1)).collect()
        }
        _ => label.to_string(),
    }
}
