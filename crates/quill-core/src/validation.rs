//! Rules a draft must satisfy before it may enter the post store.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

use crate::domain::{Draft, NormalizedDraft};
use crate::error::{FieldErrors, MAX_CONTENT_CHARS, ValidationError};

/// Layouts produced by a date-and-time input, which carries no zone suffix.
const LOCAL_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Validate a draft against `now`.
///
/// Every violated rule is reported, one per field. Zone-less times are read in
/// `zone`.
pub fn validate(
    draft: &Draft,
    now: DateTime<Utc>,
    zone: &FixedOffset,
) -> Result<NormalizedDraft, FieldErrors> {
    let mut errors = FieldErrors::new();

    let content = match check_content(&draft.content) {
        Ok(content) => Some(content),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let raw_time = draft.scheduled_time.as_deref();
    let scheduled_time = match check_scheduled_time(raw_time, now, zone) {
        Ok(at) => Some(at),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    match (content, scheduled_time) {
        (Some(content), Some(scheduled_time)) => Ok(NormalizedDraft {
            content,
            scheduled_time,
        }),
        _ => Err(errors),
    }
}

fn check_content(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField);
    }

    let length = trimmed.chars().count();
    if length > MAX_CONTENT_CHARS {
        return Err(ValidationError::TooLong { length });
    }

    Ok(trimmed.to_string())
}

fn check_scheduled_time(
    raw: Option<&str>,
    now: DateTime<Utc>,
    zone: &FixedOffset,
) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ValidationError::MissingField);
    }

    let at = parse_time(raw, zone)
        .ok_or_else(|| ValidationError::InvalidFormat(raw.to_string()))?;
    if at <= now {
        return Err(ValidationError::NotInFuture);
    }

    Ok(at)
}

/// Parse an absolute time, falling back to zone-less local layouts.
pub fn parse_time(raw: &str, zone: &FixedOffset) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }

    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .and_then(|naive| zone.from_local_datetime(&naive).single())
        .map(|at| at.with_timezone(&Utc))
}
