//! Field validation shared by the entity managers

use chrono::NaiveDate;

use crate::error::{Error, Result};

/// Date format accepted on input and stored on disk
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Trim a required name, rejecting empty values
pub fn name(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Normalise an optional free-text field; blank text counts as absent
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse a strict `YYYY-MM-DD` date
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return Err(Error::validation(
            field,
            format!("'{}' is not in YYYY-MM-DD format", value),
        ));
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| Error::validation(field, format!("'{}' is not a valid date", value)))
}

/// Reject ranges whose end precedes their start
pub fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(Error::validation(
                "end_date",
                format!("{} is before start date {}", end, start),
            ));
        }
    }
    Ok(())
}

/// Priorities start at 1 (lower number = more important)
pub fn priority(value: i64) -> Result<i64> {
    if value < 1 {
        return Err(Error::validation("priority", "must be 1 or greater"));
    }
    Ok(value)
}

/// Any finite number
pub fn finite(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(Error::validation(field, "must be a finite number"));
    }
    Ok(value)
}

/// A finite number that is zero or more
pub fn non_negative(field: &'static str, value: f64) -> Result<f64> {
    let value = finite(field, value)?;
    if value < 0.0 {
        return Err(Error::validation(field, "must not be negative"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_trimmed_and_required() {
        assert_eq!(name("name", "  Growth  ").unwrap(), "Growth");
        assert!(matches!(
            name("name", "   "),
            Err(Error::Validation { field: "name", .. })
        ));
    }

    #[test]
    fn test_optional_text_treats_blank_as_absent() {
        assert_eq!(optional_text(Some("  x ")), Some("x".to_string()));
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn test_parse_date_accepts_iso_dates() {
        let date = parse_date("start_date", "2024-02-29").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_parse_date_rejects_bad_shapes_and_days() {
        for bad in ["2024-2-1", "01/02/2024", "2023-02-29", "2024-13-01", ""] {
            assert!(parse_date("start_date", bad).is_err(), "{} accepted", bad);
        }
    }

    #[test]
    fn test_date_range_requires_end_after_start() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1);
        let end = NaiveDate::from_ymd_opt(2023, 12, 31);

        assert!(date_range(start, end).is_err());
        assert!(date_range(end, start).is_ok());
        assert!(date_range(start, start).is_ok());
        assert!(date_range(start, None).is_ok());
    }

    #[test]
    fn test_numeric_checks() {
        assert!(priority(0).is_err());
        assert_eq!(priority(3).unwrap(), 3);
        assert!(non_negative("budget", -1.0).is_err());
        assert!(non_negative("budget", f64::NAN).is_err());
        assert_eq!(finite("target_value", -5.5).unwrap(), -5.5);
    }
}
