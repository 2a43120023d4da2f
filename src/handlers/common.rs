use crate::errors::ServiceError;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use validator::Validate;

const DESK_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::ValidationError(format!("Validation failed: {}", e)))
}

/// Parses a date bound given either as `YYYY-MM-DD HH:MM:SS[.fraction]`
/// (taken as UTC) or as RFC 3339.
pub fn parse_date_bound(field: &str, raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    let raw = raw.trim();

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, DESK_DATE_FORMAT) {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ServiceError::ValidationError(format!("invalid {}: '{}'", field, raw)))
}

/// Parses an optional, possibly empty, date bound.
pub fn parse_optional_date_bound(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ServiceError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date_bound(field, value).map(Some),
    }
}

/// Resolves the requested page size against the configured default and cap.
pub fn effective_limit(requested: Option<u64>, default_size: u64, max_size: u64) -> u64 {
    requested.unwrap_or(default_size).min(max_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use rstest::rstest;

    #[rstest]
    #[case("2024-03-10 12:30:45")]
    #[case("2024-03-10 12:30:45.5")]
    #[case("2024-03-10 12:30:45.123456")]
    #[case("2024-03-10T12:30:45Z")]
    #[case("2024-03-10T15:30:45+03:00")]
    fn accepts_desk_and_rfc3339_formats(#[case] raw: &str) {
        let parsed = parse_date_bound("startDate", raw).unwrap();
        assert_eq!(
            parsed.with_nanosecond(0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 10, 12, 30, 45).unwrap()
        );
    }

    #[test]
    fn keeps_sub_second_precision() {
        let parsed = parse_date_bound("endDate", "2024-03-10 12:30:45.250").unwrap();
        assert_eq!(parsed.nanosecond(), 250_000_000);
    }

    #[rstest]
    #[case("yesterday")]
    #[case("2024-13-01 00:00:00")]
    #[case("2024-03-10")]
    fn rejects_malformed_dates(#[case] raw: &str) {
        let err = parse_date_bound("startDate", raw).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(msg) if msg.contains("startDate")));
    }

    #[test]
    fn empty_bound_means_unbounded() {
        assert_eq!(parse_optional_date_bound("endDate", Some("  ")).unwrap(), None);
        assert_eq!(parse_optional_date_bound("endDate", None).unwrap(), None);
    }

    #[rstest]
    #[case(None, 10)]
    #[case(Some(0), 0)]
    #[case(Some(30), 30)]
    #[case(Some(5_000), 100)]
    fn limit_defaults_and_caps(#[case] requested: Option<u64>, #[case] expected: u64) {
        assert_eq!(effective_limit(requested, 10, 100), expected);
    }
}
