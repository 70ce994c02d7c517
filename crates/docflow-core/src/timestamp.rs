//! Timestamp parsing for VBFA rows and OCEL events.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATE_FORMATS: &[&str] = &["%Y%m%d", "%Y-%m-%d"];
const TIME_FORMATS: &[&str] = &["%H%M%S", "%H:%M:%S"];

/// Fixed format of OCEL event timestamps.
pub const EVENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Combine an `ERDAT` date and an `ERZET` time into one timestamp.
///
/// Returns `None` when either part does not parse; the caller attaches the
/// row context.
pub fn combine(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = date.trim();
    let time = time.trim();

    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())?;
    let time = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time, fmt).ok())?;

    Some(date.and_time(time))
}

/// Parse an event timestamp in the fixed `YYYY-MM-DD HH:MM:SS` form.
pub fn parse_event(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, EVENT_TIMESTAMP_FORMAT).ok()
}

/// Bring an RFC 3339 timestamp into the fixed event form.
///
/// Keeps the local wall-clock time and drops sub-seconds. Values that are not
/// RFC 3339 are returned unchanged.
pub fn normalize_event(value: &str) -> String {
    match DateTime::parse_from_rfc3339(value.trim()) {
        Ok(parsed) => parsed.naive_local().format(EVENT_TIMESTAMP_FORMAT).to_string(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_combine_sap_format() {
        assert_eq!(combine("20230101", "120000"), Some(at(2023, 1, 1, 12, 0, 0)));
    }

    #[test]
    fn test_combine_iso_parts() {
        assert_eq!(combine("2023-01-01", "12:00:00"), Some(at(2023, 1, 1, 12, 0, 0)));
        assert_eq!(combine(" 20231231 ", "235959"), Some(at(2023, 12, 31, 23, 59, 59)));
    }

    #[test]
    fn test_combine_malformed() {
        assert_eq!(combine("20231301", "120000"), None);
        assert_eq!(combine("20230101", "250000"), None);
        assert_eq!(combine("00000000", "000000"), None);
        assert_eq!(combine("", "120000"), None);
        assert_eq!(combine("yesterday", "noon"), None);
    }

    #[test]
    fn test_parse_event() {
        assert_eq!(parse_event("2020-07-09 08:21:01"), Some(at(2020, 7, 9, 8, 21, 1)));
        assert_eq!(parse_event("2020-07-09T08:21:01"), None);
        assert_eq!(parse_event("09.07.2020 08:21"), None);
    }

    #[test]
    fn test_normalize_event() {
        assert_eq!(normalize_event("2020-07-09T08:21:01.527+01:00"), "2020-07-09 08:21:01");
        assert_eq!(normalize_event("2020-07-09T08:21:01Z"), "2020-07-09 08:21:01");
        assert_eq!(normalize_event("2020-07-09 08:21:01"), "2020-07-09 08:21:01");
        assert_eq!(normalize_event("garbage"), "garbage");
    }
}
