//! Zoned timestamp coercion with a best-effort text parser.

use crate::coerce::Mismatch;
use crate::model::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Coerces a timestamp-like value into `zone`.
///
/// Instants keep their absolute time; wall-clock inputs (local timestamps and
/// text without an offset) are read as local time in `zone`.
///
/// # Errors
/// - `Mismatch` for any input that is neither a timestamp, text nor null.
pub fn date(value: &Value, zone: Tz) -> Result<Option<DateTime<Tz>>, Mismatch> {
    match value {
        Value::Null => Ok(None),
        Value::Timestamp(instant) => Ok(Some(instant.with_timezone(&zone))),
        Value::LocalTimestamp(local) => Ok(attach(local, zone)),
        Value::Text(text) => Ok(parse_datetime(text, zone)),
        other => Err(Mismatch {
            expected: "timestamp, string or nil",
            found: other.type_label(),
        }),
    }
}

/// Parses common date/time spellings; returns `None` when nothing fits.
pub fn parse_datetime(text: &str, zone: Tz) -> Option<DateTime<Tz>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&zone));
    }
    for format in OFFSET_FORMATS {
        if let Ok(instant) = DateTime::parse_from_str(text, format) {
            return Some(instant.with_timezone(&zone));
        }
    }
    for format in LOCAL_FORMATS {
        if let Ok(local) = NaiveDateTime::parse_from_str(text, format) {
            return attach(&local, zone);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(day) = NaiveDate::parse_from_str(text, format) {
            return day.and_hms_opt(0, 0, 0).and_then(|local| attach(&local, zone));
        }
    }
    None
}

// Ambiguous wall-clock times (DST fall-back) resolve to the earlier instant;
// nonexistent ones (spring-forward gap) do not convert.
fn attach(local: &NaiveDateTime, zone: Tz) -> Option<DateTime<Tz>> {
    zone.from_local_datetime(local).earliest()
}

#[cfg(test)]
mod tests {
    use super::{date, parse_datetime};
    use crate::model::value::Value;
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::America::Chicago;
    use chrono_tz::Tz;

    #[test]
    fn parses_local_text_in_the_attribute_zone() {
        let parsed = parse_datetime("2024-03-01 09:30", Chicago).expect("should parse");
        assert_eq!(parsed, Chicago.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn keeps_the_instant_of_offset_text() {
        let parsed = parse_datetime("2024-03-01T15:30:00Z", Chicago).expect("should parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 15, 30, 0).unwrap());
        assert_eq!(parsed.timezone(), Chicago);
    }

    #[test]
    fn parses_date_only_and_long_forms() {
        let midnight = Tz::UTC.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        assert_eq!(parse_datetime("2024-01-05", Tz::UTC), Some(midnight));
        assert_eq!(parse_datetime("January 5, 2024", Tz::UTC), Some(midnight));
        assert_eq!(parse_datetime("5 Jan 2024", Tz::UTC), Some(midnight));
    }

    #[test]
    fn unparseable_text_converts_to_none() {
        assert_eq!(parse_datetime("not a date", Tz::UTC), None);
        assert_eq!(parse_datetime("2024-13-40", Tz::UTC), None);
        assert_eq!(parse_datetime("   ", Tz::UTC), None);
    }

    #[test]
    fn local_timestamps_attach_to_zone_and_other_types_mismatch() {
        let local = NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|day| day.and_hms_opt(8, 0, 0))
            .expect("valid local time");
        let converted = date(&Value::LocalTimestamp(local), Chicago)
            .expect("timestamps are accepted")
            .expect("local time exists");
        assert_eq!(converted, Chicago.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());

        let err = date(&Value::Integer(5), Chicago).expect_err("integers are not dates");
        assert_eq!(err.found, "integer");
    }
}
