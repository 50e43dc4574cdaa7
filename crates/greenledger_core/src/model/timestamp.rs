//! Entry timestamp helpers.
//!
//! Entry timestamps are zone-less wall-clock values. Inputs may carry an
//! RFC 3339 offset (as produced by JavaScript `Date.toJSON`); those are
//! normalized to UTC before the offset is dropped.
//!
//! Only years `0000..=9999` are accepted. Outside that range the stored
//! text gains a sign, which breaks lexical ordering and SQLite date functions.

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Current UTC wall-clock time used as the default entry timestamp.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Parses an entry timestamp in any accepted wire format.
///
/// Returns `None` when the value matches no accepted format or its year
/// falls outside `0000..=9999`.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    let parsed = match DateTime::parse_from_rfc3339(trimmed) {
        Ok(with_offset) => Some(with_offset.naive_utc()),
        Err(_) => NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok()),
    };
    parsed.filter(is_storable)
}

/// Returns whether `value` has a four-digit, non-negative year.
pub fn is_storable(value: &NaiveDateTime) -> bool {
    STORABLE_YEARS.contains(&value.year())
}

/// Serde adapter for required timestamp fields.
pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`")))
}

/// Serde adapter for optional timestamp fields; `null` maps to `None`.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_timestamp;
    use chrono::NaiveDate;

    #[test]
    fn parse_accepts_naive_iso_with_and_without_fraction() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 15, 30)
            .unwrap();
        assert_eq!(parse_timestamp("2024-05-01T10:15:30"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01 10:15:30"), Some(expected));

        let with_millis = parse_timestamp("2024-05-01T10:15:30.250").unwrap();
        assert_eq!(with_millis.and_utc().timestamp_subsec_millis(), 250);
    }

    #[test]
    fn parse_normalizes_offsets_to_utc() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-05-01T08:00:00.000Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T10:00:00+02:00"), Some(expected));
    }

    #[test]
    fn parse_bounds_years_to_four_digits() {
        assert!(parse_timestamp("0000-06-01T00:00:00").is_some());
        assert!(parse_timestamp("9999-12-31T23:59:59.999").is_some());

        assert_eq!(parse_timestamp("+10000-01-01T00:00:00"), None);
        assert_eq!(parse_timestamp("-0001-06-01T00:00:00"), None);
        assert_eq!(parse_timestamp("9999-12-31T23:30:00-01:00"), None);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-01T00:00:00"), None);
    }
}
