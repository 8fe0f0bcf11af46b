//! Timestamp decoding for review dates.
//!
//! The reviews backend sends integer timestamps without saying which unit
//! they are in; milliseconds, microseconds, nanoseconds and seconds all show
//! up. We try each reading in a fixed order and keep the first one that
//! lands in a plausible range of years. Two readings can both be plausible
//! for some magnitudes; the earlier one wins and nothing tries to correct it.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};

/// Years outside this range are treated as a wrong unit guess.
const PLAUSIBLE_YEARS: std::ops::Range<i32> = 2000..2030;

/// Divisors applied before reading the value as milliseconds, in priority order.
const MILLIS_DIVISORS: [i64; 4] = [1, 1_000, 1_000_000, 1_000_000_000];

/// Decode a backend timestamp of unknown unit into a UTC instant.
///
/// Falls back to reading the value as seconds when no candidate is
/// plausible, and to the Unix epoch if even that is out of range.
pub fn normalize_timestamp(timestamp: i64) -> DateTime<Utc> {
    MILLIS_DIVISORS
        .iter()
        .filter_map(|divisor| DateTime::from_timestamp_millis(timestamp / divisor))
        .find(|date| PLAUSIBLE_YEARS.contains(&date.year()))
        .or_else(|| DateTime::from_timestamp(timestamp, 0))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// [`normalize_timestamp`] rendered as an ISO-8601 string with millisecond precision.
pub fn to_iso_date(timestamp: i64) -> String {
    normalize_timestamp(timestamp).to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn microsecond_value_resolves_to_plausible_year() {
        let date = normalize_timestamp(1_758_512_460_876_864);
        assert!(PLAUSIBLE_YEARS.contains(&date.year()));
        assert_eq!(to_iso_date(1_758_512_460_876_864), "2025-09-22T03:41:00.876Z");
    }

    #[test]
    fn millisecond_value_is_taken_directly() {
        assert_eq!(to_iso_date(1_700_000_000_000), "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn nanosecond_value_is_scaled_down() {
        assert_eq!(to_iso_date(1_700_000_000_000_000_000), "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn second_value_falls_back_to_seconds() {
        assert_eq!(to_iso_date(1_700_000_000), "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn zero_does_not_panic() {
        assert_eq!(normalize_timestamp(0), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn extreme_values_do_not_panic() {
        normalize_timestamp(i64::MAX);
        normalize_timestamp(i64::MIN);
    }
}
