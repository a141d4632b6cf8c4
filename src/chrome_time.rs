//! Chrome/WebKit timestamp decoding
//!
//! Chrome stores times as microseconds since 1601-01-01T00:00:00 UTC.

use chrono::{DateTime, Local, Utc};

use crate::config::TimeZoneMode;

/// Rendered in place of a timestamp when the stored value is `0`.
pub const UNSET: &str = "N/A";

/// Seconds between 1601-01-01 and 1970-01-01.
const WEBKIT_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Convert a raw Chrome timestamp to a UTC instant.
///
/// Returns `None` for `0` and for values chrono cannot represent.
pub fn to_datetime(raw: i64) -> Option<DateTime<Utc>> {
    if raw == 0 {
        return None;
    }
    let secs = raw.div_euclid(1_000_000) - WEBKIT_EPOCH_OFFSET_SECS;
    let nsecs = (raw.rem_euclid(1_000_000) as u32) * 1000;
    DateTime::<Utc>::from_timestamp(secs, nsecs)
}

/// Format a raw Chrome timestamp as `YYYY-MM-DD HH:MM:SS`.
pub fn decode(raw: i64, zone: TimeZoneMode) -> String {
    match to_datetime(raw) {
        None => UNSET.to_string(),
        Some(dt) => match zone {
            TimeZoneMode::Utc => dt.format(DISPLAY_FORMAT).to_string(),
            TimeZoneMode::Local => dt.with_timezone(&Local).format(DISPLAY_FORMAT).to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // 2024-01-01 00:00:00 UTC
    const NEW_YEAR_2024: i64 = (1_704_067_200 + WEBKIT_EPOCH_OFFSET_SECS) * 1_000_000;

    #[test]
    fn test_zero_is_unset() {
        assert_eq!(decode(0, TimeZoneMode::Utc), UNSET);
        assert_eq!(decode(0, TimeZoneMode::Local), UNSET);
    }

    #[test]
    fn test_known_instant() {
        assert_eq!(decode(NEW_YEAR_2024, TimeZoneMode::Utc), "2024-01-01 00:00:00");
        assert_eq!(decode(NEW_YEAR_2024 + 1_999_999, TimeZoneMode::Utc), "2024-01-01 00:00:01");
    }

    #[test]
    fn test_local_rendering() {
        let raw = NEW_YEAR_2024 + 37_250_000;
        let rendered = decode(raw, TimeZoneMode::Local);

        let expected = to_datetime(raw)
            .unwrap()
            .with_timezone(&Local)
            .format(DISPLAY_FORMAT)
            .to_string();
        assert_eq!(rendered, expected);

        let shape = regex::Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").unwrap();
        assert!(shape.is_match(&rendered), "unexpected shape: {}", rendered);
    }

    #[test]
    fn test_webkit_epoch_itself() {
        assert_eq!(decode(1, TimeZoneMode::Utc), "1601-01-01 00:00:00");
    }

    proptest! {
        #[test]
        fn prop_decode_is_monotonic(a in 1i64..13_500_000_000_000_000, b in 1i64..13_500_000_000_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(decode(lo, TimeZoneMode::Utc) <= decode(hi, TimeZoneMode::Utc));
        }

        #[test]
        fn prop_nonzero_never_unset(raw in 1i64..13_500_000_000_000_000) {
            prop_assert_ne!(decode(raw, TimeZoneMode::Utc), UNSET);
        }
    }
}
