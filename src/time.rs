//! Conversions between vendor UTC timestamps and the local-adjusted epoch seconds
//! stored in the `thermostat` table.
//!
//! The stored convention is `unix_seconds + utc_offset`, i.e. wall-clock local time
//! read as if it were UTC. The offset is always passed in explicitly; `host_offset`
//! is the only place that touches the host clock.

use chrono::{FixedOffset, Local, NaiveDateTime};

use crate::error::NestlogError;

const ISO_8601_BODY: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse a vendor timestamp such as `2017-02-02T21:00:06.000Z` into a naive UTC datetime.
pub fn parse_utc_iso8601(s: &str) -> Result<NaiveDateTime, NestlogError> {
    let body = s
        .strip_suffix('Z')
        .ok_or_else(|| NestlogError::Format(format!("timestamp {:?} does not end in 'Z'", s)))?;
    NaiveDateTime::parse_from_str(body, ISO_8601_BODY)
        .map_err(|e| NestlogError::Format(format!("timestamp {:?} is not ISO-8601 UTC: {}", s, e)))
}

/// Seconds since 1970-01-01T00:00:00 shifted by `offset`.
pub fn to_local_epoch(utc: NaiveDateTime, offset: FixedOffset) -> i64 {
    utc.and_utc().timestamp() + i64::from(offset.local_minus_utc())
}

/// The host's UTC offset right now (DST-aware).
///
/// Note this is the offset at call time, not at the moment a timestamp was
/// recorded; conversions of old timestamps across a DST change are off by the
/// DST delta.
pub fn host_offset() -> FixedOffset {
    *Local::now().offset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn offset(secs: i32) -> FixedOffset {
        FixedOffset::east_opt(secs).unwrap()
    }

    #[test]
    fn parses_millisecond_and_microsecond_precision() {
        let ms = parse_utc_iso8601("2017-02-02T21:00:06.000Z").unwrap();
        assert_eq!(
            ms,
            NaiveDate::from_ymd_opt(2017, 2, 2).unwrap().and_hms_opt(21, 0, 6).unwrap()
        );

        let us = parse_utc_iso8601("2017-02-02T21:00:06.123456Z").unwrap();
        assert_eq!(
            us,
            NaiveDate::from_ymd_opt(2017, 2, 2)
                .unwrap()
                .and_hms_micro_opt(21, 0, 6, 123_456)
                .unwrap()
        );
    }

    #[test]
    fn rejects_missing_zulu_suffix() {
        let err = parse_utc_iso8601("2017-02-02T21:00:06.000").unwrap_err();
        assert!(matches!(err, NestlogError::Format(_)));

        let err = parse_utc_iso8601("2017-02-02T21:00:06.000+00:00").unwrap_err();
        assert!(matches!(err, NestlogError::Format(_)));
    }

    #[test]
    fn rejects_malformed_body() {
        for bad in ["Z", "yesterdayZ", "2017-02-02 21:00:06.000Z", "2017-13-02T21:00:06.000Z"] {
            let err = parse_utc_iso8601(bad).unwrap_err();
            assert!(matches!(err, NestlogError::Format(_)), "{bad} should be rejected");
        }
    }

    #[test]
    fn local_epoch_adds_offset() {
        let dt = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(to_local_epoch(dt, offset(0)), 0);
        assert_eq!(to_local_epoch(dt, offset(-5 * 3600)), -18_000);
        assert_eq!(to_local_epoch(dt, offset(3600)), 3600);
    }

    #[test]
    fn parse_then_localize_matches_unix_seconds_plus_offset() {
        let cases = [
            ("2017-02-02T21:00:06.000Z", Utc.with_ymd_and_hms(2017, 2, 2, 21, 0, 6).unwrap()),
            ("2024-07-14T03:15:00.500000Z", Utc.with_ymd_and_hms(2024, 7, 14, 3, 15, 0).unwrap()),
            ("1999-12-31T23:59:59.999Z", Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap()),
        ];
        for secs in [-7 * 3600, -4 * 3600, 0, 5 * 3600 + 1800] {
            for (raw, expected) in &cases {
                let parsed = parse_utc_iso8601(raw).unwrap();
                assert_eq!(
                    to_local_epoch(parsed, offset(secs)),
                    expected.timestamp() + i64::from(secs),
                    "{raw} at offset {secs}"
                );
            }
        }
    }
}
