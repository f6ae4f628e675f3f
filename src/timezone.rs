//! Resolves the configured canonical timezone into a concrete UTC offset.
//!
//! Every "now", calendar-day boundary, and lookback window in the
//! application goes through this module so that a single timezone policy
//! applies uniformly. Stored timestamps are always UTC.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone, timezones};

use crate::Error;

/// Get the UTC offset that `canonical_timezone` (e.g. "Pacific/Auckland")
/// has at the current instant.
///
/// # Errors
///
/// Returns [Error::InvalidTimezone] if `canonical_timezone` is not a known
/// canonical timezone name.
pub fn local_offset(canonical_timezone: &str) -> Result<UtcOffset, Error> {
    timezones::get_by_name(canonical_timezone)
        .map(|timezone| {
            timezone
                .get_offset_utc(&OffsetDateTime::now_utc())
                .to_utc()
        })
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))
}

/// The current time in the timezone `canonical_timezone`.
///
/// # Errors
///
/// Returns [Error::InvalidTimezone] if `canonical_timezone` is not a known
/// canonical timezone name.
pub fn now_in(canonical_timezone: &str) -> Result<OffsetDateTime, Error> {
    let offset = local_offset(canonical_timezone)?;

    Ok(OffsetDateTime::now_utc().to_offset(offset))
}

#[cfg(test)]
mod timezone_tests {
    use time::UtcOffset;

    use crate::Error;

    use super::{local_offset, now_in};

    #[test]
    fn utc_resolves_to_zero_offset() {
        let got = local_offset("Etc/UTC").expect("Could not resolve timezone");

        assert_eq!(got, UtcOffset::UTC);
    }

    #[test]
    fn named_timezone_resolves() {
        // Pacific/Auckland is UTC+12 or UTC+13 depending on daylight saving.
        let got = local_offset("Pacific/Auckland").expect("Could not resolve timezone");

        assert!(
            got.whole_hours() == 12 || got.whole_hours() == 13,
            "want offset of 12 or 13 hours, got {got}"
        );
    }

    #[test]
    fn unknown_timezone_is_an_error() {
        let got = local_offset("Middle/Nowhere");

        assert_eq!(got, Err(Error::InvalidTimezone("Middle/Nowhere".to_owned())));
    }

    #[test]
    fn now_in_carries_the_local_offset() {
        let got = now_in("Etc/UTC").expect("Could not get current time");

        assert_eq!(got.offset(), UtcOffset::UTC);
    }
}
