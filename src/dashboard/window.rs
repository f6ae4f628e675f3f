//! Time window presets for the chart data endpoints.
//!
//! Both presets map a query string value to a concrete lookback so that the
//! chart endpoints never have to trust client-supplied dates.

use time::{Duration, OffsetDateTime, Time};

/// How far back the expense breakdown looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BreakdownRange {
    /// Since local midnight today.
    Day,
    /// The past seven days.
    Week,
    /// The past thirty days.
    Month,
}

impl BreakdownRange {
    /// Every preset, in the order they are shown in the range selector.
    pub(super) const ALL: [Self; 3] = [Self::Day, Self::Week, Self::Month];

    /// The preset used when the query does not name one.
    pub(super) fn default_preset() -> Self {
        Self::Day
    }

    /// Parse the `range` query value. Unknown or missing values fall back to
    /// the default preset rather than failing the request.
    pub(super) fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("day") => Self::Day,
            Some("week") => Self::Week,
            Some("month") => Self::Month,
            _ => Self::default_preset(),
        }
    }

    /// The value used in the `range` query parameter.
    pub(super) fn as_query_value(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// The human readable name shown in the range selector.
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Day => "Today",
            Self::Week => "Past week",
            Self::Month => "Past month",
        }
    }

    /// The start of the window, given the current local time.
    pub(super) fn start(self, now: OffsetDateTime) -> OffsetDateTime {
        match self {
            Self::Day => now.replace_time(Time::MIDNIGHT),
            Self::Week => now - Duration::days(7),
            Self::Month => now - Duration::days(30),
        }
    }
}

/// How far back the daily spending trend looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TrendPeriod {
    /// The past seven days.
    Week,
    /// The past thirty days.
    Month,
    /// The past year.
    Year,
}

impl TrendPeriod {
    /// Every preset, in the order they are shown in the period selector.
    pub(super) const ALL: [Self; 3] = [Self::Week, Self::Month, Self::Year];

    /// The preset used when the query does not name one.
    pub(super) fn default_preset() -> Self {
        Self::Week
    }

    /// Parse the `period` query value. Unknown or missing values fall back to
    /// the default preset rather than failing the request.
    pub(super) fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("week") => Self::Week,
            Some("month") => Self::Month,
            Some("year") => Self::Year,
            _ => Self::default_preset(),
        }
    }

    /// The value used in the `period` query parameter.
    pub(super) fn as_query_value(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// The human readable name shown in the period selector.
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Week => "Past week",
            Self::Month => "Past month",
            Self::Year => "Past year",
        }
    }

    /// The number of days the trend looks back from today.
    ///
    /// The series itself covers `lookback_days` past days plus today.
    pub(super) fn lookback_days(self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
        }
    }
}
