use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A query parameter value outside its accepted set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind}. Valid options are: {options}")]
pub struct InvalidParameter {
    kind: &'static str,
    options: String,
}

/// Span of history requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    YearToDate,
    Max,
}

impl DateRange {
    pub const ALL: [DateRange; 11] = [
        DateRange::OneDay,
        DateRange::FiveDays,
        DateRange::OneMonth,
        DateRange::ThreeMonths,
        DateRange::SixMonths,
        DateRange::OneYear,
        DateRange::TwoYears,
        DateRange::FiveYears,
        DateRange::TenYears,
        DateRange::YearToDate,
        DateRange::Max,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DateRange::OneDay => "1d",
            DateRange::FiveDays => "5d",
            DateRange::OneMonth => "1mo",
            DateRange::ThreeMonths => "3mo",
            DateRange::SixMonths => "6mo",
            DateRange::OneYear => "1y",
            DateRange::TwoYears => "2y",
            DateRange::FiveYears => "5y",
            DateRange::TenYears => "10y",
            DateRange::YearToDate => "ytd",
            DateRange::Max => "max",
        }
    }
}

impl FromStr for DateRange {
    type Err = InvalidParameter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateRange::ALL
            .into_iter()
            .find(|range| range.as_str() == s)
            .ok_or_else(|| InvalidParameter {
                kind: "date range",
                options: join_options(DateRange::ALL.iter().map(|r| r.as_str())),
            })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling granularity of the returned buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interval {
    OneMinute,
    TwoMinutes,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    SixtyMinutes,
    NinetyMinutes,
    OneHour,
    #[default]
    OneDay,
    FiveDays,
    OneWeek,
    OneMonth,
    ThreeMonths,
}

impl Interval {
    pub const ALL: [Interval; 13] = [
        Interval::OneMinute,
        Interval::TwoMinutes,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::SixtyMinutes,
        Interval::NinetyMinutes,
        Interval::OneHour,
        Interval::OneDay,
        Interval::FiveDays,
        Interval::OneWeek,
        Interval::OneMonth,
        Interval::ThreeMonths,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::TwoMinutes => "2m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::SixtyMinutes => "60m",
            Interval::NinetyMinutes => "90m",
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
            Interval::FiveDays => "5d",
            Interval::OneWeek => "1wk",
            Interval::OneMonth => "1mo",
            Interval::ThreeMonths => "3mo",
        }
    }

    /// Buckets shorter than a trading day carry a time of day.
    pub fn is_intraday(self) -> bool {
        matches!(
            self,
            Interval::OneMinute
                | Interval::TwoMinutes
                | Interval::FiveMinutes
                | Interval::FifteenMinutes
                | Interval::ThirtyMinutes
                | Interval::SixtyMinutes
                | Interval::NinetyMinutes
                | Interval::OneHour
        )
    }
}

impl FromStr for Interval {
    type Err = InvalidParameter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|interval| interval.as_str() == s)
            .ok_or_else(|| InvalidParameter {
                kind: "interval",
                options: join_options(Interval::ALL.iter().map(|i| i.as_str())),
            })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn join_options<'a>(options: impl Iterator<Item = &'a str>) -> String {
    options.collect::<Vec<_>>().join(", ")
}
