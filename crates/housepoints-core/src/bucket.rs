//! Time buckets: the period key a completion is recorded under.
//!
//! Daily habits bucket by calendar day (`YYYY-MM-DD`); weekly habits bucket by
//! ISO-8601 week (`YYYY-WW`, weeks start on Monday). Both key forms share one
//! namespace in the completion ledger.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::habit::Periodicity;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid bucket key '{0}': expected YYYY-MM-DD or YYYY-WW")]
pub struct InvalidBucket(pub String);

/// A single day or a single ISO week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    Day(NaiveDate),
    /// Stored as the Monday that opens the week.
    Week(NaiveDate),
}

impl Bucket {
    /// The bucket containing `date` for a habit of the given periodicity.
    pub fn containing(periodicity: Periodicity, date: NaiveDate) -> Self {
        match periodicity {
            Periodicity::Daily => Bucket::Day(date),
            Periodicity::Weekly => Bucket::Week(week_start(date)),
        }
    }

    pub fn periodicity(&self) -> Periodicity {
        match self {
            Bucket::Day(_) => Periodicity::Daily,
            Bucket::Week(_) => Periodicity::Weekly,
        }
    }

    /// The bucket immediately after this one, or `None` past the last
    /// representable date.
    pub fn next(&self) -> Option<Self> {
        match self {
            Bucket::Day(d) => d.checked_add_signed(Duration::days(1)).map(Bucket::Day),
            Bucket::Week(monday) => monday.checked_add_signed(Duration::weeks(1)).map(Bucket::Week),
        }
    }

    /// Read a `YYYY-WW` key written with `%W` numbering: weeks start on
    /// Monday and week `00` holds the days before the first Monday of the
    /// year. Only used for keys that have no ISO reading.
    pub(crate) fn from_monday_week(key: &str) -> Option<Self> {
        let (year, week) = key.split_once('-')?;
        if year.len() != 4 || week.len() != 2 {
            return None;
        }
        let year: i32 = year.parse().ok()?;
        let week: i64 = week.parse().ok()?;
        if week > 53 {
            return None;
        }
        let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let first_monday = jan1 + Duration::days((7 - jan1.weekday().num_days_from_monday() as i64) % 7);
        let monday = first_monday.checked_add_signed(Duration::weeks(week - 1))?;
        (monday.year() == year || week == 0).then_some(Bucket::Week(monday))
    }

    /// First calendar day covered by the bucket.
    pub fn first_day(&self) -> NaiveDate {
        match self {
            Bucket::Day(d) | Bucket::Week(d) => *d,
        }
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Bucket::Week(monday) => {
                let iso = monday.iso_week();
                write!(f, "{:04}-{:02}", iso.year(), iso.week())
            }
        }
    }
}

impl FromStr for Bucket {
    type Err = InvalidBucket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidBucket(s.to_string());
        let parts: Vec<&str> = s.split('-').collect();
        match parts.as_slice() {
            [_, _, _] => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Bucket::Day)
                .map_err(|_| invalid()),
            [year, week] if year.len() == 4 && week.len() == 2 => {
                let year: i32 = year.parse().map_err(|_| invalid())?;
                let week: u32 = week.parse().map_err(|_| invalid())?;
                NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
                    .map(Bucket::Week)
                    .ok_or_else(invalid)
            }
            _ => Err(invalid()),
        }
    }
}

impl Serialize for Bucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Bucket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
