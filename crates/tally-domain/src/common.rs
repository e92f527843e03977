//! Shared traits and calendar utilities for ledger records.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exposes a stable identifier for entities stored in the ledger.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Generates a fresh identifier for a new record.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Case-insensitive equality used for the name-based links between records.
pub fn names_match(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

/// A calendar month addressed by year and a zero-based month index.
///
/// The zero-based index is the representation used by persisted keys
/// (`"2026-0"` is January 2026) and by invoice markers, so it is kept as-is
/// rather than converted to chrono's one-based months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearMonth {
    pub year: i32,
    pub month_index: u32,
}

impl YearMonth {
    /// Builds a month, normalizing indexes outside `0..12` into later years.
    pub fn new(year: i32, month_index: u32) -> Self {
        Self::from_ordinal(year * 12 + month_index as i32)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month_index: date.month0(),
        }
    }

    fn ordinal(self) -> i32 {
        self.year * 12 + self.month_index as i32
    }

    fn from_ordinal(ordinal: i32) -> Self {
        Self {
            year: ordinal.div_euclid(12),
            month_index: ordinal.rem_euclid(12) as u32,
        }
    }

    /// Moves `months` calendar months forward (or backward when negative).
    pub fn offset(self, months: i32) -> Self {
        Self::from_ordinal(self.ordinal() + months)
    }

    /// Number of months from `self` to `other`.
    pub fn months_until(self, other: YearMonth) -> i32 {
        other.ordinal() - self.ordinal()
    }

    /// Persisted `"year-monthIndex"` key.
    pub fn key(self) -> String {
        format!("{}-{}", self.year, self.month_index)
    }

    pub fn parse_key(key: &str) -> Option<Self> {
        let (year, month) = key.trim().split_once('-')?;
        let year = year.parse::<i32>().ok()?;
        let month_index = month.parse::<u32>().ok()?;
        if month_index > 11 {
            return None;
        }
        Some(Self { year, month_index })
    }

    /// Returns the date for `day` in this month, if it exists.
    pub fn day(self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month_index + 1, day)
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        self.day(1)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month0() == self.month_index
    }

    /// Iterates `count` consecutive months starting at `self`.
    pub fn range(self, count: u32) -> impl Iterator<Item = YearMonth> {
        (0..count as i32).map(move |step| self.offset(step))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month_index + 1)
    }
}

/// Adds calendar months while keeping the day of month and letting surplus
/// days roll into the following month (Jan 31 + 1 month is Mar 3 in a common
/// year). Saturates at the limits of the supported date range.
pub fn add_months_rolling(date: NaiveDate, months: i32) -> NaiveDate {
    let target = YearMonth::from_date(date).offset(months);
    target
        .first_day()
        .and_then(|first| first.checked_add_signed(Duration::days(date.day0() as i64)))
        .unwrap_or(if months >= 0 {
            NaiveDate::MAX
        } else {
            NaiveDate::MIN
        })
}
