//! Credit-card closing-day configuration keyed by purchase month.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::YearMonth;

/// Closing day used for months without an explicit entry.
pub const DEFAULT_CLOSING_DAY: u32 = 25;

/// Map of `"year-monthIndex"` to the card closing day for purchases made in that month.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ClosingDays(BTreeMap<String, u32>);

impl ClosingDays {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closing day for purchases made in `month`. Missing and zero entries
    /// resolve to `default_day`.
    pub fn day_for(&self, month: YearMonth, default_day: u32) -> u32 {
        match self.0.get(&month.key()) {
            Some(day) if *day > 0 => *day,
            _ => default_day,
        }
    }

    pub fn set(&mut self, month: YearMonth, day: u32) {
        self.0.insert(month.key(), day);
    }

    pub fn remove(&mut self, month: YearMonth) -> Option<u32> {
        self.0.remove(&month.key())
    }

    pub fn entries(&self) -> impl Iterator<Item = (YearMonth, u32)> + '_ {
        self.0
            .iter()
            .filter_map(|(key, day)| YearMonth::parse_key(key).map(|month| (month, *day)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_zero_entries_use_default() {
        let mut days = ClosingDays::new();
        let march = YearMonth::new(2026, 2);
        assert_eq!(days.day_for(march, DEFAULT_CLOSING_DAY), 25);
        days.set(march, 0);
        assert_eq!(days.day_for(march, DEFAULT_CLOSING_DAY), 25);
        days.set(march, 10);
        assert_eq!(days.day_for(march, DEFAULT_CLOSING_DAY), 10);
    }

    #[test]
    fn serializes_as_plain_map() {
        let mut days = ClosingDays::new();
        days.set(YearMonth::new(2026, 0), 20);
        let json = serde_json::to_string(&days).expect("serialize");
        assert_eq!(json, r#"{"2026-0":20}"#);
    }
}
