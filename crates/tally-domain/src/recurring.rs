//! Recurring bills and their per-month payment flags.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::common::*;

/// A fixed monthly bill tracked by paid/unpaid flags per month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringBill {
    pub id: String,
    pub name: String,
    pub due_day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub payments: BTreeMap<String, bool>,
}

impl RecurringBill {
    pub fn new(name: impl Into<String>, due_day: u32) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            due_day,
            value: None,
            group: None,
            group_color: None,
            category_id: None,
            payments: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn is_paid(&self, month: YearMonth) -> bool {
        self.payments.get(&month.key()).copied().unwrap_or(false)
    }

    pub fn set_paid(&mut self, month: YearMonth, paid: bool) {
        self.payments.insert(month.key(), paid);
    }

    /// Flips the flag for `month` and returns the new value.
    pub fn toggle(&mut self, month: YearMonth) -> bool {
        let paid = !self.is_paid(month);
        self.set_paid(month, paid);
        paid
    }

    /// A bill follows a category through its explicit link, or by
    /// case-insensitive name when no link has been recorded.
    pub fn matches_category(&self, category: &Category) -> bool {
        match self.category_id.as_deref() {
            Some(id) => id == category.id,
            None => names_match(&self.name, &category.name),
        }
    }
}

impl Identifiable for RecurringBill {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for RecurringBill {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Payment state of a bill as seen on a given day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BillStatus {
    Paid,
    Overdue,
    DueToday,
    Upcoming,
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BillStatus::Paid => "Paid",
            BillStatus::Overdue => "Overdue",
            BillStatus::DueToday => "Due today",
            BillStatus::Upcoming => "Upcoming",
        };
        f.write_str(label)
    }
}
