//! Derived read-side shapes produced by the aggregation services.

use serde::{Deserialize, Serialize};

use crate::account::BankAccount;
use crate::common::YearMonth;
use crate::recurring::BillStatus;
use crate::transaction::{Transaction, TransactionKind};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub month: YearMonth,
    pub total_income: f64,
    pub confirmed_income: f64,
    pub total_expense: f64,
    pub confirmed_expense: f64,
    pub balance: f64,
    pub confirmed_balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category_id: String,
    pub category_name: String,
    pub total: f64,
    pub confirmed_total: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountSummary {
    #[serde(flatten)]
    pub account: BankAccount,
    pub current_balance: f64,
    pub confirmed_balance: f64,
}

/// One month of the yearly chart series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YearlyHistoryPoint {
    pub label: String,
    pub month_index: u32,
    pub income: f64,
    pub expense: f64,
    pub confirmed_income: f64,
    pub confirmed_expense: f64,
    pub balance: f64,
}

/// Credit-card purchases attributed to one billing month.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardInvoiceMonth {
    pub total: f64,
    pub count: usize,
    pub transaction_ids: Vec<String>,
}

/// Spending of one category inside a breakdown. `category_id` is `None` for
/// transactions whose category no longer exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category_id: Option<String>,
    pub category_name: String,
    pub total: f64,
}

/// Expenses of one origin grouped by category, largest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpendingGroup {
    pub total: f64,
    pub categories: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountSpending {
    pub account_id: String,
    pub account_name: String,
    #[serde(flatten)]
    pub spending: SpendingGroup,
}

/// A month's expenses split by where the money left from: each account's
/// direct spending, plus every credit card together.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OriginBreakdown {
    pub accounts: Vec<AccountSpending>,
    pub credit_cards: SpendingGroup,
}

/// Income and expense sums of an arbitrary result set.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TransactionTotals {
    pub income: f64,
    pub expense: f64,
}

impl TransactionTotals {
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

impl<'a> FromIterator<&'a Transaction> for TransactionTotals {
    fn from_iter<I: IntoIterator<Item = &'a Transaction>>(iter: I) -> Self {
        iter.into_iter()
            .fold(TransactionTotals::default(), |mut totals, txn| {
                match txn.kind {
                    TransactionKind::Income => totals.income += txn.value,
                    TransactionKind::Expense => totals.expense += txn.value,
                }
                totals
            })
    }
}

/// Number of bills in each status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BillStatusCounts {
    pub paid: usize,
    pub overdue: usize,
    pub due_today: usize,
    pub upcoming: usize,
    pub total: usize,
}

impl BillStatusCounts {
    pub fn record(&mut self, status: BillStatus) {
        match status {
            BillStatus::Paid => self.paid += 1,
            BillStatus::Overdue => self.overdue += 1,
            BillStatus::DueToday => self.due_today += 1,
            BillStatus::Upcoming => self.upcoming += 1,
        }
        self.total += 1;
    }
}
