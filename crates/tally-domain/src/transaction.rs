//! Domain models for ledger transactions and synthetic invoice markers.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::*;

/// Notes prefix reserved for system-generated credit-card invoices.
pub const INVOICE_NOTES_PREFIX: &str = "AUTO_INVOICE_";

/// Builds the notes marker that uniquely keys a card's invoice for a billing month.
pub fn invoice_notes_key(card_id: &str, month: YearMonth) -> String {
    format!(
        "{}{}_{}_{}",
        INVOICE_NOTES_PREFIX, card_id, month.month_index, month.year
    )
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub category_id: String,
    pub bank_account_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub value: f64,
    pub payment_method_id: String,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installments: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "TransactionOrigin::is_user_entered")]
    pub origin: TransactionOrigin,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        category_id: impl Into<String>,
        bank_account_id: impl Into<String>,
        kind: TransactionKind,
        value: f64,
        payment_method_id: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            date,
            description: description.into(),
            category_id: category_id.into(),
            bank_account_id: bank_account_id.into(),
            kind,
            value,
            payment_method_id: payment_method_id.into(),
            status: TransactionStatus::Paid,
            notes: None,
            installments: None,
            installment_index: None,
            group_id: None,
            origin: TransactionOrigin::UserEntered,
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_installments(mut self, installments: u32) -> Self {
        self.installments = Some(installments);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// True for invoice transactions owned by the synchronizer. Documents
    /// written before the origin tag existed are recognized by their notes.
    pub fn is_synthetic_invoice(&self) -> bool {
        self.origin == TransactionOrigin::SystemGenerated
            || self
                .notes
                .as_deref()
                .is_some_and(|notes| notes.starts_with(INVOICE_NOTES_PREFIX))
    }

    pub fn is_paid(&self) -> bool {
        self.status == TransactionStatus::Paid
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    /// Value with the sign implied by the transaction type.
    pub fn signed_value(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.value,
            TransactionKind::Expense => -self.value,
        }
    }

    /// Month of the booking (purchase) date.
    pub fn booking_month(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }

    pub fn is_installment(&self) -> bool {
        self.group_id.is_some() && self.installment_index.is_some()
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!("{} {} [{}]", self.date, self.description, self.status)
    }
}

/// Direction of money flow. Also used as the type of categories and payment methods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    #[serde(alias = "Receita")]
    Income,
    #[serde(alias = "Despesa")]
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        };
        f.write_str(label)
    }
}

/// Whether a transaction has happened or is only expected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    #[serde(alias = "Pago")]
    Paid,
    #[serde(alias = "Previsão")]
    Projected,
}

impl TransactionStatus {
    pub fn toggled(self) -> Self {
        match self {
            TransactionStatus::Paid => TransactionStatus::Projected,
            TransactionStatus::Projected => TransactionStatus::Paid,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionStatus::Paid => "Paid",
            TransactionStatus::Projected => "Projected",
        };
        f.write_str(label)
    }
}

/// Who owns a transaction record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TransactionOrigin {
    #[default]
    UserEntered,
    SystemGenerated,
}

impl TransactionOrigin {
    pub fn is_user_entered(&self) -> bool {
        matches!(self, TransactionOrigin::UserEntered)
    }
}
