//! Payment methods and the credit-card classification rule.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::*;
use crate::transaction::TransactionKind;

/// Explicit classification of a payment method.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaymentMethodKind {
    Cash,
    Pix,
    CreditCard,
    Boleto,
    Other,
}

impl PaymentMethodKind {
    /// Classifies a method from its display name.
    pub fn infer(name: &str) -> Self {
        let lowered = name.to_lowercase();
        if name_denotes_credit_card(name) {
            PaymentMethodKind::CreditCard
        } else if lowered.contains("pix") {
            PaymentMethodKind::Pix
        } else if lowered.contains("boleto") {
            PaymentMethodKind::Boleto
        } else if lowered.contains("cash") || lowered.contains("dinheiro") {
            PaymentMethodKind::Cash
        } else {
            PaymentMethodKind::Other
        }
    }
}

impl fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethodKind::Cash => "Cash",
            PaymentMethodKind::Pix => "Pix",
            PaymentMethodKind::CreditCard => "Credit Card",
            PaymentMethodKind::Boleto => "Boleto",
            PaymentMethodKind::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Name rule for records that carry no explicit kind.
pub fn name_denotes_credit_card(name: &str) -> bool {
    let lowered = name.to_lowercase();
    lowered.contains("credit") || lowered.contains("crédito")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub flow: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PaymentMethodKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_bank_account_id: Option<String>,
}

impl PaymentMethod {
    /// Creates a method whose kind is inferred from its name once, at creation.
    pub fn new(name: impl Into<String>, flow: TransactionKind) -> Self {
        let name = name.into();
        let kind = PaymentMethodKind::infer(&name);
        Self {
            id: new_id(),
            name,
            flow,
            kind: Some(kind),
            icon_url: None,
            linked_bank_account_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_kind(mut self, kind: PaymentMethodKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn linked_to(mut self, account_id: impl Into<String>) -> Self {
        self.linked_bank_account_id = Some(account_id.into());
        self
    }

    /// Resolved kind: the explicit tag when present, otherwise the name rule.
    pub fn effective_kind(&self) -> PaymentMethodKind {
        self.kind.unwrap_or_else(|| PaymentMethodKind::infer(&self.name))
    }

    pub fn is_credit_card(&self) -> bool {
        self.effective_kind() == PaymentMethodKind::CreditCard
    }

    pub fn linked_account(&self) -> Option<&str> {
        self.linked_bank_account_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }
}

impl Identifiable for PaymentMethod {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for PaymentMethod {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for PaymentMethod {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.flow)
    }
}
