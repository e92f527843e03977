//! Bank accounts that transactions are booked against.

use serde::{Deserialize, Serialize};

use crate::common::*;

/// A bank account. Its balance is always derived from transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub initial_balance: f64,
}

impl BankAccount {
    pub fn new(name: impl Into<String>, initial_balance: f64) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            icon_url: None,
            initial_balance,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

impl Identifiable for BankAccount {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for BankAccount {
    fn name(&self) -> &str {
        &self.name
    }
}
