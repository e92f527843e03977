//! Domain types representing income and expense categories.

use serde::{Deserialize, Serialize};

use crate::common::*;
use crate::transaction::TransactionKind;

/// Categorises ledger activity for summaries and bill tracking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: TransactionKind) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            kind,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}

impl Identifiable for Category {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }
}
