use std::{collections::BTreeMap, fmt, str::FromStr, sync::Mutex};

use crate::CoreError;

/// Logical documents persisted by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKey {
    Categories,
    Transactions,
    PaymentMethods,
    BankAccounts,
    ClosingDays,
    RecurringBills,
    CopyrightImage,
}

impl DocumentKey {
    /// Every key, in export order.
    pub const ALL: [DocumentKey; 7] = [
        DocumentKey::Categories,
        DocumentKey::Transactions,
        DocumentKey::PaymentMethods,
        DocumentKey::BankAccounts,
        DocumentKey::ClosingDays,
        DocumentKey::RecurringBills,
        DocumentKey::CopyrightImage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKey::Categories => "categories",
            DocumentKey::Transactions => "transactions",
            DocumentKey::PaymentMethods => "paymentMethods",
            DocumentKey::BankAccounts => "bankAccounts",
            DocumentKey::ClosingDays => "ccClosingDays",
            DocumentKey::RecurringBills => "recurringBills",
            DocumentKey::CopyrightImage => "copyrightImage",
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKey {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        DocumentKey::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| CoreError::InvalidOperation(format!("unknown document key `{value}`")))
    }
}

/// Abstraction over the key-to-JSON-document store backing the ledger.
///
/// Values are opaque strings; typed access lives in [`crate::Repository`].
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;
    fn remove(&self, key: &str) -> Result<(), CoreError>;
    fn keys(&self) -> Result<Vec<String>, CoreError>;
}

/// In-process store, used for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> T,
    ) -> Result<T, CoreError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".into()))?;
        Ok(f(&mut guard))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.with_entries(|entries| {
            entries.remove(key);
        })
    }

    fn keys(&self) -> Result<Vec<String>, CoreError> {
        self.with_entries(|entries| entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_keys_round_trip_through_names() {
        for key in DocumentKey::ALL {
            assert_eq!(key.as_str().parse::<DocumentKey>().unwrap(), key);
        }
        assert!("finances".parse::<DocumentKey>().is_err());
    }

    #[test]
    fn memory_store_overwrites_and_removes() {
        let store = MemoryStore::new();
        store.set("transactions", "[]").unwrap();
        store.set("transactions", "[1]").unwrap();
        assert_eq!(store.get("transactions").unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.keys().unwrap(), vec!["transactions".to_string()]);
        store.remove("transactions").unwrap();
        assert_eq!(store.get("transactions").unwrap(), None);
    }
}
