//! Typed access to the ledger documents held by a [`KeyValueStore`].

use serde::{de::DeserializeOwned, Serialize};
use tally_domain::{
    BankAccount, Category, ClosingDays, PaymentMethod, PaymentMethodKind, RecurringBill,
    Transaction, TransactionKind,
};

use crate::{
    effective_date::EffectiveDateResolver,
    settings::EngineSettings,
    storage::{DocumentKey, KeyValueStore},
    CoreError,
};

/// Reads and rewrites whole collections. Every write replaces the document.
#[derive(Clone, Copy)]
pub struct Repository<'a> {
    store: &'a dyn KeyValueStore,
    settings: &'a EngineSettings,
}

impl<'a> Repository<'a> {
    pub fn new(store: &'a dyn KeyValueStore, settings: &'a EngineSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &'a EngineSettings {
        self.settings
    }

    pub fn store(&self) -> &'a dyn KeyValueStore {
        self.store
    }

    fn load<T: DeserializeOwned>(&self, key: DocumentKey) -> Result<Option<T>, CoreError> {
        match self.store.get(key.as_str())? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|err| CoreError::Serde {
                    key: key.as_str().to_string(),
                    message: err.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: DocumentKey, value: &T) -> Result<(), CoreError> {
        let json = serde_json::to_string(value).map_err(|err| CoreError::Serde {
            key: key.as_str().to_string(),
            message: err.to_string(),
        })?;
        self.store.set(key.as_str(), &json)
    }

    /// Loads a collection, persisting `defaults` the first time it is read.
    fn load_or_seed<T: Serialize + DeserializeOwned>(
        &self,
        key: DocumentKey,
        defaults: impl FnOnce() -> Vec<T>,
    ) -> Result<Vec<T>, CoreError> {
        if let Some(existing) = self.load(key)? {
            return Ok(existing);
        }
        let seeded = defaults();
        self.write(key, &seeded)?;
        tracing::debug!(key = key.as_str(), count = seeded.len(), "seeded defaults");
        Ok(seeded)
    }

    pub fn categories(&self) -> Result<Vec<Category>, CoreError> {
        self.load_or_seed(DocumentKey::Categories, default_categories)
    }

    pub fn save_categories(&self, categories: &[Category]) -> Result<(), CoreError> {
        self.write(DocumentKey::Categories, categories)
    }

    pub fn transactions(&self) -> Result<Vec<Transaction>, CoreError> {
        Ok(self.load(DocumentKey::Transactions)?.unwrap_or_default())
    }

    pub fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), CoreError> {
        self.write(DocumentKey::Transactions, transactions)
    }

    pub fn payment_methods(&self) -> Result<Vec<PaymentMethod>, CoreError> {
        self.load_or_seed(DocumentKey::PaymentMethods, default_payment_methods)
    }

    pub fn save_payment_methods(&self, methods: &[PaymentMethod]) -> Result<(), CoreError> {
        self.write(DocumentKey::PaymentMethods, methods)
    }

    pub fn bank_accounts(&self) -> Result<Vec<BankAccount>, CoreError> {
        self.load_or_seed(DocumentKey::BankAccounts, default_bank_accounts)
    }

    pub fn save_bank_accounts(&self, accounts: &[BankAccount]) -> Result<(), CoreError> {
        self.write(DocumentKey::BankAccounts, accounts)
    }

    pub fn closing_days(&self) -> Result<ClosingDays, CoreError> {
        Ok(self.load(DocumentKey::ClosingDays)?.unwrap_or_default())
    }

    pub fn save_closing_days(&self, days: &ClosingDays) -> Result<(), CoreError> {
        self.write(DocumentKey::ClosingDays, days)
    }

    pub fn recurring_bills(&self) -> Result<Vec<RecurringBill>, CoreError> {
        self.load_or_seed(DocumentKey::RecurringBills, Vec::new)
    }

    pub fn save_recurring_bills(&self, bills: &[RecurringBill]) -> Result<(), CoreError> {
        self.write(DocumentKey::RecurringBills, bills)
    }

    /// Loads every collection at once for read-side projections.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, CoreError> {
        Ok(LedgerSnapshot {
            categories: self.categories()?,
            transactions: self.transactions()?,
            payment_methods: self.payment_methods()?,
            bank_accounts: self.bank_accounts()?,
            closing_days: self.closing_days()?,
            recurring_bills: self.recurring_bills()?,
        })
    }
}

/// Point-in-time copy of all ledger collections.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    pub categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
    pub payment_methods: Vec<PaymentMethod>,
    pub bank_accounts: Vec<BankAccount>,
    pub closing_days: ClosingDays,
    pub recurring_bills: Vec<RecurringBill>,
}

impl LedgerSnapshot {
    pub fn resolver(&self, default_closing_day: u32) -> EffectiveDateResolver<'_> {
        EffectiveDateResolver::new(
            &self.payment_methods,
            &self.closing_days,
            default_closing_day,
        )
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn payment_method(&self, id: &str) -> Option<&PaymentMethod> {
        self.payment_methods.iter().find(|method| method.id == id)
    }
}

fn default_categories() -> Vec<Category> {
    [
        ("1", "Salary", TransactionKind::Income),
        ("2", "Food", TransactionKind::Expense),
        ("3", "Housing", TransactionKind::Expense),
        ("4", "Transport", TransactionKind::Expense),
        ("5", "Leisure", TransactionKind::Expense),
        ("6", "Health", TransactionKind::Expense),
        ("7", "Education", TransactionKind::Expense),
    ]
    .into_iter()
    .map(|(id, name, kind)| Category::new(name, kind).with_id(id))
    .collect()
}

fn default_payment_methods() -> Vec<PaymentMethod> {
    [
        ("pm1", "Pix", TransactionKind::Income, PaymentMethodKind::Pix),
        ("pm2", "Cash", TransactionKind::Income, PaymentMethodKind::Cash),
        ("pm3", "Pix", TransactionKind::Expense, PaymentMethodKind::Pix),
        (
            "pm4",
            "Credit Card",
            TransactionKind::Expense,
            PaymentMethodKind::CreditCard,
        ),
        ("pm5", "Cash", TransactionKind::Expense, PaymentMethodKind::Cash),
        ("pm6", "Boleto", TransactionKind::Expense, PaymentMethodKind::Boleto),
    ]
    .into_iter()
    .map(|(id, name, flow, kind)| PaymentMethod::new(name, flow).with_id(id).with_kind(kind))
    .collect()
}

fn default_bank_accounts() -> Vec<BankAccount> {
    vec![BankAccount::new("Main Wallet", 0.0).with_id("ba1")]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn first_read_seeds_and_persists_defaults() {
        let store = MemoryStore::new();
        let settings = EngineSettings::default();
        let repo = Repository::new(&store, &settings);

        let methods = repo.payment_methods().unwrap();
        assert_eq!(methods.len(), 6);
        assert!(methods.iter().any(|m| m.id == "pm4" && m.is_credit_card()));
        assert!(store.get("paymentMethods").unwrap().is_some());
        assert_eq!(repo.categories().unwrap().len(), 7);
        assert_eq!(repo.bank_accounts().unwrap()[0].id, "ba1");
        assert!(repo.recurring_bills().unwrap().is_empty());
    }

    #[test]
    fn transactions_and_closing_days_default_to_empty_without_writing() {
        let store = MemoryStore::new();
        let settings = EngineSettings::default();
        let repo = Repository::new(&store, &settings);

        assert!(repo.transactions().unwrap().is_empty());
        assert!(repo.closing_days().unwrap().is_empty());
        assert!(store.get("transactions").unwrap().is_none());
    }

    #[test]
    fn corrupt_documents_surface_as_errors() {
        let store = MemoryStore::new();
        store.set("transactions", "{not json").unwrap();
        let settings = EngineSettings::default();
        let repo = Repository::new(&store, &settings);

        let err = repo.transactions().expect_err("corrupt document must fail");
        assert!(
            matches!(err, CoreError::Serde { ref key, .. } if key == "transactions"),
            "unexpected error: {err:?}"
        );
    }
}
