use tally_domain::BankAccount;

use crate::{repository::Repository, CoreError};

pub struct AccountService;

impl AccountService {
    pub fn list(repo: &Repository<'_>) -> Result<Vec<BankAccount>, CoreError> {
        repo.bank_accounts()
    }

    pub fn save(repo: &Repository<'_>, account: BankAccount) -> Result<(), CoreError> {
        if account.name.trim().is_empty() {
            return Err(CoreError::Validation("account name must not be empty".into()));
        }
        if !account.initial_balance.is_finite() {
            return Err(CoreError::Validation(
                "initial balance must be a finite number".into(),
            ));
        }
        let mut accounts = repo.bank_accounts()?;
        match accounts.iter_mut().find(|existing| existing.id == account.id) {
            Some(existing) => *existing = account,
            None => accounts.push(account),
        }
        repo.save_bank_accounts(&accounts)
    }

    /// Refuses (`Ok(false)`) while transactions are booked to the account or a
    /// card posts its invoices there.
    pub fn delete(repo: &Repository<'_>, id: &str) -> Result<bool, CoreError> {
        let booked = repo
            .transactions()?
            .iter()
            .any(|txn| txn.bank_account_id == id);
        let linked = repo
            .payment_methods()?
            .iter()
            .any(|method| method.linked_account() == Some(id));
        if booked || linked {
            tracing::warn!(account = id, booked, linked, "refusing to delete referenced account");
            return Ok(false);
        }
        let mut accounts = repo.bank_accounts()?;
        let before = accounts.len();
        accounts.retain(|account| account.id != id);
        if accounts.len() == before {
            return Ok(false);
        }
        repo.save_bank_accounts(&accounts)?;
        Ok(true)
    }
}
