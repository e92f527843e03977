use chrono::NaiveDate;
use tally_domain::PaymentMethod;

use crate::{invoice_service::InvoiceService, repository::Repository, CoreError};

/// Payment methods. Every change that can alter card linkage is followed by a
/// full invoice resync.
pub struct PaymentMethodService;

impl PaymentMethodService {
    pub fn list(repo: &Repository<'_>) -> Result<Vec<PaymentMethod>, CoreError> {
        repo.payment_methods()
    }

    pub fn credit_cards(repo: &Repository<'_>) -> Result<Vec<PaymentMethod>, CoreError> {
        Ok(repo
            .payment_methods()?
            .into_iter()
            .filter(PaymentMethod::is_credit_card)
            .collect())
    }

    pub fn save(
        repo: &Repository<'_>,
        method: PaymentMethod,
        today: NaiveDate,
    ) -> Result<(), CoreError> {
        if method.name.trim().is_empty() {
            return Err(CoreError::Validation(
                "payment method name must not be empty".into(),
            ));
        }
        if let Some(account_id) = method.linked_account() {
            Self::ensure_account(repo, account_id)?;
        }
        let mut methods = repo.payment_methods()?;
        match methods.iter_mut().find(|existing| existing.id == method.id) {
            Some(existing) => *existing = method,
            None => methods.push(method),
        }
        repo.save_payment_methods(&methods)?;
        InvoiceService::sync_all_linked_invoices(repo, today)?;
        Ok(())
    }

    /// Points a card's invoices at `account_id`, or stops generating them with `None`.
    pub fn link_account(
        repo: &Repository<'_>,
        card_id: &str,
        account_id: Option<&str>,
        today: NaiveDate,
    ) -> Result<(), CoreError> {
        let account_id = account_id.filter(|id| !id.trim().is_empty());
        if let Some(account_id) = account_id {
            Self::ensure_account(repo, account_id)?;
        }
        let mut methods = repo.payment_methods()?;
        let card = methods
            .iter_mut()
            .find(|method| method.id == card_id)
            .ok_or_else(|| CoreError::PaymentMethodNotFound(card_id.to_string()))?;
        card.linked_bank_account_id = account_id.map(str::to_string);
        repo.save_payment_methods(&methods)?;
        tracing::info!(card = card_id, account = ?account_id, "card linkage changed");
        InvoiceService::sync_all_linked_invoices(repo, today)?;
        Ok(())
    }

    /// Returns `false` when the method is unknown or still used by a transaction.
    pub fn delete(repo: &Repository<'_>, id: &str, today: NaiveDate) -> Result<bool, CoreError> {
        if repo
            .transactions()?
            .iter()
            .any(|txn| txn.payment_method_id == id)
        {
            tracing::warn!(method = id, "refusing to delete payment method with transactions");
            return Ok(false);
        }
        let mut methods = repo.payment_methods()?;
        let before = methods.len();
        methods.retain(|method| method.id != id);
        if methods.len() == before {
            return Ok(false);
        }
        repo.save_payment_methods(&methods)?;
        InvoiceService::sync_all_linked_invoices(repo, today)?;
        Ok(true)
    }

    fn ensure_account(repo: &Repository<'_>, account_id: &str) -> Result<(), CoreError> {
        if repo
            .bank_accounts()?
            .iter()
            .any(|account| account.id == account_id)
        {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "bank account `{account_id}` does not exist"
            )))
        }
    }
}
