use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use tally_domain::{
    add_months_rolling, new_id, Transaction, TransactionKind, TransactionStatus, YearMonth,
};

use crate::{
    effective_date::EffectiveDateResolver, invoice_service::InvoiceService,
    recurring_service::RecurringService, repository::Repository, CoreError,
};

/// Criteria for [`TransactionService::list`]. Empty criteria match everything
/// except synthetic invoices.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Case-insensitive match against description or notes.
    pub term: Option<String>,
    pub category_id: Option<String>,
    pub bank_account_id: Option<String>,
    pub payment_method_id: Option<String>,
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub month: Option<YearMonth>,
    pub year: Option<i32>,
    pub include_synthetic: bool,
}

impl TransactionFilter {
    pub fn for_month(month: YearMonth) -> Self {
        Self {
            month: Some(month),
            ..Self::default()
        }
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        if !self.include_synthetic && txn.is_synthetic_invoice() {
            return false;
        }
        if let Some(term) = self.term.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let in_description = txn.description.to_lowercase().contains(&term);
            let in_notes = txn
                .notes
                .as_deref()
                .is_some_and(|notes| notes.to_lowercase().contains(&term));
            if !in_description && !in_notes {
                return false;
            }
        }
        let field_matches = |wanted: &Option<String>, actual: &str| {
            wanted.as_deref().map_or(true, |wanted| wanted == actual)
        };
        field_matches(&self.category_id, &txn.category_id)
            && field_matches(&self.bank_account_id, &txn.bank_account_id)
            && field_matches(&self.payment_method_id, &txn.payment_method_id)
            && self.kind.map_or(true, |kind| kind == txn.kind)
            && self.status.map_or(true, |status| status == txn.status)
            && self.from.map_or(true, |from| txn.date >= from)
            && self.to.map_or(true, |to| txn.date <= to)
            && self.month.map_or(true, |month| month.contains(txn.date))
            && self.year.map_or(true, |year| txn.booking_month().year == year)
    }
}

/// Transaction lifecycle: validation, installment expansion and the bill and
/// invoice side effects of every write.
pub struct TransactionService;

impl TransactionService {
    pub fn get(repo: &Repository<'_>, id: &str) -> Result<Transaction, CoreError> {
        repo.transactions()?
            .into_iter()
            .find(|txn| txn.id == id)
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))
    }

    /// Matching transactions, newest first.
    pub fn list(
        repo: &Repository<'_>,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, CoreError> {
        let mut matching: Vec<Transaction> = repo
            .transactions()?
            .into_iter()
            .filter(|txn| filter.matches(txn))
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(matching)
    }

    /// Creates or updates a transaction and returns the ids written.
    ///
    /// A new credit-card purchase with more than one installment is split into
    /// monthly parts sharing a group id. Expense writes mark the matching
    /// recurring bills paid for the booking month, and every card month the
    /// write touches (before and after an edit) gets its invoice reconciled.
    pub fn save(repo: &Repository<'_>, txn: Transaction) -> Result<Vec<String>, CoreError> {
        Self::validate(&txn)?;

        let mut transactions = repo.transactions()?;
        let methods = repo.payment_methods()?;
        let closing_days = repo.closing_days()?;
        let resolver = EffectiveDateResolver::new(
            &methods,
            &closing_days,
            repo.settings().default_closing_day,
        );

        let previous = transactions.iter().find(|existing| existing.id == txn.id).cloned();
        let split = previous.is_none()
            && txn.installments.is_some_and(|count| count > 1)
            && resolver.is_credit_card(&txn.payment_method_id);
        let batch = if split {
            let parts = Self::expand_installments(&txn, &new_id());
            tracing::info!(
                description = %txn.description,
                installments = parts.len(),
                "expanded installment purchase"
            );
            parts
        } else {
            vec![txn]
        };

        let mut card_months = BTreeSet::new();
        if let Some(previous) = &previous {
            if resolver.is_credit_card(&previous.payment_method_id) {
                card_months.insert((previous.payment_method_id.clone(), resolver.month(previous)));
            }
        }
        for item in &batch {
            if resolver.is_credit_card(&item.payment_method_id) {
                card_months.insert((item.payment_method_id.clone(), resolver.month(item)));
            }
            match transactions.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => *existing = item.clone(),
                None => transactions.push(item.clone()),
            }
        }
        repo.save_transactions(&transactions)?;

        RecurringService::mark_paid_for(repo, &batch)?;
        InvoiceService::sync_invoices(repo, card_months)?;

        Ok(batch.into_iter().map(|item| item.id).collect())
    }

    /// Removes a transaction, or with `delete_all_next` the rest of its
    /// installment chain. Returns `false` when the id is unknown.
    pub fn delete(
        repo: &Repository<'_>,
        id: &str,
        delete_all_next: bool,
        today: NaiveDate,
    ) -> Result<bool, CoreError> {
        let mut transactions = repo.transactions()?;
        let Some(target) = transactions.iter().find(|txn| txn.id == id).cloned() else {
            return Ok(false);
        };

        let doomed: HashSet<String> = match (&target.group_id, target.installment_index) {
            (Some(group), Some(index)) if delete_all_next => transactions
                .iter()
                .filter(|txn| {
                    txn.group_id.as_deref() == Some(group.as_str())
                        && txn.installment_index.is_some_and(|other| other >= index)
                })
                .map(|txn| txn.id.clone())
                .collect(),
            _ => HashSet::from([target.id.clone()]),
        };
        let (removed, remaining): (Vec<Transaction>, Vec<Transaction>) = transactions
            .drain(..)
            .partition(|txn| doomed.contains(&txn.id));
        repo.save_transactions(&remaining)?;
        tracing::info!(id, removed = removed.len(), "deleted transactions");

        RecurringService::clear_unbacked(repo, &removed, &remaining)?;

        let methods = repo.payment_methods()?;
        let closing_days = repo.closing_days()?;
        let resolver = EffectiveDateResolver::new(
            &methods,
            &closing_days,
            repo.settings().default_closing_day,
        );
        let card_months: Vec<(String, YearMonth)> = removed
            .iter()
            .filter(|txn| resolver.is_credit_card(&txn.payment_method_id))
            .map(|txn| (txn.payment_method_id.clone(), resolver.month(txn)))
            .collect();
        if !card_months.is_empty() {
            InvoiceService::sync_all_linked_invoices(repo, today)?;
            // Months outside the window still lose their stale invoice.
            InvoiceService::sync_invoices(repo, card_months)?;
        }
        Ok(true)
    }

    /// Flips Paid/Projected and saves through [`TransactionService::save`].
    pub fn toggle_status(
        repo: &Repository<'_>,
        id: &str,
    ) -> Result<TransactionStatus, CoreError> {
        let mut txn = Self::get(repo, id)?;
        txn.status = txn.status.toggled();
        let status = txn.status;
        Self::save(repo, txn)?;
        Ok(status)
    }

    /// Splits `base` into `base.installments` monthly parts of equal value.
    pub fn expand_installments(base: &Transaction, group_id: &str) -> Vec<Transaction> {
        let count = base.installments.unwrap_or(1).max(1);
        let value = base.value / f64::from(count);
        (1..=count)
            .map(|index| Transaction {
                id: format!("{group_id}-{}", index - 1),
                date: add_months_rolling(base.date, (index - 1) as i32),
                description: format!("{} ({index}/{count})", base.description),
                value,
                installments: Some(count),
                installment_index: Some(index),
                group_id: Some(group_id.to_string()),
                ..base.clone()
            })
            .collect()
    }

    fn validate(txn: &Transaction) -> Result<(), CoreError> {
        if txn.is_synthetic_invoice() {
            return Err(CoreError::Validation(format!(
                "invoice {} is maintained by the invoice sync and cannot be edited",
                txn.id
            )));
        }
        let required = [
            ("id", &txn.id),
            ("category", &txn.category_id),
            ("bank account", &txn.bank_account_id),
            ("payment method", &txn.payment_method_id),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(CoreError::Validation(format!(
                "transaction {field} must not be empty"
            )));
        }
        if !txn.value.is_finite() || txn.value <= 0.0 {
            return Err(CoreError::Validation(format!(
                "transaction value must be positive, got {}",
                txn.value
            )));
        }
        if txn.installments == Some(0) {
            return Err(CoreError::Validation(
                "installment count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
