//! Synthetic credit-card invoice maintenance.
//!
//! Each card with a linked bank account gets one system-owned Expense
//! transaction per billing month, valued at the sum of the card purchases whose
//! effective date falls in that month. Invoices are rebuilt from source data on
//! every sync and removed once nothing contributes to them.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tally_domain::{
    invoice_notes_key, Category, ClosingDays, PaymentMethod, Transaction, TransactionKind,
    TransactionOrigin, TransactionStatus, YearMonth, INVOICE_NOTES_PREFIX,
};

use crate::{
    effective_date::EffectiveDateResolver, format::month_abbreviation, repository::Repository,
    settings::EngineSettings, CoreError,
};

/// Day of the billing month on which invoices are posted.
pub const INVOICE_DAY: u32 = 5;

/// Result of reconciling a single (card, month) invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Not a credit card, unknown, or not linked to an account.
    Skipped,
    Unchanged,
    Created,
    Updated,
    Removed,
}

impl SyncOutcome {
    pub fn is_change(self) -> bool {
        matches!(
            self,
            SyncOutcome::Created | SyncOutcome::Updated | SyncOutcome::Removed
        )
    }
}

/// Tally of outcomes from a full resync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl SyncReport {
    pub fn record(&mut self, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Skipped => self.skipped += 1,
            SyncOutcome::Unchanged => self.unchanged += 1,
            SyncOutcome::Created => self.created += 1,
            SyncOutcome::Updated => self.updated += 1,
            SyncOutcome::Removed => self.removed += 1,
        }
    }

    pub fn has_changes(&self) -> bool {
        self.created + self.updated + self.removed > 0
    }
}

/// Rebuilds invoices in an in-memory transaction list.
pub struct InvoicePlanner<'a> {
    resolver: EffectiveDateResolver<'a>,
    category_id: String,
    settings: &'a EngineSettings,
}

impl<'a> InvoicePlanner<'a> {
    pub fn new(
        methods: &'a [PaymentMethod],
        closing_days: &'a ClosingDays,
        categories: &[Category],
        settings: &'a EngineSettings,
    ) -> Self {
        Self {
            resolver: EffectiveDateResolver::new(
                methods,
                closing_days,
                settings.default_closing_day,
            ),
            category_id: invoice_category_id(categories, &settings.fallback_invoice_category_id),
            settings,
        }
    }

    /// Sum of the card's purchases billed in `month`, ignoring existing invoices.
    pub fn invoice_total(&self, transactions: &[Transaction], card_id: &str, month: YearMonth) -> f64 {
        transactions
            .iter()
            .filter(|txn| txn.payment_method_id == card_id && !txn.is_synthetic_invoice())
            .filter(|txn| self.resolver.month(txn) == month)
            .map(|txn| txn.value)
            .sum()
    }

    pub fn reconcile(
        &self,
        transactions: &mut Vec<Transaction>,
        card: &PaymentMethod,
        month: YearMonth,
    ) -> SyncOutcome {
        let Some(account_id) = card.linked_account().filter(|_| card.is_credit_card()) else {
            return SyncOutcome::Skipped;
        };
        let notes_key = invoice_notes_key(&card.id, month);
        let total = self.invoice_total(transactions, &card.id, month);
        let duplicates_removed = remove_duplicate_invoices(transactions, &notes_key);
        let existing = transactions
            .iter()
            .position(|txn| txn.notes.as_deref() == Some(notes_key.as_str()));

        if total <= 0.0 {
            return match existing {
                Some(idx) => {
                    transactions.remove(idx);
                    tracing::info!(card = %card.id, %month, "removed empty invoice");
                    SyncOutcome::Removed
                }
                None if duplicates_removed => SyncOutcome::Removed,
                None => SyncOutcome::Unchanged,
            };
        }

        let Some(date) = month.day(INVOICE_DAY) else {
            return SyncOutcome::Skipped;
        };
        let id = existing
            .map(|idx| transactions[idx].id.clone())
            .unwrap_or_else(|| format!("invoice-{}-{}-{}", card.id, month.month_index, month.year));
        let invoice = Transaction {
            id,
            date,
            description: format!(
                "Invoice: {} ({})",
                card.name,
                month_abbreviation(&self.settings.locale, month.month_index)
            ),
            category_id: self.category_id.clone(),
            bank_account_id: account_id.to_string(),
            kind: TransactionKind::Expense,
            value: total,
            payment_method_id: self.settings.invoice_payment_method_id.clone(),
            status: TransactionStatus::Projected,
            notes: Some(notes_key),
            installments: None,
            installment_index: None,
            group_id: None,
            origin: TransactionOrigin::SystemGenerated,
        };

        match existing {
            Some(idx) if transactions[idx] == invoice => {
                if duplicates_removed {
                    SyncOutcome::Updated
                } else {
                    SyncOutcome::Unchanged
                }
            }
            Some(idx) => {
                tracing::debug!(card = %card.id, %month, value = total, "updated invoice");
                transactions[idx] = invoice;
                SyncOutcome::Updated
            }
            None => {
                tracing::info!(card = %card.id, %month, value = total, "created invoice");
                transactions.push(invoice);
                SyncOutcome::Created
            }
        }
    }
}

/// Keeps only the first invoice carrying `notes_key`. Returns whether any were dropped.
fn remove_duplicate_invoices(transactions: &mut Vec<Transaction>, notes_key: &str) -> bool {
    let before = transactions.len();
    let mut seen = false;
    transactions.retain(|txn| {
        if txn.notes.as_deref() != Some(notes_key) {
            return true;
        }
        let keep = !seen;
        seen = true;
        keep
    });
    transactions.len() != before
}

/// Card id encoded in an invoice marker, for transactions that carry one.
fn invoice_card_id(txn: &Transaction) -> Option<&str> {
    let marker = txn.notes.as_deref()?.strip_prefix(INVOICE_NOTES_PREFIX)?;
    let mut parts = marker.rsplitn(3, '_');
    let _year = parts.next()?;
    let _month = parts.next()?;
    parts.next()
}

/// Cards whose purchases are carried by invoices instead of directly.
pub fn is_linked_card(method: &PaymentMethod) -> bool {
    method.is_credit_card() && method.linked_account().is_some()
}

/// First expense category about cards, else the first expense category, else `fallback`.
pub fn invoice_category_id(categories: &[Category], fallback: &str) -> String {
    categories
        .iter()
        .filter(|category| category.is_expense())
        .find(|category| {
            let name = category.name.to_lowercase();
            name.contains("card") || name.contains("cartão")
        })
        .or_else(|| categories.iter().find(|category| category.is_expense()))
        .map(|category| category.id.clone())
        .unwrap_or_else(|| fallback.to_string())
}

/// Months covered by a full resync around `today`.
pub fn sync_window(today: NaiveDate, settings: &EngineSettings) -> impl Iterator<Item = YearMonth> {
    let start = YearMonth::from_date(today).offset(-(settings.invoice_months_back as i32));
    start.range(settings.invoice_months_back + settings.invoice_months_ahead + 1)
}

/// Entry points that read and rewrite the transaction document.
pub struct InvoiceService;

impl InvoiceService {
    /// Reconciles the invoice of `card_id` for one billing month.
    pub fn sync_invoice(
        repo: &Repository<'_>,
        card_id: &str,
        month: YearMonth,
    ) -> Result<SyncOutcome, CoreError> {
        let methods = repo.payment_methods()?;
        let Some(card) = methods.iter().find(|method| method.id == card_id) else {
            tracing::debug!(card = card_id, "invoice sync skipped: unknown card");
            return Ok(SyncOutcome::Skipped);
        };
        if !is_linked_card(card) {
            return Ok(SyncOutcome::Skipped);
        }
        let categories = repo.categories()?;
        let closing_days = repo.closing_days()?;
        let mut transactions = repo.transactions()?;

        let planner = InvoicePlanner::new(&methods, &closing_days, &categories, repo.settings());
        let outcome = planner.reconcile(&mut transactions, card, month);
        if outcome.is_change() {
            repo.save_transactions(&transactions)?;
        }
        Ok(outcome)
    }

    /// Reconciles a batch of (card, month) pairs with one read and one write.
    pub fn sync_invoices<I>(repo: &Repository<'_>, targets: I) -> Result<SyncReport, CoreError>
    where
        I: IntoIterator<Item = (String, YearMonth)>,
    {
        let targets: BTreeSet<(String, YearMonth)> = targets.into_iter().collect();
        let mut report = SyncReport::default();
        if targets.is_empty() {
            return Ok(report);
        }

        let methods = repo.payment_methods()?;
        let categories = repo.categories()?;
        let closing_days = repo.closing_days()?;
        let mut transactions = repo.transactions()?;
        let planner = InvoicePlanner::new(&methods, &closing_days, &categories, repo.settings());

        for (card_id, month) in &targets {
            let outcome = match methods.iter().find(|method| &method.id == card_id) {
                Some(card) => planner.reconcile(&mut transactions, card, *month),
                None => SyncOutcome::Skipped,
            };
            tracing::debug!(card = %card_id, %month, ?outcome, "invoice reconciled");
            report.record(outcome);
        }

        if report.has_changes() {
            repo.save_transactions(&transactions)?;
        }
        Ok(report)
    }

    /// Reconciles every linked card across the sync window around `today`,
    /// writing the transaction document at most once. Invoices of cards that
    /// are no longer linked are dropped first.
    pub fn sync_all_linked_invoices(
        repo: &Repository<'_>,
        today: NaiveDate,
    ) -> Result<SyncReport, CoreError> {
        let methods = repo.payment_methods()?;
        let mut report = SyncReport::default();
        let linked: Vec<&PaymentMethod> = methods
            .iter()
            .filter(|method| is_linked_card(method))
            .collect();
        let mut transactions = repo.transactions()?;

        let before = transactions.len();
        transactions.retain(|txn| {
            invoice_card_id(txn).map_or(true, |card_id| linked.iter().any(|card| card.id == card_id))
        });
        report.removed += before - transactions.len();
        if linked.is_empty() {
            if report.has_changes() {
                repo.save_transactions(&transactions)?;
            }
            return Ok(report);
        }

        let categories = repo.categories()?;
        let closing_days = repo.closing_days()?;
        let planner = InvoicePlanner::new(&methods, &closing_days, &categories, repo.settings());

        for card in linked {
            for month in sync_window(today, repo.settings()) {
                report.record(planner.reconcile(&mut transactions, card, month));
            }
        }

        if report.has_changes() {
            repo.save_transactions(&transactions)?;
        }
        tracing::debug!(
            created = report.created,
            updated = report.updated,
            removed = report.removed,
            "linked invoices synchronized"
        );
        Ok(report)
    }
}
