//! The [`Tally`] facade: one store, one set of engine settings and a clock.
//!
//! Mutations take `&mut self` so a whole read-modify-write sequence, including
//! the invoice resync that follows it, runs without interleaving.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tally_config::{Config, ConfigManager};
use tally_core::{
    AccountService, CardSpendFilter, CategoryService, ClosingDayService, Clock, DocumentKey,
    EffectiveDateResolver, EngineSettings, InvoiceService, KeyValueStore, LedgerSnapshot,
    MemoryStore, PaymentMethodService, RecurringService, Repository, SummaryService,
    SyncOutcome, SyncReport, SystemClock, TransactionFilter, TransactionService,
};
use tally_domain::{
    BankAccount, BankAccountSummary, BillStatus, BillStatusCounts, CardInvoiceMonth, Category,
    CategorySummary, ClosingDays, MonthlySummary, OriginBreakdown, PaymentMethod, RecurringBill,
    SpendingGroup, Transaction, TransactionStatus, TransactionTotals, YearMonth, YearlyHistoryPoint,
};
use tally_storage_json::{backup, FileStore, ImportReport};

use crate::errors::TallyResult;

pub struct Tally {
    store: Box<dyn KeyValueStore>,
    settings: EngineSettings,
    clock: Box<dyn Clock>,
}

impl Tally {
    pub fn new(store: Box<dyn KeyValueStore>, settings: EngineSettings) -> Self {
        Self {
            store,
            settings,
            clock: Box::new(SystemClock),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()), EngineSettings::default())
    }

    /// Opens the file store in the configured data directory.
    pub fn open(config: &Config) -> TallyResult<Self> {
        config.validate()?;
        let store = FileStore::open(config.resolve_data_dir())?;
        Ok(Self::new(Box::new(store), config.to_engine_settings()))
    }

    /// Loads the user configuration from its default location and opens its store.
    pub fn open_default() -> TallyResult<Self> {
        let config = ConfigManager::default_location()?.load()?;
        Self::open(&config)
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn repo(&self) -> Repository<'_> {
        Repository::new(self.store.as_ref(), &self.settings)
    }

    pub fn format_currency(&self, value: f64) -> String {
        self.settings.format_currency(value)
    }

    // Transactions

    pub fn transaction(&self, id: &str) -> TallyResult<Transaction> {
        Ok(TransactionService::get(&self.repo(), id)?)
    }

    pub fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> TallyResult<Vec<Transaction>> {
        Ok(TransactionService::list(&self.repo(), filter)?)
    }

    /// Income and expense sums of the transactions matching `filter`.
    pub fn totals(&self, filter: &TransactionFilter) -> TallyResult<TransactionTotals> {
        Ok(self.list_transactions(filter)?.iter().collect())
    }

    pub fn save_transaction(&mut self, txn: Transaction) -> TallyResult<Vec<String>> {
        Ok(TransactionService::save(&self.repo(), txn)?)
    }

    pub fn delete_transaction(&mut self, id: &str, delete_all_next: bool) -> TallyResult<bool> {
        let today = self.today();
        Ok(TransactionService::delete(
            &self.repo(),
            id,
            delete_all_next,
            today,
        )?)
    }

    pub fn toggle_status(&mut self, id: &str) -> TallyResult<TransactionStatus> {
        Ok(TransactionService::toggle_status(&self.repo(), id)?)
    }

    /// Billing-cycle date of `txn` under the current methods and closing days.
    pub fn effective_date(&self, txn: &Transaction) -> TallyResult<NaiveDate> {
        let repo = self.repo();
        let methods = repo.payment_methods()?;
        let closing_days = repo.closing_days()?;
        let resolver =
            EffectiveDateResolver::new(&methods, &closing_days, self.settings.default_closing_day);
        Ok(resolver.resolve(txn))
    }

    // Invoices

    pub fn sync_invoice(&mut self, card_id: &str, month: YearMonth) -> TallyResult<SyncOutcome> {
        Ok(InvoiceService::sync_invoice(&self.repo(), card_id, month)?)
    }

    pub fn sync_all_linked_invoices(&mut self) -> TallyResult<SyncReport> {
        let today = self.today();
        Ok(InvoiceService::sync_all_linked_invoices(&self.repo(), today)?)
    }

    // Projections

    pub fn snapshot(&self) -> TallyResult<LedgerSnapshot> {
        Ok(self.repo().snapshot()?)
    }

    pub fn monthly_summary(&self, month: YearMonth) -> TallyResult<MonthlySummary> {
        Ok(SummaryService::monthly_summary(
            &self.snapshot()?,
            &self.settings,
            month,
        ))
    }

    pub fn category_summary(&self, month: YearMonth) -> TallyResult<Vec<CategorySummary>> {
        Ok(SummaryService::category_summary(
            &self.snapshot()?,
            &self.settings,
            month,
        ))
    }

    pub fn bank_account_summaries(&self) -> TallyResult<Vec<BankAccountSummary>> {
        Ok(SummaryService::bank_account_summaries(
            &self.snapshot()?,
            &self.settings,
        ))
    }

    pub fn origin_breakdown(&self, month: YearMonth) -> TallyResult<OriginBreakdown> {
        Ok(SummaryService::origin_breakdown(
            &self.snapshot()?,
            &self.settings,
            month,
        ))
    }

    pub fn card_spend_by_category(&self, filter: &CardSpendFilter) -> TallyResult<SpendingGroup> {
        Ok(SummaryService::card_spend_by_category(
            &self.snapshot()?,
            &self.settings,
            filter,
        ))
    }

    pub fn yearly_history(&self, year: i32) -> TallyResult<Vec<YearlyHistoryPoint>> {
        Ok(SummaryService::yearly_history(
            &self.snapshot()?,
            &self.settings,
            year,
        ))
    }

    pub fn card_invoices_for_year(
        &self,
        year: i32,
        account_filter: Option<&str>,
    ) -> TallyResult<Vec<CardInvoiceMonth>> {
        Ok(SummaryService::card_invoices_for_year(
            &self.snapshot()?,
            &self.settings,
            year,
            account_filter,
        ))
    }

    pub fn card_spend_for_month(&self, month: YearMonth) -> TallyResult<f64> {
        Ok(SummaryService::card_spend_for_month(
            &self.snapshot()?,
            &self.settings,
            month,
        ))
    }

    // Recurring bills

    pub fn bills(&self) -> TallyResult<Vec<RecurringBill>> {
        Ok(RecurringService::list(&self.repo())?)
    }

    pub fn save_bill(&mut self, bill: RecurringBill) -> TallyResult<()> {
        Ok(RecurringService::save(&self.repo(), bill)?)
    }

    pub fn delete_bill(&mut self, bill_id: &str) -> TallyResult<bool> {
        Ok(RecurringService::delete(&self.repo(), bill_id)?)
    }

    pub fn toggle_bill_payment(&mut self, bill_id: &str, month: YearMonth) -> TallyResult<bool> {
        Ok(RecurringService::toggle_payment(&self.repo(), bill_id, month)?)
    }

    pub fn set_bill_payment(
        &mut self,
        bill_id: &str,
        month: YearMonth,
        paid: bool,
    ) -> TallyResult<()> {
        Ok(RecurringService::set_payment(
            &self.repo(),
            bill_id,
            month,
            paid,
        )?)
    }

    pub fn bill_status(&self, bill: &RecurringBill, year: i32) -> BillStatus {
        RecurringService::status(bill, year, self.today())
    }

    pub fn bill_status_counts(&self, year: i32) -> TallyResult<BillStatusCounts> {
        Ok(RecurringService::status_counts(
            &self.repo(),
            year,
            self.today(),
        )?)
    }

    pub fn bills_due_today(&self) -> TallyResult<Vec<RecurringBill>> {
        Ok(RecurringService::due_today(&self.repo(), self.today())?)
    }

    pub fn link_bill_categories(&mut self) -> TallyResult<usize> {
        Ok(RecurringService::link_bill_categories(&self.repo())?)
    }

    // Reference data

    pub fn categories(&self) -> TallyResult<Vec<Category>> {
        Ok(CategoryService::list(&self.repo())?)
    }

    pub fn save_category(&mut self, category: Category) -> TallyResult<()> {
        Ok(CategoryService::save(&self.repo(), category)?)
    }

    pub fn delete_category(&mut self, id: &str) -> TallyResult<bool> {
        Ok(CategoryService::delete(&self.repo(), id)?)
    }

    pub fn payment_methods(&self) -> TallyResult<Vec<PaymentMethod>> {
        Ok(PaymentMethodService::list(&self.repo())?)
    }

    pub fn credit_cards(&self) -> TallyResult<Vec<PaymentMethod>> {
        Ok(PaymentMethodService::credit_cards(&self.repo())?)
    }

    pub fn save_payment_method(&mut self, method: PaymentMethod) -> TallyResult<()> {
        let today = self.today();
        Ok(PaymentMethodService::save(&self.repo(), method, today)?)
    }

    pub fn delete_payment_method(&mut self, id: &str) -> TallyResult<bool> {
        let today = self.today();
        Ok(PaymentMethodService::delete(&self.repo(), id, today)?)
    }

    pub fn link_card_account(
        &mut self,
        card_id: &str,
        account_id: Option<&str>,
    ) -> TallyResult<()> {
        let today = self.today();
        Ok(PaymentMethodService::link_account(
            &self.repo(),
            card_id,
            account_id,
            today,
        )?)
    }

    pub fn bank_accounts(&self) -> TallyResult<Vec<BankAccount>> {
        Ok(AccountService::list(&self.repo())?)
    }

    pub fn save_bank_account(&mut self, account: BankAccount) -> TallyResult<()> {
        Ok(AccountService::save(&self.repo(), account)?)
    }

    pub fn delete_bank_account(&mut self, id: &str) -> TallyResult<bool> {
        Ok(AccountService::delete(&self.repo(), id)?)
    }

    pub fn closing_days(&self) -> TallyResult<ClosingDays> {
        Ok(ClosingDayService::all(&self.repo())?)
    }

    pub fn closing_day(&self, month: YearMonth) -> TallyResult<u32> {
        Ok(ClosingDayService::closing_day(&self.repo(), month)?)
    }

    pub fn set_closing_day(&mut self, month: YearMonth, day: u32) -> TallyResult<u32> {
        let today = self.today();
        Ok(ClosingDayService::set_closing_day(
            &self.repo(),
            month,
            day,
            today,
        )?)
    }

    pub fn reset_closing_day(&mut self, month: YearMonth) -> TallyResult<bool> {
        let today = self.today();
        Ok(ClosingDayService::reset_closing_day(
            &self.repo(),
            month,
            today,
        )?)
    }

    // Backups and opaque documents

    pub fn export_backup(&self) -> TallyResult<String> {
        Ok(backup::export_to_string(self.store.as_ref())?)
    }

    /// Writes a timestamped backup file into `dir`.
    pub fn write_backup(&self, dir: &Path) -> TallyResult<PathBuf> {
        let at = self.clock.now().naive_utc();
        Ok(backup::write_export(self.store.as_ref(), dir, at)?)
    }

    pub fn import_backup(&mut self, text: &str) -> TallyResult<ImportReport> {
        Ok(backup::import_from_str(self.store.as_ref(), text)?)
    }

    pub fn import_backup_file(&mut self, path: &Path) -> TallyResult<ImportReport> {
        Ok(backup::import_from_path(self.store.as_ref(), path)?)
    }

    pub fn copyright_image(&self) -> TallyResult<Option<String>> {
        Ok(self.store.get(DocumentKey::CopyrightImage.as_str())?)
    }

    pub fn set_copyright_image(&mut self, image: Option<&str>) -> TallyResult<()> {
        let key = DocumentKey::CopyrightImage.as_str();
        match image {
            Some(image) => self.store.set(key, image)?,
            None => self.store.remove(key)?,
        }
        Ok(())
    }
}
