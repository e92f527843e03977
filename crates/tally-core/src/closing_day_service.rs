use chrono::NaiveDate;
use tally_domain::{ClosingDays, YearMonth};

use crate::{invoice_service::InvoiceService, repository::Repository, CoreError};

pub struct ClosingDayService;

impl ClosingDayService {
    pub fn all(repo: &Repository<'_>) -> Result<ClosingDays, CoreError> {
        repo.closing_days()
    }

    /// Closing day in effect for purchases made in `month`.
    pub fn closing_day(repo: &Repository<'_>, month: YearMonth) -> Result<u32, CoreError> {
        Ok(repo
            .closing_days()?
            .day_for(month, repo.settings().default_closing_day))
    }

    /// Stores the closing day for `month`, clamped to `1..=31`, and resyncs
    /// invoices. Returns the stored day.
    pub fn set_closing_day(
        repo: &Repository<'_>,
        month: YearMonth,
        day: u32,
        today: NaiveDate,
    ) -> Result<u32, CoreError> {
        let day = day.clamp(1, 31);
        let mut days = repo.closing_days()?;
        days.set(month, day);
        repo.save_closing_days(&days)?;
        tracing::debug!(%month, day, "closing day set");
        InvoiceService::sync_all_linked_invoices(repo, today)?;
        Ok(day)
    }

    /// Drops the override for `month` so the default applies again.
    pub fn reset_closing_day(
        repo: &Repository<'_>,
        month: YearMonth,
        today: NaiveDate,
    ) -> Result<bool, CoreError> {
        let mut days = repo.closing_days()?;
        if days.remove(month).is_none() {
            return Ok(false);
        }
        repo.save_closing_days(&days)?;
        InvoiceService::sync_all_linked_invoices(repo, today)?;
        Ok(true)
    }
}
