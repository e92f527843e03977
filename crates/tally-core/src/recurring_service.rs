//! Recurring bills: CRUD, monthly payment flags and due-date status.

use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};
use tally_domain::{
    names_match, BillStatus, BillStatusCounts, Category, RecurringBill, Transaction, YearMonth,
};

use crate::{repository::Repository, CoreError};

pub struct RecurringService;

impl RecurringService {
    pub fn list(repo: &Repository<'_>) -> Result<Vec<RecurringBill>, CoreError> {
        repo.recurring_bills()
    }

    /// Inserts or replaces a bill by id.
    pub fn save(repo: &Repository<'_>, bill: RecurringBill) -> Result<(), CoreError> {
        if bill.name.trim().is_empty() {
            return Err(CoreError::Validation("bill name must not be empty".into()));
        }
        if !(1..=31).contains(&bill.due_day) {
            return Err(CoreError::Validation(format!(
                "due day must be between 1 and 31, got {}",
                bill.due_day
            )));
        }
        let mut bills = repo.recurring_bills()?;
        match bills.iter_mut().find(|existing| existing.id == bill.id) {
            Some(existing) => *existing = bill,
            None => bills.push(bill),
        }
        repo.save_recurring_bills(&bills)
    }

    pub fn delete(repo: &Repository<'_>, bill_id: &str) -> Result<bool, CoreError> {
        let mut bills = repo.recurring_bills()?;
        let before = bills.len();
        bills.retain(|bill| bill.id != bill_id);
        if bills.len() == before {
            return Ok(false);
        }
        repo.save_recurring_bills(&bills)?;
        Ok(true)
    }

    /// Flips the paid flag for `month` and returns the new value.
    pub fn toggle_payment(
        repo: &Repository<'_>,
        bill_id: &str,
        month: YearMonth,
    ) -> Result<bool, CoreError> {
        Self::update_bill(repo, bill_id, |bill| bill.toggle(month))
    }

    pub fn set_payment(
        repo: &Repository<'_>,
        bill_id: &str,
        month: YearMonth,
        paid: bool,
    ) -> Result<(), CoreError> {
        Self::update_bill(repo, bill_id, |bill| bill.set_paid(month, paid))
    }

    /// Status of `bill` in `year`, judged against the month and day of `today`.
    pub fn status(bill: &RecurringBill, year: i32, today: NaiveDate) -> BillStatus {
        if bill.is_paid(YearMonth::new(year, today.month0())) {
            return BillStatus::Paid;
        }
        match year.cmp(&today.year()) {
            Ordering::Less => BillStatus::Overdue,
            Ordering::Greater => BillStatus::Upcoming,
            Ordering::Equal => match bill.due_day.cmp(&today.day()) {
                Ordering::Less => BillStatus::Overdue,
                Ordering::Equal => BillStatus::DueToday,
                Ordering::Greater => BillStatus::Upcoming,
            },
        }
    }

    pub fn status_counts(
        repo: &Repository<'_>,
        year: i32,
        today: NaiveDate,
    ) -> Result<BillStatusCounts, CoreError> {
        let mut counts = BillStatusCounts::default();
        for bill in repo.recurring_bills()? {
            counts.record(Self::status(&bill, year, today));
        }
        Ok(counts)
    }

    /// Unpaid bills falling due on `today`.
    pub fn due_today(
        repo: &Repository<'_>,
        today: NaiveDate,
    ) -> Result<Vec<RecurringBill>, CoreError> {
        let month = YearMonth::from_date(today);
        Ok(repo
            .recurring_bills()?
            .into_iter()
            .filter(|bill| bill.due_day == today.day() && !bill.is_paid(month))
            .collect())
    }

    /// Records an explicit category link on every bill that is still matched
    /// by name. Returns the number of bills updated.
    pub fn link_bill_categories(repo: &Repository<'_>) -> Result<usize, CoreError> {
        let categories = repo.categories()?;
        let mut bills = repo.recurring_bills()?;
        let mut linked = 0;
        for bill in bills.iter_mut().filter(|bill| bill.category_id.is_none()) {
            if let Some(category) = categories
                .iter()
                .find(|category| names_match(&bill.name, &category.name))
            {
                bill.category_id = Some(category.id.clone());
                linked += 1;
            }
        }
        if linked > 0 {
            repo.save_recurring_bills(&bills)?;
            tracing::info!(linked, "linked recurring bills to categories");
        }
        Ok(linked)
    }

    /// Marks bills paid for the booking month of each expense in `written`.
    pub(crate) fn mark_paid_for(
        repo: &Repository<'_>,
        written: &[Transaction],
    ) -> Result<(), CoreError> {
        let expenses: Vec<&Transaction> = written
            .iter()
            .filter(|txn| txn.is_expense() && !txn.is_synthetic_invoice())
            .collect();
        if expenses.is_empty() {
            return Ok(());
        }
        let categories = repo.categories()?;
        let mut bills = repo.recurring_bills()?;
        let mut changed = false;
        for txn in expenses {
            let month = txn.booking_month();
            for bill in bills
                .iter_mut()
                .filter(|bill| bill_follows(bill, &txn.category_id, &categories))
            {
                if !bill.is_paid(month) {
                    bill.set_paid(month, true);
                    changed = true;
                }
            }
        }
        if changed {
            repo.save_recurring_bills(&bills)?;
        }
        Ok(())
    }

    /// Clears bill flags for months in which no transaction of the category remains.
    pub(crate) fn clear_unbacked(
        repo: &Repository<'_>,
        removed: &[Transaction],
        remaining: &[Transaction],
    ) -> Result<(), CoreError> {
        let orphaned: Vec<(&str, YearMonth)> = removed
            .iter()
            .filter(|txn| txn.is_expense() && !txn.is_synthetic_invoice())
            .map(|txn| (txn.category_id.as_str(), txn.booking_month()))
            .filter(|(category_id, month)| {
                !remaining.iter().any(|other| {
                    !other.is_synthetic_invoice()
                        && other.category_id == *category_id
                        && other.booking_month() == *month
                })
            })
            .collect();
        if orphaned.is_empty() {
            return Ok(());
        }
        let categories = repo.categories()?;
        let mut bills = repo.recurring_bills()?;
        let mut changed = false;
        for (category_id, month) in orphaned {
            for bill in bills
                .iter_mut()
                .filter(|bill| bill_follows(bill, category_id, &categories))
            {
                if bill.is_paid(month) {
                    bill.set_paid(month, false);
                    changed = true;
                }
            }
        }
        if changed {
            repo.save_recurring_bills(&bills)?;
        }
        Ok(())
    }

    fn update_bill<T>(
        repo: &Repository<'_>,
        bill_id: &str,
        apply: impl FnOnce(&mut RecurringBill) -> T,
    ) -> Result<T, CoreError> {
        let mut bills = repo.recurring_bills()?;
        let bill = bills
            .iter_mut()
            .find(|bill| bill.id == bill_id)
            .ok_or_else(|| CoreError::BillNotFound(bill_id.to_string()))?;
        let result = apply(bill);
        repo.save_recurring_bills(&bills)?;
        Ok(result)
    }
}

/// Whether `bill` tracks the category with `category_id`. Ids missing from
/// the category list only match explicit links.
fn bill_follows(bill: &RecurringBill, category_id: &str, categories: &[Category]) -> bool {
    match categories.iter().find(|category| category.id == category_id) {
        Some(category) => bill.matches_category(category),
        None => bill.category_id.as_deref() == Some(category_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn status_follows_due_day_in_current_year() {
        let today = date(2026, 5, 15);
        assert_eq!(
            RecurringService::status(&RecurringBill::new("Gym", 10), 2026, today),
            BillStatus::Overdue
        );
        assert_eq!(
            RecurringService::status(&RecurringBill::new("Gym", 15), 2026, today),
            BillStatus::DueToday
        );
        assert_eq!(
            RecurringService::status(&RecurringBill::new("Gym", 20), 2026, today),
            BillStatus::Upcoming
        );
    }

    #[test]
    fn status_compares_other_years_wholesale() {
        let today = date(2026, 5, 15);
        let bill = RecurringBill::new("Rent", 28);
        assert_eq!(RecurringService::status(&bill, 2025, today), BillStatus::Overdue);
        assert_eq!(RecurringService::status(&bill, 2027, today), BillStatus::Upcoming);
    }

    #[test]
    fn paid_flag_wins_over_dates() {
        let today = date(2026, 5, 15);
        let mut bill = RecurringBill::new("Rent", 1);
        bill.set_paid(YearMonth::new(2025, 4), true);
        assert_eq!(RecurringService::status(&bill, 2025, today), BillStatus::Paid);
        assert_eq!(RecurringService::status(&bill, 2026, today), BillStatus::Overdue);
    }

    #[test]
    fn unknown_category_ids_only_match_explicit_links() {
        let bill = RecurringBill::new("Gym", 5).with_category("42");
        assert!(bill_follows(&bill, "42", &[]));
        assert!(!bill_follows(&RecurringBill::new("Gym", 5), "42", &[]));
    }
}
