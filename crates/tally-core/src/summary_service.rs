//! Read-side projections over a [`LedgerSnapshot`].
//!
//! Monthly and category views bucket transactions by effective date and leave
//! synthetic invoices out, since the purchases they stand for are already
//! counted. Account balances do the opposite: a card purchase whose billing
//! month has an invoice reaches an account only through that invoice.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use tally_domain::{
    invoice_notes_key, AccountSpending, BankAccountSummary, CardInvoiceMonth, CategorySummary,
    CategoryTotal, MonthlySummary, OriginBreakdown, SpendingGroup, Transaction, TransactionKind,
    YearMonth, YearlyHistoryPoint,
};

use crate::{format::month_abbreviation, repository::LedgerSnapshot, settings::EngineSettings};

/// Label used for transactions whose category no longer exists.
pub const UNKNOWN_CATEGORY_LABEL: &str = "Other";

#[derive(Debug, Clone, Copy, Default)]
struct Flow {
    income: f64,
    confirmed_income: f64,
    expense: f64,
    confirmed_expense: f64,
}

impl Flow {
    fn add(&mut self, txn: &Transaction) {
        match txn.kind {
            TransactionKind::Income => {
                self.income += txn.value;
                if txn.is_paid() {
                    self.confirmed_income += txn.value;
                }
            }
            TransactionKind::Expense => {
                self.expense += txn.value;
                if txn.is_paid() {
                    self.confirmed_expense += txn.value;
                }
            }
        }
    }
}

/// Criteria for [`SummaryService::card_spend_by_category`]. Dates bound the
/// purchase date, not the billing month.
#[derive(Debug, Clone, Default)]
pub struct CardSpendFilter {
    pub card_id: Option<String>,
    pub category_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl CardSpendFilter {
    fn matches(&self, txn: &Transaction) -> bool {
        self.card_id
            .as_deref()
            .map_or(true, |card| txn.payment_method_id == card)
            && self
                .category_id
                .as_deref()
                .map_or(true, |category| txn.category_id == category)
            && self.from.map_or(true, |from| txn.date >= from)
            && self.to.map_or(true, |to| txn.date <= to)
    }
}

fn group_by_category<'t>(
    snapshot: &LedgerSnapshot,
    transactions: impl IntoIterator<Item = &'t Transaction>,
) -> SpendingGroup {
    let mut totals: BTreeMap<Option<&str>, f64> = BTreeMap::new();
    for txn in transactions {
        let key = snapshot
            .category(&txn.category_id)
            .map(|category| category.id.as_str());
        *totals.entry(key).or_default() += txn.value;
    }
    let mut categories: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category_id, total)| CategoryTotal {
            category_name: category_id
                .and_then(|id| snapshot.category(id))
                .map_or_else(|| UNKNOWN_CATEGORY_LABEL.to_string(), |c| c.name.clone()),
            category_id: category_id.map(str::to_string),
            total,
        })
        .collect();
    categories.sort_by(|a, b| b.total.total_cmp(&a.total));
    SpendingGroup {
        total: categories.iter().map(|entry| entry.total).sum(),
        categories,
    }
}

pub struct SummaryService;

impl SummaryService {
    pub fn monthly_summary(
        snapshot: &LedgerSnapshot,
        settings: &EngineSettings,
        month: YearMonth,
    ) -> MonthlySummary {
        let resolver = snapshot.resolver(settings.default_closing_day);
        let mut flow = Flow::default();
        for txn in snapshot
            .transactions
            .iter()
            .filter(|txn| !txn.is_synthetic_invoice() && resolver.month(txn) == month)
        {
            flow.add(txn);
        }
        MonthlySummary {
            month,
            total_income: flow.income,
            confirmed_income: flow.confirmed_income,
            total_expense: flow.expense,
            confirmed_expense: flow.confirmed_expense,
            balance: flow.income - flow.expense,
            confirmed_balance: flow.confirmed_income - flow.confirmed_expense,
        }
    }

    /// Expense totals per category for `month`, largest first.
    pub fn category_summary(
        snapshot: &LedgerSnapshot,
        settings: &EngineSettings,
        month: YearMonth,
    ) -> Vec<CategorySummary> {
        let resolver = snapshot.resolver(settings.default_closing_day);
        let mut totals: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
        for txn in snapshot.transactions.iter().filter(|txn| {
            txn.is_expense() && !txn.is_synthetic_invoice() && resolver.month(txn) == month
        }) {
            let entry = totals.entry(txn.category_id.as_str()).or_default();
            entry.0 += txn.value;
            if txn.is_paid() {
                entry.1 += txn.value;
            }
        }

        let month_total: f64 = totals.values().map(|(total, _)| total).sum();
        let mut summaries: Vec<CategorySummary> = totals
            .into_iter()
            .map(|(category_id, (total, confirmed_total))| CategorySummary {
                category_id: category_id.to_string(),
                category_name: snapshot
                    .category(category_id)
                    .map(|category| category.name.clone())
                    .unwrap_or_else(|| UNKNOWN_CATEGORY_LABEL.to_string()),
                total,
                confirmed_total,
                percentage: if month_total > 0.0 {
                    total / month_total * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        summaries.sort_by(|a, b| b.total.total_cmp(&a.total));
        summaries
    }

    /// Current and confirmed balance of every account.
    ///
    /// Card purchases billed in a month that has an invoice are left out, the
    /// invoice stands in for them. Purchases without one count where booked.
    pub fn bank_account_summaries(
        snapshot: &LedgerSnapshot,
        settings: &EngineSettings,
    ) -> Vec<BankAccountSummary> {
        let resolver = snapshot.resolver(settings.default_closing_day);
        let invoiced: HashSet<&str> = snapshot
            .transactions
            .iter()
            .filter(|txn| txn.is_synthetic_invoice())
            .filter_map(|txn| txn.notes.as_deref())
            .collect();
        let counted: Vec<&Transaction> = snapshot
            .transactions
            .iter()
            .filter(|txn| {
                txn.is_synthetic_invoice()
                    || !resolver.is_credit_card(&txn.payment_method_id)
                    || !invoiced.contains(
                        invoice_notes_key(&txn.payment_method_id, resolver.month(txn)).as_str(),
                    )
            })
            .collect();

        snapshot
            .bank_accounts
            .iter()
            .map(|account| {
                let mut flow = Flow::default();
                for txn in counted
                    .iter()
                    .filter(|txn| txn.bank_account_id == account.id)
                {
                    flow.add(txn);
                }
                BankAccountSummary {
                    account: account.clone(),
                    current_balance: account.initial_balance + flow.income - flow.expense,
                    confirmed_balance: account.initial_balance + flow.confirmed_income
                        - flow.confirmed_expense,
                }
            })
            .collect()
    }

    /// Expenses billed in `month` split into each account's direct spending
    /// and one group for all credit cards.
    pub fn origin_breakdown(
        snapshot: &LedgerSnapshot,
        settings: &EngineSettings,
        month: YearMonth,
    ) -> OriginBreakdown {
        let resolver = snapshot.resolver(settings.default_closing_day);
        let (cards, direct): (Vec<&Transaction>, Vec<&Transaction>) = snapshot
            .transactions
            .iter()
            .filter(|txn| {
                txn.is_expense() && !txn.is_synthetic_invoice() && resolver.month(txn) == month
            })
            .partition(|txn| resolver.is_credit_card(&txn.payment_method_id));

        OriginBreakdown {
            accounts: snapshot
                .bank_accounts
                .iter()
                .map(|account| AccountSpending {
                    account_id: account.id.clone(),
                    account_name: account.name.clone(),
                    spending: group_by_category(
                        snapshot,
                        direct
                            .iter()
                            .copied()
                            .filter(|txn| txn.bank_account_id == account.id),
                    ),
                })
                .collect(),
            credit_cards: group_by_category(snapshot, cards),
        }
    }

    /// Credit-card purchases matching `filter`, grouped by category.
    pub fn card_spend_by_category(
        snapshot: &LedgerSnapshot,
        settings: &EngineSettings,
        filter: &CardSpendFilter,
    ) -> SpendingGroup {
        let resolver = snapshot.resolver(settings.default_closing_day);
        group_by_category(
            snapshot,
            snapshot.transactions.iter().filter(|txn| {
                !txn.is_synthetic_invoice()
                    && resolver.is_credit_card(&txn.payment_method_id)
                    && filter.matches(txn)
            }),
        )
    }

    /// Twelve monthly points for `year`, labeled in the configured locale.
    pub fn yearly_history(
        snapshot: &LedgerSnapshot,
        settings: &EngineSettings,
        year: i32,
    ) -> Vec<YearlyHistoryPoint> {
        let resolver = snapshot.resolver(settings.default_closing_day);
        let mut flows = [Flow::default(); 12];
        for txn in snapshot.transactions.iter().filter(|txn| !txn.is_synthetic_invoice()) {
            let month = resolver.month(txn);
            if month.year == year {
                flows[month.month_index as usize].add(txn);
            }
        }
        flows
            .iter()
            .zip(0u32..)
            .map(|(flow, month_index)| YearlyHistoryPoint {
                label: month_abbreviation(&settings.locale, month_index).to_string(),
                month_index,
                income: flow.income,
                expense: flow.expense,
                confirmed_income: flow.confirmed_income,
                confirmed_expense: flow.confirmed_expense,
                balance: flow.income - flow.expense,
            })
            .collect()
    }

    /// Card purchases per billing month of `year`, optionally for one booking account.
    pub fn card_invoices_for_year(
        snapshot: &LedgerSnapshot,
        settings: &EngineSettings,
        year: i32,
        account_filter: Option<&str>,
    ) -> Vec<CardInvoiceMonth> {
        let resolver = snapshot.resolver(settings.default_closing_day);
        let mut months = vec![CardInvoiceMonth::default(); 12];
        for txn in snapshot.transactions.iter().filter(|txn| {
            !txn.is_synthetic_invoice()
                && resolver.is_credit_card(&txn.payment_method_id)
                && account_filter.map_or(true, |account| txn.bank_account_id == account)
        }) {
            let month = resolver.month(txn);
            if month.year != year {
                continue;
            }
            let slot = &mut months[month.month_index as usize];
            slot.total += txn.value;
            slot.count += 1;
            slot.transaction_ids.push(txn.id.clone());
        }
        months
    }

    /// Total of card purchases billed in `month`.
    pub fn card_spend_for_month(
        snapshot: &LedgerSnapshot,
        settings: &EngineSettings,
        month: YearMonth,
    ) -> f64 {
        let resolver = snapshot.resolver(settings.default_closing_day);
        snapshot
            .transactions
            .iter()
            .filter(|txn| {
                !txn.is_synthetic_invoice()
                    && resolver.is_credit_card(&txn.payment_method_id)
                    && resolver.month(txn) == month
            })
            .map(|txn| txn.value)
            .sum()
    }
}
