//! Billing-cycle dating for credit-card purchases.
//!
//! A purchase on a credit card counts toward the month its invoice is due,
//! not the month it was made. The closing day in effect for the purchase month
//! decides whether it lands one or two months ahead. Closing days are read at
//! resolution time, so editing one moves past purchases as well.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use tally_domain::{add_months_rolling, ClosingDays, PaymentMethod, Transaction, YearMonth};

/// Resolves effective dates against one view of payment methods and closing days.
pub struct EffectiveDateResolver<'a> {
    methods: HashMap<&'a str, &'a PaymentMethod>,
    closing_days: &'a ClosingDays,
    default_closing_day: u32,
}

impl<'a> EffectiveDateResolver<'a> {
    pub fn new(
        methods: &'a [PaymentMethod],
        closing_days: &'a ClosingDays,
        default_closing_day: u32,
    ) -> Self {
        Self {
            // Reversed so the first record wins when ids repeat.
            methods: methods
                .iter()
                .rev()
                .map(|method| (method.id.as_str(), method))
                .collect(),
            closing_days,
            default_closing_day,
        }
    }

    /// Unknown method ids are not credit cards.
    pub fn is_credit_card(&self, payment_method_id: &str) -> bool {
        self.methods
            .get(payment_method_id)
            .is_some_and(|method| method.is_credit_card())
    }

    pub fn closing_day(&self, purchase_month: YearMonth) -> u32 {
        self.closing_days
            .day_for(purchase_month, self.default_closing_day)
    }

    pub fn resolve(&self, txn: &Transaction) -> NaiveDate {
        if !self.is_credit_card(&txn.payment_method_id) {
            return txn.date;
        }
        let closing_day = self.closing_day(YearMonth::from_date(txn.date));
        let months = if txn.date.day() <= closing_day { 1 } else { 2 };
        add_months_rolling(txn.date, months)
    }

    pub fn month(&self, txn: &Transaction) -> YearMonth {
        YearMonth::from_date(self.resolve(txn))
    }
}

/// One-shot form of [`EffectiveDateResolver::resolve`].
pub fn effective_date(
    txn: &Transaction,
    methods: &[PaymentMethod],
    closing_days: &ClosingDays,
    default_closing_day: u32,
) -> NaiveDate {
    EffectiveDateResolver::new(methods, closing_days, default_closing_day).resolve(txn)
}
