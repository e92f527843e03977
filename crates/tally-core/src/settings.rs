//! Tunables consumed by the reconciliation services.

use tally_domain::DEFAULT_CLOSING_DAY;

/// Identifier of the seeded "Boleto" method used to post invoices.
pub const DEFAULT_INVOICE_PAYMENT_METHOD_ID: &str = "pm6";
/// Category id used for invoices when no expense category exists.
pub const DEFAULT_FALLBACK_CATEGORY_ID: &str = "1";

/// Engine settings derived from the user configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub locale: String,
    /// Replaces the locale's currency symbol when set.
    pub currency_symbol: Option<String>,
    pub default_closing_day: u32,
    pub invoice_payment_method_id: String,
    pub fallback_invoice_category_id: String,
    /// Months before the current one covered by a full invoice resync.
    pub invoice_months_back: u32,
    /// Months after the current one covered by a full invoice resync.
    pub invoice_months_ahead: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            locale: "pt-BR".into(),
            currency_symbol: None,
            default_closing_day: DEFAULT_CLOSING_DAY,
            invoice_payment_method_id: DEFAULT_INVOICE_PAYMENT_METHOD_ID.into(),
            fallback_invoice_category_id: DEFAULT_FALLBACK_CATEGORY_ID.into(),
            invoice_months_back: 1,
            invoice_months_ahead: 23,
        }
    }
}

impl EngineSettings {
    /// Formats `value` in the configured locale and currency symbol.
    pub fn format_currency(&self, value: f64) -> String {
        crate::format::format_currency_with_symbol(
            value,
            &self.locale,
            self.currency_symbol.as_deref(),
        )
    }
}
