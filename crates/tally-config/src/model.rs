use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use tally_core::{EngineSettings, DEFAULT_FALLBACK_CATEGORY_ID, DEFAULT_INVOICE_PAYMENT_METHOD_ID};

use crate::ConfigError;

/// Stores user preferences and the tunables of the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "Config::default_locale")]
    pub locale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_symbol: Option<String>,
    #[serde(default = "Config::default_closing_day_value")]
    pub default_closing_day: u32,
    #[serde(default = "Config::default_invoice_payment_method")]
    pub invoice_payment_method_id: String,
    #[serde(default = "Config::default_fallback_category")]
    pub fallback_invoice_category_id: String,
    #[serde(default)]
    pub invoice_window: InvoiceWindow,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for the data documents. Defaults to the
    /// platform data directory.
    pub data_dir: Option<PathBuf>,
}

/// Months around today covered by a full invoice resync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceWindow {
    pub months_back: u32,
    pub months_ahead: u32,
}

impl Default for InvoiceWindow {
    fn default() -> Self {
        Self {
            months_back: 1,
            months_ahead: 23,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Self::default_locale(),
            currency_symbol: None,
            default_closing_day: Self::default_closing_day_value(),
            invoice_payment_method_id: Self::default_invoice_payment_method(),
            fallback_invoice_category_id: Self::default_fallback_category(),
            invoice_window: InvoiceWindow::default(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn default_locale() -> String {
        "pt-BR".into()
    }

    pub fn default_closing_day_value() -> u32 {
        tally_core::EngineSettings::default().default_closing_day
    }

    pub fn default_invoice_payment_method() -> String {
        DEFAULT_INVOICE_PAYMENT_METHOD_ID.into()
    }

    pub fn default_fallback_category() -> String {
        DEFAULT_FALLBACK_CATEGORY_ID.into()
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(path) = &self.data_dir {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("Tally")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.locale.trim().is_empty() {
            return Err(ConfigError::Invalid("locale must not be empty".into()));
        }
        if !(1..=31).contains(&self.default_closing_day) {
            return Err(ConfigError::Invalid(format!(
                "default closing day must be between 1 and 31, got {}",
                self.default_closing_day
            )));
        }
        if self.invoice_payment_method_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "invoice payment method id must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn to_engine_settings(&self) -> EngineSettings {
        EngineSettings {
            locale: self.locale.clone(),
            currency_symbol: self.currency_symbol.clone(),
            default_closing_day: self.default_closing_day,
            invoice_payment_method_id: self.invoice_payment_method_id.clone(),
            fallback_invoice_category_id: self.fallback_invoice_category_id.clone(),
            invoice_months_back: self.invoice_window.months_back,
            invoice_months_ahead: self.invoice_window.months_ahead,
        }
    }
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        config.to_engine_settings()
    }
}
