//! tally-config
//!
//! User configuration for the tracker and its JSON persistence.
//! Converts into the [`tally_core::EngineSettings`] consumed by the services.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{Config, InvoiceWindow};
