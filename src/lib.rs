#![doc(test(attr(deny(warnings))))]

//! Tally is a personal finance tracker built around a reconciliation engine:
//! credit-card purchases are re-dated to their billing cycle, folded into
//! synthetic invoices on a linked bank account, and kept consistent as the
//! ledger changes.
//!
//! [`Tally`] is the entry point. The underlying crates are re-exported for
//! callers that want the services directly.

pub mod app;
pub mod errors;
pub mod utils;

pub use app::Tally;
pub use errors::{TallyError, TallyResult};

pub use tally_config as config;
pub use tally_core as engine;
pub use tally_domain as domain;
pub use tally_storage_json as storage;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Tally tracing initialized.");
    });
}
