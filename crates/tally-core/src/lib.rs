//! tally-core
//!
//! Reconciliation engine for the tracker: effective dating of card purchases,
//! invoice synchronization, the transaction lifecycle and the read-side
//! projections. Depends on tally-domain. Storage is reached only through the
//! [`KeyValueStore`] trait.

pub mod account_service;
pub mod category_service;
pub mod closing_day_service;
pub mod effective_date;
pub mod error;
pub mod format;
pub mod invoice_service;
pub mod payment_method_service;
pub mod recurring_service;
pub mod repository;
pub mod settings;
pub mod storage;
pub mod summary_service;
pub mod time;
pub mod transaction_service;

pub use account_service::*;
pub use category_service::*;
pub use closing_day_service::*;
pub use effective_date::*;
pub use error::CoreError;
pub use format::*;
pub use invoice_service::*;
pub use payment_method_service::*;
pub use recurring_service::*;
pub use repository::*;
pub use settings::*;
pub use storage::*;
pub use summary_service::*;
pub use time::*;
pub use transaction_service::*;
