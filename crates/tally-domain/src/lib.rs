//! tally-domain
//!
//! Pure domain models (Category, PaymentMethod, BankAccount, Transaction,
//! RecurringBill, closing days and derived summaries).
//! No I/O, no storage. Only data types, calendar helpers and core enums.

pub mod account;
pub mod category;
pub mod closing;
pub mod common;
pub mod payment_method;
pub mod recurring;
pub mod summary;
pub mod transaction;

pub use account::*;
pub use category::*;
pub use closing::*;
pub use common::*;
pub use payment_method::*;
pub use recurring::*;
pub use summary::*;
pub use transaction::*;
