use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt document `{key}`: {message}")]
    Serde { key: String, message: String },
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("Recurring bill not found: {0}")]
    BillNotFound(String),
    #[error("Payment method not found: {0}")]
    PaymentMethodNotFound(String),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Validation failed: {0}")]
    Validation(String),
}
