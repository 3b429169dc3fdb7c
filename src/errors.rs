//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`], and every
//! failure mode a caller can act on has its own variant. Validation errors
//! carry the offending values so presentation layers can render precise
//! messages without re-querying the ledger.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Farmer not found: {id}")]
    FarmerNotFound { id: String },

    #[error("Donor not found: {id}")]
    DonorNotFound { id: String },

    #[error("Installment #{number} not found for farmer {farmer_id}")]
    InstallmentNotFound { farmer_id: String, number: i64 },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Insufficient balance: current {current:.2}, requested {requested:.2}")]
    InsufficientBalance { current: f64, requested: f64 },

    #[error("Installment #{number} is already paid")]
    AlreadyPaid { number: i64 },

    #[error("No pending installments to pay")]
    NoPendingInstallments,

    #[error("Ledger is busy, retry the operation")]
    Busy,

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl From<sea_orm::DbErr> for Error {
    fn from(err: sea_orm::DbErr) -> Self {
        let message = err.to_string();
        // SQLite reports writer contention as a locked/busy database. The
        // connection's busy timeout bounds the wait, so by the time the error
        // reaches us the wait already expired.
        if message.contains("database is locked") || message.contains("database table is locked") {
            Error::Busy
        } else {
            Error::Database { message }
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
