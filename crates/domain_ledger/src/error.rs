//! Ledger domain errors

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Posting amount was zero or negative; rejected before any write
    #[error("Invalid amount: {0} (must be > 0)")]
    InvalidAmount(Decimal),

    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),
}
