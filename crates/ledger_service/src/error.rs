//! Service error types

use domain_ledger::LedgerError;
use infra_db::DatabaseError;
use thiserror::Error;

/// Errors surfaced by the ledger service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Domain rule violation
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Storage failure
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Input rejected before reaching storage
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ServiceError {
    /// Creates a not found error for an entity type and identifier
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    /// True when the underlying cause is a missing record
    pub fn is_not_found(&self) -> bool {
        match self {
            ServiceError::NotFound(_) => true,
            ServiceError::Database(db) => db.is_not_found(),
            ServiceError::Ledger(LedgerError::AccountNotFound(_)) => true,
            _ => false,
        }
    }
}
