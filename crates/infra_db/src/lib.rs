//! Infrastructure Database Layer
//!
//! This crate provides the database infrastructure for the clinic ledger,
//! implementing the persistent side of the account registry, transaction
//! poster, payment orchestrator, and summary readers on PostgreSQL using
//! SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. Each repository wraps the
//! connection pool; the write paths that must compose (account creation and
//! posting inside payment recording) are additionally exposed as associated
//! functions over a raw connection so the payment orchestration runs in one
//! database transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, LedgerRepository};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/clinic")).await?;
//! let ledger = LedgerRepository::new(pool);
//! ```

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::{
    ExpenseRecord, ExpenseRepository, LedgerRepository, NewExpense, PaymentListing,
    PaymentRepository, ReportingRepository,
};
