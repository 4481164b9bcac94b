//! Repository implementations
//!
//! Each repository wraps the connection pool and exposes the database side of
//! one area of the ledger. Operations that must compose into a larger unit of
//! work (account creation and transaction posting during payment recording)
//! are also available as associated functions over a raw connection.

pub mod expenses;
pub mod ledger;
pub mod payments;
pub mod reporting;

pub use expenses::{ExpenseRecord, ExpenseRepository, NewExpense};
pub use ledger::LedgerRepository;
pub use payments::{PaymentListing, PaymentRepository};
pub use reporting::ReportingRepository;
