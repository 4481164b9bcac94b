//! Ledger Domain - Clinic Financial Ledger
//!
//! This crate implements the financial ledger for the clinic: one running
//! account per (kind, holder) pair, an append-only transaction history, and
//! the posting rules that turn a clinical payment into doctor and clinic
//! shares.
//!
//! # Posting Model
//!
//! Unlike a double-entry system, each posting touches exactly one account.
//! How a transaction affects the account balance depends on the pair of
//! account kind and transaction kind; the full mapping lives in [`posting`]
//! as an exhaustive match, so an unhandled combination is a compile-time
//! error rather than a silent no-op.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{AccountKind, LedgerBook, NewTransaction, TransactionKind};
//!
//! let mut book = LedgerBook::new();
//! let account = book.get_or_create_account(AccountKind::Doctor, 7, "Dr. A");
//!
//! book.post(account, NewTransaction::new(
//!     TransactionKind::Credit,
//!     Money::new(dec!(300)),
//!     "Doctor share of payment",
//! ))?;
//! ```

pub mod account;
pub mod book;
pub mod error;
pub mod payment;
pub mod posting;
pub mod split;
pub mod summary;
pub mod transaction;

pub use account::{Account, AccountKind, CLINIC_HOLDER_ID, CLINIC_HOLDER_NAME};
pub use book::LedgerBook;
pub use error::LedgerError;
pub use payment::{NewPayment, Payment, PaymentMethod, PaymentStatus};
pub use posting::{BalanceDirection, PatientCounter, PostingEffect};
pub use split::RevenueSplit;
pub use summary::{
    AccountKindSummary, AccountStatement, ClinicFinancialSummary, DoctorFinancialSummary,
    MonthlyFigure, PatientFinancialSummary, SupplierFinancialSummary,
};
pub use transaction::{LedgerTransaction, NewTransaction, TransactionKind};
