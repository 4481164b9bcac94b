//! Core Kernel - Foundational types for the clinic ledger
//!
//! This crate provides the fundamental building blocks used across all ledger modules:
//! - Money with precise decimal arithmetic (single ledger currency)
//! - Percentage rates for revenue splitting
//! - Strongly-typed identifiers for clinical and ledger entities

pub mod identifiers;
pub mod money;

pub use identifiers::{
    AccountId, AppointmentId, DoctorId, ExpenseId, PatientId, PaymentId, SupplierId,
    TransactionId, TreatmentId,
};
pub use money::{Money, MoneyError, Rate};
