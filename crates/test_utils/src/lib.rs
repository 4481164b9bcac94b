//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! clinic ledger test suite.
//!
//! # Modules
//!
//! - `fixtures`: Seed helpers and pre-built test data for clinical entities
//! - `builders`: Builder patterns for seeding whole scenarios
//! - `database`: Database test helpers and container management
//! - `assertions`: Custom assertion helpers for domain types
//! - `logging`: Tracing setup for tests

pub mod assertions;
pub mod builders;
pub mod database;
pub mod fixtures;
pub mod logging;

pub use assertions::*;
pub use builders::*;
pub use database::*;
pub use fixtures::*;
pub use logging::*;
