//! Clinic Ledger Service
//!
//! The top-level facade over the clinic financial ledger: account registry,
//! transaction posting, payment orchestration, expenses, and financial
//! summaries, all behind one service handle.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::create_pool;
//! use ledger_service::{LedgerService, ServiceConfig};
//!
//! let config = ServiceConfig::from_env()?;
//! let pool = create_pool(config.database_config()).await?;
//! let service = LedgerService::new(pool);
//!
//! let statement = service.get_statement(AccountKind::Doctor, 7).await?;
//! ```

pub mod config;
pub mod error;
pub mod service;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use service::LedgerService;
