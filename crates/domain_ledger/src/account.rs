//! Ledger accounts keyed by (kind, holder)
//!
//! Every entity that money flows to or from gets at most one account per
//! kind, created lazily on first reference and never deleted.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{AccountId, Money};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The clinic is a singleton holder with a fixed id
pub const CLINIC_HOLDER_ID: i64 = 1;

/// Display name used when the clinic account is first created
pub const CLINIC_HOLDER_NAME: &str = "Clinic";

/// Kinds of ledger accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// A patient's account (tracks dues and payments)
    Patient,
    /// A treating doctor's account (tracks earned shares and withdrawals)
    Doctor,
    /// A supplier's account (tracks invoices owed and payments made)
    Supplier,
    /// The clinic's own account (singleton)
    Clinic,
}

impl AccountKind {
    /// All known account kinds
    pub fn all() -> [AccountKind; 4] {
        [
            AccountKind::Patient,
            AccountKind::Doctor,
            AccountKind::Supplier,
            AccountKind::Clinic,
        ]
    }

    /// The database string form of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Patient => "patient",
            AccountKind::Doctor => "doctor",
            AccountKind::Supplier => "supplier",
            AccountKind::Clinic => "clinic",
        }
    }

    /// Returns true for the kind that carries dues/paid counters
    pub fn tracks_patient_counters(&self) -> bool {
        matches!(self, AccountKind::Patient)
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(AccountKind::Patient),
            "doctor" => Ok(AccountKind::Doctor),
            "supplier" => Ok(AccountKind::Supplier),
            "clinic" => Ok(AccountKind::Clinic),
            other => Err(format!("unknown account kind: {other}")),
        }
    }
}

/// A per-holder running ledger account
///
/// `balance` is a signed running total whose semantics depend on the account
/// kind. `total_dues` and `total_paid` are cumulative counters maintained
/// only for patient accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,
    /// Account kind
    pub kind: AccountKind,
    /// The external entity this account belongs to
    pub holder_id: i64,
    /// Denormalized display label, frozen at first reference
    pub holder_name: String,
    /// Signed running balance
    pub balance: Money,
    /// Cumulative dues (patient accounts only)
    pub total_dues: Money,
    /// Cumulative payments received (patient accounts only)
    pub total_paid: Money,
    /// Date of the most recent posting, if any
    pub last_transaction_date: Option<NaiveDate>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Opens a fresh account with zero balances
    pub fn open(
        id: AccountId,
        kind: AccountKind,
        holder_id: i64,
        holder_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind,
            holder_id,
            holder_name: holder_name.into(),
            balance: Money::zero(),
            total_dues: Money::zero(),
            total_paid: Money::zero(),
            last_transaction_date: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in AccountKind::all() {
            let parsed: AccountKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!("vendor".parse::<AccountKind>().is_err());
    }

    #[test]
    fn test_open_account_starts_at_zero() {
        let account = Account::open(AccountId::new(1), AccountKind::Patient, 12, "Test Patient");

        assert!(account.balance.is_zero());
        assert!(account.total_dues.is_zero());
        assert!(account.total_paid.is_zero());
        assert!(account.last_transaction_date.is_none());
    }

    #[test]
    fn test_only_patient_tracks_counters() {
        assert!(AccountKind::Patient.tracks_patient_counters());
        assert!(!AccountKind::Doctor.tracks_patient_counters());
        assert!(!AccountKind::Supplier.tracks_patient_counters());
        assert!(!AccountKind::Clinic.tracks_patient_counters());
    }
}
