//! Strongly-typed identifiers for domain entities
//!
//! The ledger is keyed by database surrogate keys (BIGSERIAL), so identifiers
//! wrap i64 rather than UUIDs. Newtype wrappers prevent accidental mixing of
//! different identifier types (e.g., passing a patient id where an account id
//! is expected).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from a raw database key
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the underlying database key
            pub fn get(&self) -> i64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(raw.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

// Ledger identifiers
define_id!(AccountId, "ACC");
define_id!(TransactionId, "TXN");
define_id!(PaymentId, "PAY");
define_id!(ExpenseId, "EXP");

// Clinical holder identifiers
define_id!(PatientId, "PAT");
define_id!(DoctorId, "DOC");
define_id!(SupplierId, "SUP");
define_id!(AppointmentId, "APT");
define_id!(TreatmentId, "TRT");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_display() {
        let id = AccountId::new(42);
        assert_eq!(id.to_string(), "ACC-42");
    }

    #[test]
    fn test_id_parsing_with_prefix() {
        let parsed: PaymentId = "PAY-7".parse().unwrap();
        assert_eq!(parsed, PaymentId::new(7));
    }

    #[test]
    fn test_id_parsing_bare() {
        let parsed: DoctorId = "7".parse().unwrap();
        assert_eq!(parsed.get(), 7);
    }

    #[test]
    fn test_i64_conversion() {
        let id = PatientId::from(99);
        let raw: i64 = id.into();
        assert_eq!(raw, 99);
    }

    #[test]
    fn test_ids_do_not_mix() {
        // Distinct types even for the same raw key
        let account = AccountId::new(1);
        let patient = PatientId::new(1);
        assert_eq!(account.get(), patient.get());
        assert_ne!(account.to_string(), patient.to_string());
    }
}
