//! Ledger transaction types
//!
//! A transaction is one immutable posting against a single account. Rows are
//! append-only; they are never updated or deleted once written.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{AccountId, Money, TransactionId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::payment::PaymentMethod;

/// Kind of ledger transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// A charge against the holder (e.g., treatment cost added to dues)
    Debit,
    /// An amount owed to the holder (e.g., doctor share, supplier invoice)
    Credit,
    /// A payment received from, or made to, the holder
    Payment,
    /// A withdrawal of accumulated balance (doctors)
    Withdrawal,
}

impl TransactionKind {
    /// The database string form of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Debit => "debit",
            TransactionKind::Credit => "credit",
            TransactionKind::Payment => "payment",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(TransactionKind::Debit),
            "credit" => Ok(TransactionKind::Credit),
            "payment" => Ok(TransactionKind::Payment),
            "withdrawal" => Ok(TransactionKind::Withdrawal),
            other => Err(format!("unknown transaction kind: {other}")),
        }
    }
}

/// One immutable posting against an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// Unique identifier
    pub id: TransactionId,
    /// Owning account (exclusive, never shared)
    pub account_id: AccountId,
    /// Transaction kind
    pub kind: TransactionKind,
    /// Amount, always strictly positive
    pub amount: Money,
    /// Human-readable description
    pub description: String,
    /// Kind of the clinical event that caused this posting (e.g., "payment")
    pub reference_type: Option<String>,
    /// Id of the causing event
    pub reference_id: Option<i64>,
    /// Business date of the posting
    pub transaction_date: NaiveDate,
    /// How the money moved, when applicable
    pub payment_method: Option<PaymentMethod>,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the row was written
    pub created_at: DateTime<Utc>,
}

/// Data for a posting that has not been written yet
///
/// Built in the builder style; validation of the amount happens at posting
/// time so an invalid transaction never reaches storage.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Transaction kind
    pub kind: TransactionKind,
    /// Amount to post (must be > 0)
    pub amount: Money,
    /// Description
    pub description: String,
    /// Reference kind (e.g., "payment")
    pub reference_type: Option<String>,
    /// Reference id
    pub reference_id: Option<i64>,
    /// Business date; defaults to today when not set
    pub transaction_date: Option<NaiveDate>,
    /// Payment method
    pub payment_method: Option<PaymentMethod>,
    /// Notes
    pub notes: Option<String>,
}

impl NewTransaction {
    /// Creates a new posting request
    pub fn new(kind: TransactionKind, amount: Money, description: impl Into<String>) -> Self {
        Self {
            kind,
            amount,
            description: description.into(),
            reference_type: None,
            reference_id: None,
            transaction_date: None,
            payment_method: None,
            notes: None,
        }
    }

    /// Links the posting back to the clinical event that caused it
    pub fn with_reference(mut self, reference_type: impl Into<String>, reference_id: i64) -> Self {
        self.reference_type = Some(reference_type.into());
        self.reference_id = Some(reference_id);
        self
    }

    /// Sets the business date
    pub fn dated(mut self, date: NaiveDate) -> Self {
        self.transaction_date = Some(date);
        self
    }

    /// Sets the payment method
    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    /// Sets free-form notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// The business date, falling back to today
    pub fn effective_date(&self) -> NaiveDate {
        self.transaction_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [
            TransactionKind::Debit,
            TransactionKind::Credit,
            TransactionKind::Payment,
            TransactionKind::Withdrawal,
        ] {
            let parsed: TransactionKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_builder_sets_reference() {
        let tx = NewTransaction::new(
            TransactionKind::Credit,
            Money::new(dec!(400)),
            "Doctor share of payment PAY-9",
        )
        .with_reference("payment", 9)
        .with_notes("share of 1000.00");

        assert_eq!(tx.reference_type.as_deref(), Some("payment"));
        assert_eq!(tx.reference_id, Some(9));
        assert_eq!(tx.notes.as_deref(), Some("share of 1000.00"));
    }

    #[test]
    fn test_effective_date_defaults_to_today() {
        let tx = NewTransaction::new(TransactionKind::Payment, Money::new(dec!(10)), "x");
        assert_eq!(tx.effective_date(), Utc::now().date_naive());

        let dated = tx.dated(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(
            dated.effective_date(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }
}
