//! Clinical payment records
//!
//! A payment is owned by the clinical subsystem but read back by the ledger:
//! recording one drives the orchestrated postings to the patient, doctor,
//! and clinic accounts.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{AppointmentId, Money, PatientId, PaymentId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::split::RevenueSplit;

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash
    Cash,
    /// Bank transfer
    BankTransfer,
    /// Credit card
    CreditCard,
    /// Check/cheque
    Check,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::Check => "check",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "check" => Ok(PaymentMethod::Check),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Payment status flag
///
/// No reversal or reconciliation machinery; summaries simply filter on
/// `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Recorded but not yet confirmed
    Pending,
    /// Counted in all financial summaries
    Completed,
    /// Excluded from summaries
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// A recorded clinical payment with its computed split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// The appointment this payment settles, if any
    pub appointment_id: Option<AppointmentId>,
    /// The paying patient
    pub patient_id: PatientId,
    /// Payment amount
    pub amount: Money,
    /// How the money was received
    pub payment_method: PaymentMethod,
    /// Business date of the payment
    pub payment_date: NaiveDate,
    /// Free-form notes
    pub notes: Option<String>,
    /// Doctor/clinic division computed at recording time
    pub split: RevenueSplit,
    /// Status flag
    pub status: PaymentStatus,
    /// When the row was written
    pub created_at: DateTime<Utc>,
}

/// Data for a payment that has not been recorded yet
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// The appointment being paid for, if any
    pub appointment_id: Option<AppointmentId>,
    /// The paying patient
    pub patient_id: PatientId,
    /// Payment amount (must be > 0)
    pub amount: Money,
    /// Payment method
    pub payment_method: PaymentMethod,
    /// Business date
    pub payment_date: NaiveDate,
    /// Notes
    pub notes: Option<String>,
}

impl NewPayment {
    /// Creates a payment request for an appointment
    pub fn for_appointment(
        appointment_id: AppointmentId,
        patient_id: PatientId,
        amount: Money,
        payment_method: PaymentMethod,
        payment_date: NaiveDate,
    ) -> Self {
        Self {
            appointment_id: Some(appointment_id),
            patient_id,
            amount,
            payment_method,
            payment_date,
            notes: None,
        }
    }

    /// Creates a general payment not tied to an appointment
    pub fn general(
        patient_id: PatientId,
        amount: Money,
        payment_method: PaymentMethod,
        payment_date: NaiveDate,
    ) -> Self {
        Self {
            appointment_id: None,
            patient_id,
            amount,
            payment_method,
            payment_date,
            notes: None,
        }
    }

    /// Sets free-form notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn a_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_method_and_status_round_trip() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::BankTransfer,
            PaymentMethod::CreditCard,
            PaymentMethod::Check,
        ] {
            let parsed: PaymentMethod = method.as_str().parse().unwrap();
            assert_eq!(parsed, method);
        }

        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Cancelled,
        ] {
            let parsed: PaymentStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_general_payment_has_no_appointment() {
        let payment = NewPayment::general(
            PatientId::new(3),
            Money::new(dec!(500)),
            PaymentMethod::Cash,
            a_date(),
        );

        assert!(payment.appointment_id.is_none());
        assert!(payment.notes.is_none());
    }

    #[test]
    fn test_appointment_payment_with_notes() {
        let payment = NewPayment::for_appointment(
            AppointmentId::new(11),
            PatientId::new(3),
            Money::new(dec!(1000)),
            PaymentMethod::BankTransfer,
            a_date(),
        )
        .with_notes("second installment");

        assert_eq!(payment.appointment_id, Some(AppointmentId::new(11)));
        assert_eq!(payment.notes.as_deref(), Some("second installment"));
    }
}
