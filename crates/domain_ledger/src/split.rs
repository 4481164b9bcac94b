//! Revenue split between the treating doctor and the clinic
//!
//! The doctor share is computed from the configured percentage; the clinic
//! share is the remainder, never computed independently, so the two shares
//! always sum to the payment amount exactly regardless of rounding.

use core_kernel::{Money, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// The division of a payment amount between doctor and clinic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueSplit {
    /// Amount owed to the treating doctor
    pub doctor_share: Money,
    /// Amount retained by the clinic
    pub clinic_share: Money,
    /// The percentage the doctor share was computed from
    pub doctor_percentage: Decimal,
    /// The clinic percentage, recorded for traceability
    pub clinic_percentage: Decimal,
}

impl RevenueSplit {
    /// Splits `amount` using the treatment's configured doctor percentage
    ///
    /// The clinic share is the remainder after the (rounded) doctor share,
    /// guaranteeing `doctor_share + clinic_share == amount` exactly.
    pub fn calculate(amount: Money, doctor_percentage: Decimal) -> Self {
        let rate = Rate::from_percentage(doctor_percentage);
        let doctor_share = rate.apply(&amount);
        let clinic_share = amount - doctor_share;

        Self {
            doctor_share,
            clinic_share,
            doctor_percentage,
            clinic_percentage: rate.complement().as_percentage(),
        }
    }

    /// The 50/50 fallback used when a treatment carries no percentages
    pub fn even(amount: Money) -> Self {
        Self::calculate(amount, dec!(50))
    }

    /// The whole amount goes to the clinic (payments with no appointment)
    pub fn clinic_only(amount: Money) -> Self {
        Self {
            doctor_share: Money::zero(),
            clinic_share: amount,
            doctor_percentage: dec!(0),
            clinic_percentage: dec!(100),
        }
    }

    /// The original payment amount this split was derived from
    pub fn total(&self) -> Money {
        self.doctor_share + self.clinic_share
    }
}
