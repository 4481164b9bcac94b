//! Posting rules: how each (account kind, transaction kind) pair moves money
//!
//! The original system buried these rules in per-kind update branches; here
//! they are a single exhaustive match over all sixteen pairs. Pairs outside
//! the defined table still record the transaction but leave the balance
//! untouched ([`BalanceDirection::RecordOnly`]) - the combination is named
//! explicitly rather than falling through silently.

use crate::account::{Account, AccountKind};
use crate::transaction::TransactionKind;
use core_kernel::Money;

/// Direction a posting moves the account balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceDirection {
    /// Balance increases by the amount
    Increase,
    /// Balance decreases by the amount
    Decrease,
    /// Transaction is recorded but the balance is untouched
    RecordOnly,
}

/// Patient-only cumulative counter touched by a posting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientCounter {
    /// `total_dues` accumulates the amount
    Dues,
    /// `total_paid` accumulates the amount
    Paid,
}

/// The full effect of a posting on its owning account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingEffect {
    /// How the balance moves
    pub direction: BalanceDirection,
    /// Which patient counter accumulates, if any
    pub counter: Option<PatientCounter>,
}

impl PostingEffect {
    const fn increase() -> Self {
        Self {
            direction: BalanceDirection::Increase,
            counter: None,
        }
    }

    const fn decrease() -> Self {
        Self {
            direction: BalanceDirection::Decrease,
            counter: None,
        }
    }

    const fn record_only() -> Self {
        Self {
            direction: BalanceDirection::RecordOnly,
            counter: None,
        }
    }

    const fn with_counter(mut self, counter: PatientCounter) -> Self {
        self.counter = Some(counter);
        self
    }
}

/// Looks up the effect for a (account kind, transaction kind) pair
///
/// The match is exhaustive over both enums, so adding a new kind forces
/// every combination to be considered here.
pub fn effect_for(account: AccountKind, transaction: TransactionKind) -> PostingEffect {
    use AccountKind::*;
    use TransactionKind::*;

    match (account, transaction) {
        // Patients: payments raise the balance and the paid counter,
        // debits (treatment charges) lower the balance and raise dues.
        (Patient, Payment) => PostingEffect::increase().with_counter(PatientCounter::Paid),
        (Patient, Debit) => PostingEffect::decrease().with_counter(PatientCounter::Dues),
        (Patient, Credit) => PostingEffect::record_only(),
        (Patient, Withdrawal) => PostingEffect::record_only(),

        // Doctors: earned shares accumulate, withdrawals draw them down.
        (Doctor, Credit) => PostingEffect::increase(),
        (Doctor, Withdrawal) => PostingEffect::decrease(),
        (Doctor, Debit) => PostingEffect::record_only(),
        (Doctor, Payment) => PostingEffect::record_only(),

        // Suppliers: credit is an invoice owed to the supplier,
        // payment settles it.
        (Supplier, Credit) => PostingEffect::increase(),
        (Supplier, Payment) => PostingEffect::decrease(),
        (Supplier, Debit) => PostingEffect::record_only(),
        (Supplier, Withdrawal) => PostingEffect::record_only(),

        // Clinic: revenue in, expenses out.
        (Clinic, Credit) => PostingEffect::increase(),
        (Clinic, Debit) => PostingEffect::decrease(),
        (Clinic, Payment) => PostingEffect::record_only(),
        (Clinic, Withdrawal) => PostingEffect::record_only(),
    }
}

/// Applies a posting effect to an account's balances in place
pub fn apply_effect(account: &mut Account, effect: PostingEffect, amount: Money) {
    match effect.direction {
        BalanceDirection::Increase => account.balance = account.balance + amount,
        BalanceDirection::Decrease => account.balance = account.balance - amount,
        BalanceDirection::RecordOnly => {}
    }

    match effect.counter {
        Some(PatientCounter::Paid) => account.total_paid = account.total_paid + amount,
        Some(PatientCounter::Dues) => account.total_dues = account.total_dues + amount,
        None => {}
    }
}

/// The signed contribution of a single transaction to its account balance
///
/// Used to replay a transaction history and cross-check a running balance.
pub fn signed_amount(account: AccountKind, transaction: TransactionKind, amount: Money) -> Money {
    match effect_for(account, transaction).direction {
        BalanceDirection::Increase => amount,
        BalanceDirection::Decrease => -amount,
        BalanceDirection::RecordOnly => Money::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::AccountId;
    use rust_decimal_macros::dec;

    #[test]
    fn test_patient_payment_raises_balance_and_paid() {
        let effect = effect_for(AccountKind::Patient, TransactionKind::Payment);
        assert_eq!(effect.direction, BalanceDirection::Increase);
        assert_eq!(effect.counter, Some(PatientCounter::Paid));
    }

    #[test]
    fn test_patient_debit_lowers_balance_and_raises_dues() {
        let effect = effect_for(AccountKind::Patient, TransactionKind::Debit);
        assert_eq!(effect.direction, BalanceDirection::Decrease);
        assert_eq!(effect.counter, Some(PatientCounter::Dues));
    }

    #[test]
    fn test_doctor_credit_and_withdrawal() {
        assert_eq!(
            effect_for(AccountKind::Doctor, TransactionKind::Credit).direction,
            BalanceDirection::Increase
        );
        assert_eq!(
            effect_for(AccountKind::Doctor, TransactionKind::Withdrawal).direction,
            BalanceDirection::Decrease
        );
    }

    #[test]
    fn test_supplier_invoice_and_settlement() {
        assert_eq!(
            effect_for(AccountKind::Supplier, TransactionKind::Credit).direction,
            BalanceDirection::Increase
        );
        assert_eq!(
            effect_for(AccountKind::Supplier, TransactionKind::Payment).direction,
            BalanceDirection::Decrease
        );
    }

    #[test]
    fn test_unmapped_pairs_are_record_only() {
        for (kind, tx) in [
            (AccountKind::Patient, TransactionKind::Credit),
            (AccountKind::Patient, TransactionKind::Withdrawal),
            (AccountKind::Doctor, TransactionKind::Payment),
            (AccountKind::Doctor, TransactionKind::Debit),
            (AccountKind::Supplier, TransactionKind::Debit),
            (AccountKind::Supplier, TransactionKind::Withdrawal),
            (AccountKind::Clinic, TransactionKind::Payment),
            (AccountKind::Clinic, TransactionKind::Withdrawal),
        ] {
            let effect = effect_for(kind, tx);
            assert_eq!(effect.direction, BalanceDirection::RecordOnly);
            assert_eq!(effect.counter, None);
        }
    }

    #[test]
    fn test_only_patient_pairs_touch_counters() {
        for kind in AccountKind::all() {
            for tx in [
                TransactionKind::Debit,
                TransactionKind::Credit,
                TransactionKind::Payment,
                TransactionKind::Withdrawal,
            ] {
                let effect = effect_for(kind, tx);
                if effect.counter.is_some() {
                    assert_eq!(kind, AccountKind::Patient);
                }
            }
        }
    }

    #[test]
    fn test_apply_effect_mutates_account() {
        let mut account = Account::open(AccountId::new(1), AccountKind::Patient, 3, "P");
        let amount = Money::new(dec!(150));

        apply_effect(
            &mut account,
            effect_for(AccountKind::Patient, TransactionKind::Payment),
            amount,
        );
        assert_eq!(account.balance, amount);
        assert_eq!(account.total_paid, amount);
        assert!(account.total_dues.is_zero());

        apply_effect(
            &mut account,
            effect_for(AccountKind::Patient, TransactionKind::Debit),
            Money::new(dec!(50)),
        );
        assert_eq!(account.balance, Money::new(dec!(100)));
        assert_eq!(account.total_dues, Money::new(dec!(50)));
    }

    #[test]
    fn test_signed_amount_matches_direction() {
        let amount = Money::new(dec!(20));
        assert_eq!(
            signed_amount(AccountKind::Doctor, TransactionKind::Credit, amount),
            amount
        );
        assert_eq!(
            signed_amount(AccountKind::Doctor, TransactionKind::Withdrawal, amount),
            -amount
        );
        assert_eq!(
            signed_amount(AccountKind::Doctor, TransactionKind::Payment, amount),
            Money::zero()
        );
    }
}
