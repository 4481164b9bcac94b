//! In-memory ledger book
//!
//! The reference model for the account registry and transaction poster: one
//! account per (kind, holder) pair created lazily on first reference, and an
//! append-only transaction log applied through the posting-effect table.
//! The database repositories implement the same operations against
//! PostgreSQL; this model is the executable statement of their semantics and
//! backs the domain-level tests.

use chrono::Utc;
use core_kernel::{AccountId, Money, TransactionId};
use std::collections::HashMap;
use tracing::debug;

use crate::account::{Account, AccountKind};
use crate::error::LedgerError;
use crate::posting::{apply_effect, effect_for, signed_amount};
use crate::summary::AccountStatement;
use crate::transaction::{LedgerTransaction, NewTransaction};

/// An in-memory account registry plus transaction poster
///
/// # Invariants
///
/// - At most one account per (kind, holder) pair
/// - Transactions are append-only; posted rows are never modified
/// - Every balance equals the signed replay of its account's transactions
#[derive(Debug, Default)]
pub struct LedgerBook {
    /// Accounts by id
    accounts: HashMap<AccountId, Account>,
    /// Registry index: (kind, holder) -> account id
    by_holder: HashMap<(AccountKind, i64), AccountId>,
    /// Append-only transaction log
    transactions: Vec<LedgerTransaction>,
    next_account_id: i64,
    next_transaction_id: i64,
}

impl LedgerBook {
    /// Creates an empty book
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            by_holder: HashMap::new(),
            transactions: Vec::new(),
            next_account_id: 1,
            next_transaction_id: 1,
        }
    }

    /// Looks up or lazily creates the account for a (kind, holder) pair
    ///
    /// Idempotent: repeat calls return the existing account id. The holder
    /// name is frozen at first reference and deliberately not updated on
    /// later calls, mirroring the registry's documented behavior.
    pub fn get_or_create_account(
        &mut self,
        kind: AccountKind,
        holder_id: i64,
        holder_name: impl Into<String>,
    ) -> AccountId {
        if let Some(id) = self.by_holder.get(&(kind, holder_id)) {
            return *id;
        }

        let id = AccountId::new(self.next_account_id);
        self.next_account_id += 1;

        let account = Account::open(id, kind, holder_id, holder_name);
        debug!(account = %id, kind = %kind, holder_id, "opened account");

        self.accounts.insert(id, account);
        self.by_holder.insert((kind, holder_id), id);
        id
    }

    /// Gets an account by id
    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    /// Gets the account for a (kind, holder) pair, if one exists
    pub fn account_for(&self, kind: AccountKind, holder_id: i64) -> Option<&Account> {
        self.by_holder
            .get(&(kind, holder_id))
            .and_then(|id| self.accounts.get(id))
    }

    /// Posts a transaction and applies its effect to the owning account
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if the amount is not strictly positive (no row is
    ///   written)
    /// - `AccountNotFound` if the account id is unknown
    pub fn post(
        &mut self,
        account_id: AccountId,
        new: NewTransaction,
    ) -> Result<TransactionId, LedgerError> {
        if !new.amount.is_positive() {
            return Err(LedgerError::InvalidAmount(new.amount.amount()));
        }

        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))?;

        let id = TransactionId::new(self.next_transaction_id);
        self.next_transaction_id += 1;

        let transaction_date = new.effective_date();
        let record = LedgerTransaction {
            id,
            account_id,
            kind: new.kind,
            amount: new.amount,
            description: new.description,
            reference_type: new.reference_type,
            reference_id: new.reference_id,
            transaction_date,
            payment_method: new.payment_method,
            notes: new.notes,
            created_at: Utc::now(),
        };

        let effect = effect_for(account.kind, new.kind);
        apply_effect(account, effect, new.amount);
        account.last_transaction_date = Some(transaction_date);
        account.updated_at = record.created_at;

        self.transactions.push(record);
        Ok(id)
    }

    /// The statement for a (kind, holder) pair: account plus history,
    /// most recent first
    pub fn statement(&self, kind: AccountKind, holder_id: i64) -> Option<AccountStatement> {
        let account = self.account_for(kind, holder_id)?.clone();

        let mut transactions: Vec<LedgerTransaction> = self
            .transactions
            .iter()
            .filter(|t| t.account_id == account.id)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| {
            b.transaction_date
                .cmp(&a.transaction_date)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });

        Some(AccountStatement {
            account,
            transactions,
        })
    }

    /// Recomputes an account's balance by replaying its history
    ///
    /// Cross-check against the running balance; the two must always agree.
    pub fn replayed_balance(&self, account_id: AccountId) -> Option<Money> {
        let account = self.accounts.get(&account_id)?;
        Some(
            self.transactions
                .iter()
                .filter(|t| t.account_id == account_id)
                .map(|t| signed_amount(account.kind, t.kind, t.amount))
                .sum(),
        )
    }

    /// Number of accounts in the registry
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Number of posted transactions
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionKind;
    use rust_decimal_macros::dec;

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut book = LedgerBook::new();

        let first = book.get_or_create_account(AccountKind::Doctor, 7, "Dr. A");
        let second = book.get_or_create_account(AccountKind::Doctor, 7, "Dr. A");

        assert_eq!(first, second);
        assert_eq!(book.account_count(), 1);
    }

    #[test]
    fn test_holder_name_frozen_at_first_reference() {
        let mut book = LedgerBook::new();

        let id = book.get_or_create_account(AccountKind::Patient, 3, "Original Name");
        book.get_or_create_account(AccountKind::Patient, 3, "Renamed");

        assert_eq!(book.account(id).unwrap().holder_name, "Original Name");
    }

    #[test]
    fn test_same_holder_different_kinds_get_distinct_accounts() {
        let mut book = LedgerBook::new();

        let as_patient = book.get_or_create_account(AccountKind::Patient, 5, "X");
        let as_doctor = book.get_or_create_account(AccountKind::Doctor, 5, "X");

        assert_ne!(as_patient, as_doctor);
        assert_eq!(book.account_count(), 2);
    }

    #[test]
    fn test_post_credit_raises_doctor_balance() {
        let mut book = LedgerBook::new();
        let account = book.get_or_create_account(AccountKind::Doctor, 7, "Dr. A");

        book.post(
            account,
            NewTransaction::new(
                TransactionKind::Credit,
                Money::new(dec!(300)),
                "Doctor share",
            ),
        )
        .unwrap();

        assert_eq!(book.account(account).unwrap().balance, Money::new(dec!(300)));
        assert!(book.account(account).unwrap().last_transaction_date.is_some());
    }

    #[test]
    fn test_post_rejects_non_positive_amounts() {
        let mut book = LedgerBook::new();
        let account = book.get_or_create_account(AccountKind::Patient, 1, "P");

        for amount in [dec!(0), dec!(-10)] {
            let result = book.post(
                account,
                NewTransaction::new(TransactionKind::Payment, Money::new(amount), "bad"),
            );
            assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));
        }

        // No rows written, balance untouched
        assert_eq!(book.transaction_count(), 0);
        assert!(book.account(account).unwrap().balance.is_zero());
    }

    #[test]
    fn test_post_to_unknown_account_fails() {
        let mut book = LedgerBook::new();

        let result = book.post(
            AccountId::new(99),
            NewTransaction::new(TransactionKind::Credit, Money::new(dec!(10)), "x"),
        );

        assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));
        assert_eq!(book.transaction_count(), 0);
    }

    #[test]
    fn test_patient_counters_accumulate_independent_of_order() {
        let mut book = LedgerBook::new();
        let account = book.get_or_create_account(AccountKind::Patient, 2, "P");

        let postings = [
            (TransactionKind::Payment, dec!(100)),
            (TransactionKind::Debit, dec!(250)),
            (TransactionKind::Payment, dec!(400)),
            (TransactionKind::Debit, dec!(50)),
            (TransactionKind::Payment, dec!(25)),
        ];
        for (kind, amount) in postings {
            book.post(
                account,
                NewTransaction::new(kind, Money::new(amount), "tx"),
            )
            .unwrap();
        }

        let acct = book.account(account).unwrap();
        assert_eq!(acct.total_paid, Money::new(dec!(525)));
        assert_eq!(acct.total_dues, Money::new(dec!(300)));
        assert_eq!(acct.balance, Money::new(dec!(225)));
    }

    #[test]
    fn test_balance_equals_signed_replay() {
        let mut book = LedgerBook::new();
        let doctor = book.get_or_create_account(AccountKind::Doctor, 7, "Dr. A");

        for (kind, amount) in [
            (TransactionKind::Credit, dec!(400)),
            (TransactionKind::Credit, dec!(150)),
            (TransactionKind::Withdrawal, dec!(200)),
            // Record-only pair: logged but no balance movement
            (TransactionKind::Payment, dec!(999)),
        ] {
            book.post(doctor, NewTransaction::new(kind, Money::new(amount), "tx"))
                .unwrap();
        }

        let balance = book.account(doctor).unwrap().balance;
        assert_eq!(balance, Money::new(dec!(350)));
        assert_eq!(book.replayed_balance(doctor).unwrap(), balance);
        assert_eq!(book.transaction_count(), 4);
    }

    #[test]
    fn test_statement_is_most_recent_first() {
        use chrono::NaiveDate;

        let mut book = LedgerBook::new();
        let account = book.get_or_create_account(AccountKind::Clinic, 1, "Clinic");

        let early = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let late = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();

        book.post(
            account,
            NewTransaction::new(TransactionKind::Credit, Money::new(dec!(100)), "old").dated(early),
        )
        .unwrap();
        book.post(
            account,
            NewTransaction::new(TransactionKind::Credit, Money::new(dec!(200)), "new").dated(late),
        )
        .unwrap();

        let statement = book.statement(AccountKind::Clinic, 1).unwrap();
        assert_eq!(statement.transactions.len(), 2);
        assert_eq!(statement.transactions[0].description, "new");
        assert_eq!(statement.transactions[1].description, "old");
        assert_eq!(statement.account.balance, Money::new(dec!(300)));
    }

    #[test]
    fn test_statement_for_unknown_holder_is_none() {
        let book = LedgerBook::new();
        assert!(book.statement(AccountKind::Supplier, 42).is_none());
    }
}
