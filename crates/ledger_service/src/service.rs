//! The ledger service facade
//!
//! One entry point over the repositories. The service owns no state beyond
//! the connection pool; construct it with any pool, including a test one.

use chrono::NaiveDate;
use core_kernel::{
    AccountId, DoctorId, ExpenseId, Money, PatientId, PaymentId, SupplierId, TransactionId,
};
use sqlx::PgPool;
use tracing::info;

use domain_ledger::account::AccountKind;
use domain_ledger::payment::{NewPayment, Payment, PaymentStatus};
use domain_ledger::summary::{
    AccountKindSummary, AccountStatement, ClinicFinancialSummary, DoctorFinancialSummary,
    PatientFinancialSummary, SupplierFinancialSummary,
};
use domain_ledger::transaction::{NewTransaction, TransactionKind};
use infra_db::{
    ExpenseRepository, LedgerRepository, NewExpense, PaymentListing, PaymentRepository,
    ReportingRepository,
};

use crate::error::ServiceError;

/// The clinic ledger service
///
/// Wires the ledger, payment, expense, and reporting repositories over a
/// shared connection pool.
#[derive(Debug, Clone)]
pub struct LedgerService {
    ledger: LedgerRepository,
    payments: PaymentRepository,
    expenses: ExpenseRepository,
    reporting: ReportingRepository,
}

impl LedgerService {
    /// Creates a service over an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            ledger: LedgerRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            expenses: ExpenseRepository::new(pool.clone()),
            reporting: ReportingRepository::new(pool),
        }
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    /// Looks up or lazily creates the account for a (kind, holder) pair
    pub async fn get_or_create_account(
        &self,
        kind: AccountKind,
        holder_id: i64,
        holder_name: &str,
    ) -> Result<AccountId, ServiceError> {
        Ok(self
            .ledger
            .get_or_create_account(kind, holder_id, holder_name)
            .await?)
    }

    /// The statement for a (kind, holder) pair: account plus history,
    /// most recent first
    pub async fn get_statement(
        &self,
        kind: AccountKind,
        holder_id: i64,
    ) -> Result<AccountStatement, ServiceError> {
        Ok(self.ledger.get_statement(kind, holder_id).await?)
    }

    /// Per-kind aggregates across all accounts
    pub async fn accounts_overview(&self) -> Result<Vec<AccountKindSummary>, ServiceError> {
        Ok(self.ledger.all_accounts_summary().await?)
    }

    /// Recomputes an account balance by replaying its transaction history
    /// with signed amounts. Agrees with the stored running balance as long
    /// as every posting went through the effect table.
    pub async fn replayed_balance(&self, account_id: AccountId) -> Result<Money, ServiceError> {
        Ok(self.ledger.replayed_balance(account_id).await?)
    }

    // ------------------------------------------------------------------
    // Postings
    // ------------------------------------------------------------------

    /// Posts a single transaction against an account
    pub async fn post_transaction(
        &self,
        account_id: AccountId,
        new: NewTransaction,
    ) -> Result<TransactionId, ServiceError> {
        if !new.amount.is_positive() {
            return Err(ServiceError::Validation(format!(
                "posting amount must be positive, got {}",
                new.amount
            )));
        }
        Ok(self.ledger.post(account_id, new).await?)
    }

    /// Records a doctor taking out accumulated earnings
    ///
    /// Requires the doctor's account to already exist; a doctor with no
    /// postings has nothing to withdraw.
    pub async fn record_withdrawal(
        &self,
        doctor_id: DoctorId,
        amount: Money,
        date: NaiveDate,
        notes: Option<String>,
    ) -> Result<TransactionId, ServiceError> {
        if !amount.is_positive() {
            return Err(ServiceError::Validation(format!(
                "withdrawal amount must be positive, got {amount}"
            )));
        }

        let account = self
            .ledger
            .find_account(AccountKind::Doctor, doctor_id.get())
            .await?
            .ok_or_else(|| ServiceError::not_found("Doctor account", doctor_id))?;

        let mut posting = NewTransaction::new(
            TransactionKind::Withdrawal,
            amount,
            format!("Withdrawal by {}", account.holder_name),
        )
        .dated(date);
        if let Some(notes) = notes {
            posting = posting.with_notes(notes);
        }

        let id = self.ledger.post(account.id, posting).await?;
        info!(doctor = %doctor_id, amount = %amount, "recorded withdrawal");
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------

    /// Records a payment and posts its patient, doctor, and clinic legs in
    /// one database transaction
    pub async fn record_payment(&self, new: NewPayment) -> Result<Payment, ServiceError> {
        if !new.amount.is_positive() {
            return Err(ServiceError::Validation(format!(
                "payment amount must be positive, got {}",
                new.amount
            )));
        }
        Ok(self.payments.record_payment(new).await?)
    }

    /// Gets a payment by id
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, ServiceError> {
        Ok(self.payments.get_payment(id).await?)
    }

    /// Lists all payments with patient names, newest first
    pub async fn list_payments(&self) -> Result<Vec<PaymentListing>, ServiceError> {
        Ok(self.payments.list_payments().await?)
    }

    /// Updates a payment's status flag (summaries only count `completed`)
    pub async fn update_payment_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
    ) -> Result<(), ServiceError> {
        Ok(self.payments.update_payment_status(id, status).await?)
    }

    // ------------------------------------------------------------------
    // Expenses
    // ------------------------------------------------------------------

    /// Records a clinic expense
    pub async fn record_expense(&self, new: NewExpense) -> Result<ExpenseId, ServiceError> {
        if !new.amount.is_positive() {
            return Err(ServiceError::Validation(format!(
                "expense amount must be positive, got {}",
                new.amount
            )));
        }
        Ok(self.expenses.create_expense(new).await?)
    }

    // ------------------------------------------------------------------
    // Summaries
    // ------------------------------------------------------------------

    /// A patient's financial position
    pub async fn patient_summary(
        &self,
        patient_id: PatientId,
    ) -> Result<PatientFinancialSummary, ServiceError> {
        Ok(self.reporting.patient_summary(patient_id).await?)
    }

    /// A doctor's financial position
    pub async fn doctor_summary(
        &self,
        doctor_id: DoctorId,
    ) -> Result<DoctorFinancialSummary, ServiceError> {
        Ok(self.reporting.doctor_summary(doctor_id).await?)
    }

    /// A supplier's financial position
    pub async fn supplier_summary(
        &self,
        supplier_id: SupplierId,
    ) -> Result<SupplierFinancialSummary, ServiceError> {
        Ok(self.reporting.supplier_summary(supplier_id).await?)
    }

    /// The clinic's financial position
    pub async fn clinic_summary(&self) -> Result<ClinicFinancialSummary, ServiceError> {
        Ok(self.reporting.clinic_summary().await?)
    }
}
