//! Payment repository implementation
//!
//! Recording a payment is the one orchestrated write in the system: the
//! payment row, the patient posting, and the doctor/clinic share postings
//! all land in a single database transaction, so a failure at any step
//! leaves no partial postings behind.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{AppointmentId, Money, PatientId, PaymentId};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;

use domain_ledger::account::{AccountKind, CLINIC_HOLDER_ID, CLINIC_HOLDER_NAME};
use domain_ledger::payment::{NewPayment, Payment, PaymentStatus};
use domain_ledger::split::RevenueSplit;
use domain_ledger::transaction::{NewTransaction, TransactionKind};

use crate::error::DatabaseError;
use crate::repositories::ledger::LedgerRepository;

/// Raw `payments` row
#[derive(Debug, sqlx::FromRow)]
pub struct PaymentRow {
    pub id: i64,
    pub appointment_id: Option<i64>,
    pub patient_id: i64,
    pub amount: Decimal,
    pub payment_method: String,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
    pub doctor_share: Decimal,
    pub clinic_share: Decimal,
    pub doctor_percentage: Decimal,
    pub clinic_percentage: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl PaymentRow {
    fn into_domain(self) -> Result<Payment, DatabaseError> {
        let payment_method = self
            .payment_method
            .parse()
            .map_err(DatabaseError::SerializationError)?;
        let status = self
            .status
            .parse()
            .map_err(DatabaseError::SerializationError)?;

        Ok(Payment {
            id: PaymentId::new(self.id),
            appointment_id: self.appointment_id.map(AppointmentId::new),
            patient_id: PatientId::new(self.patient_id),
            amount: Money::new(self.amount),
            payment_method,
            payment_date: self.payment_date,
            notes: self.notes,
            split: RevenueSplit {
                doctor_share: Money::new(self.doctor_share),
                clinic_share: Money::new(self.clinic_share),
                doctor_percentage: self.doctor_percentage,
                clinic_percentage: self.clinic_percentage,
            },
            status,
            created_at: self.created_at,
        })
    }
}

/// A payment joined with the paying patient's name, for listings
#[derive(Debug, Clone)]
pub struct PaymentListing {
    pub payment: Payment,
    pub patient_name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentListingRow {
    #[sqlx(flatten)]
    payment: PaymentRow,
    patient_name: String,
}

/// Repository for clinical payments and their ledger orchestration
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a payment and posts its ledger legs atomically
    ///
    /// Resolves the revenue split from the appointment's treatment (50/50
    /// when the treatment carries no percentages, everything to the clinic
    /// when there is no appointment), then in one database transaction:
    ///
    /// 1. inserts the payment row,
    /// 2. posts the full amount to the patient's account,
    /// 3. posts the doctor share to the doctor's account when it is
    ///    positive and the appointment has a doctor,
    /// 4. posts the clinic share to the clinic's account when positive.
    ///
    /// Every posting references the payment row, so the legs of one payment
    /// can be found together later.
    ///
    /// # Errors
    ///
    /// - `ConstraintViolation` if the amount is not strictly positive
    /// - `NotFound` if the patient or appointment does not exist
    pub async fn record_payment(&self, new: NewPayment) -> Result<Payment, DatabaseError> {
        if !new.amount.is_positive() {
            return Err(DatabaseError::ConstraintViolation(format!(
                "payment amount must be positive, got {}",
                new.amount
            )));
        }

        let mut tx = self.pool.begin().await?;

        let patient_name: String = sqlx::query_scalar("SELECT name FROM patients WHERE id = $1")
            .bind(new.patient_id.get())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Patient", new.patient_id))?;

        let (split, doctor_id) = match new.appointment_id {
            Some(appointment_id) => {
                let row: Option<(Option<Decimal>, Option<i64>)> = sqlx::query_as(
                    r#"
                    SELECT t.doctor_percentage, a.doctor_id
                    FROM appointments a
                    LEFT JOIN treatments t ON t.id = a.treatment_id
                    WHERE a.id = $1
                    "#,
                )
                .bind(appointment_id.get())
                .fetch_optional(&mut *tx)
                .await?;

                let (doctor_percentage, doctor_id) =
                    row.ok_or_else(|| DatabaseError::not_found("Appointment", appointment_id))?;

                let split = match doctor_percentage {
                    Some(pct) => RevenueSplit::calculate(new.amount, pct),
                    None => RevenueSplit::even(new.amount),
                };
                (split, doctor_id)
            }
            None => (RevenueSplit::clinic_only(new.amount), None),
        };

        let (payment_id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO payments (
                appointment_id, patient_id, amount, payment_method,
                payment_date, notes, doctor_share, clinic_share,
                doctor_percentage, clinic_percentage, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, created_at
            "#,
        )
        .bind(new.appointment_id.map(|id| id.get()))
        .bind(new.patient_id.get())
        .bind(new.amount.amount())
        .bind(new.payment_method.as_str())
        .bind(new.payment_date)
        .bind(&new.notes)
        .bind(split.doctor_share.amount())
        .bind(split.clinic_share.amount())
        .bind(split.doctor_percentage)
        .bind(split.clinic_percentage)
        .bind(PaymentStatus::Completed.as_str())
        .fetch_one(&mut *tx)
        .await?;

        // Patient leg: the full amount, raising balance and total_paid
        let patient_account = LedgerRepository::get_or_create_account_on(
            &mut tx,
            AccountKind::Patient,
            new.patient_id.get(),
            &patient_name,
        )
        .await?;

        let description = match new.appointment_id {
            Some(appointment_id) => format!("Payment for appointment #{}", appointment_id.get()),
            None => "General payment".to_string(),
        };
        let mut patient_posting =
            NewTransaction::new(TransactionKind::Payment, new.amount, description)
                .with_reference("payment", payment_id)
                .dated(new.payment_date)
                .with_payment_method(new.payment_method);
        if let Some(notes) = &new.notes {
            patient_posting = patient_posting.with_notes(notes.clone());
        }
        LedgerRepository::post_on(&mut tx, patient_account, patient_posting).await?;

        // Doctor leg: skipped entirely for a zero share or a doctorless
        // appointment
        if split.doctor_share.is_positive() {
            if let Some(doctor_id) = doctor_id {
                let doctor_name: String =
                    sqlx::query_scalar("SELECT name FROM doctors WHERE id = $1")
                        .bind(doctor_id)
                        .fetch_optional(&mut *tx)
                        .await?
                        .ok_or_else(|| DatabaseError::not_found("Doctor", doctor_id))?;

                let doctor_account = LedgerRepository::get_or_create_account_on(
                    &mut tx,
                    AccountKind::Doctor,
                    doctor_id,
                    &doctor_name,
                )
                .await?;
                LedgerRepository::post_on(
                    &mut tx,
                    doctor_account,
                    NewTransaction::new(
                        TransactionKind::Credit,
                        split.doctor_share,
                        format!("Doctor share of payment #{payment_id}"),
                    )
                    .with_reference("payment", payment_id)
                    .dated(new.payment_date)
                    .with_notes(format!("{}% of {}", split.doctor_percentage, new.amount)),
                )
                .await?;
            }
        }

        // Clinic leg
        if split.clinic_share.is_positive() {
            let clinic_account = LedgerRepository::get_or_create_account_on(
                &mut tx,
                AccountKind::Clinic,
                CLINIC_HOLDER_ID,
                CLINIC_HOLDER_NAME,
            )
            .await?;
            LedgerRepository::post_on(
                &mut tx,
                clinic_account,
                NewTransaction::new(
                    TransactionKind::Credit,
                    split.clinic_share,
                    format!("Clinic share of payment #{payment_id}"),
                )
                .with_reference("payment", payment_id)
                .dated(new.payment_date),
            )
            .await?;
        }

        tx.commit().await?;

        info!(
            payment = payment_id,
            patient = %new.patient_id,
            amount = %new.amount,
            doctor_share = %split.doctor_share,
            clinic_share = %split.clinic_share,
            "recorded payment"
        );

        Ok(Payment {
            id: PaymentId::new(payment_id),
            appointment_id: new.appointment_id,
            patient_id: new.patient_id,
            amount: new.amount,
            payment_method: new.payment_method,
            payment_date: new.payment_date,
            notes: new.notes,
            split,
            status: PaymentStatus::Completed,
            created_at,
        })
    }

    /// Gets a payment by id
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, DatabaseError> {
        let row: Option<PaymentRow> = sqlx::query_as("SELECT * FROM payments WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or_else(|| DatabaseError::not_found("Payment", id))?
            .into_domain()
    }

    /// Lists all payments with the paying patient's name, newest first
    pub async fn list_payments(&self) -> Result<Vec<PaymentListing>, DatabaseError> {
        let rows: Vec<PaymentListingRow> = sqlx::query_as(
            r#"
            SELECT p.*, pa.name AS patient_name
            FROM payments p
            JOIN patients pa ON pa.id = p.patient_id
            ORDER BY p.payment_date DESC, p.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(PaymentListing {
                    payment: row.payment.into_domain()?,
                    patient_name: row.patient_name,
                })
            })
            .collect()
    }

    /// Updates a payment's status flag
    ///
    /// Only the flag changes; already-posted ledger legs are never touched.
    pub async fn update_payment_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE payments SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Payment", id));
        }

        info!(payment = %id, status = %status, "updated payment status");
        Ok(())
    }
}
