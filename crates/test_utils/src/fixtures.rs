//! Pre-built Test Fixtures
//!
//! Seed helpers for the clinical collaborator tables (patients, doctors,
//! suppliers, treatments, appointments) plus deterministic value fixtures.
//! The seeders write through the pool directly; the ledger under test only
//! ever reads these tables.

use chrono::NaiveDate;
use core_kernel::{AppointmentId, DoctorId, Money, PatientId, SupplierId, TreatmentId};
use fake::faker::name::en::Name;
use fake::Fake;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgPool;

/// Fixed business date used across tests
pub static TEST_DATE: Lazy<NaiveDate> =
    Lazy::new(|| NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date"));

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A typical treatment price
    pub fn treatment_price() -> Money {
        Money::new(dec!(1000.00))
    }

    /// An amount that does not divide evenly at common percentages
    pub fn awkward_amount() -> Money {
        Money::new(dec!(999.99))
    }
}

/// A randomly generated person name
pub fn person_name() -> String {
    Name().fake()
}

/// Inserts a patient row, returning its id
pub async fn seed_patient(pool: &PgPool, name: &str) -> Result<PatientId, sqlx::Error> {
    let id: i64 = sqlx::query_scalar("INSERT INTO patients (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(PatientId::new(id))
}

/// Inserts a doctor row, returning its id
pub async fn seed_doctor(pool: &PgPool, name: &str) -> Result<DoctorId, sqlx::Error> {
    let id: i64 = sqlx::query_scalar("INSERT INTO doctors (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(DoctorId::new(id))
}

/// Inserts a supplier row, returning its id
pub async fn seed_supplier(pool: &PgPool, name: &str) -> Result<SupplierId, sqlx::Error> {
    let id: i64 = sqlx::query_scalar("INSERT INTO suppliers (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(SupplierId::new(id))
}

/// Inserts a treatment row with optional revenue percentages
///
/// Pass `None` to exercise the 50/50 fallback split.
pub async fn seed_treatment(
    pool: &PgPool,
    name: &str,
    doctor_percentage: Option<Decimal>,
) -> Result<TreatmentId, sqlx::Error> {
    let clinic_percentage = doctor_percentage.map(|p| dec!(100) - p);
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO treatments (name, doctor_percentage, clinic_percentage)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(doctor_percentage)
    .bind(clinic_percentage)
    .fetch_one(pool)
    .await?;
    Ok(TreatmentId::new(id))
}

/// Inserts an appointment row, returning its id
pub async fn seed_appointment(
    pool: &PgPool,
    patient_id: PatientId,
    doctor_id: Option<DoctorId>,
    treatment_id: Option<TreatmentId>,
    appointment_date: NaiveDate,
    status: &str,
    total_cost: Money,
) -> Result<AppointmentId, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO appointments (
            patient_id, doctor_id, treatment_id, appointment_date, status, total_cost
        ) VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(patient_id.get())
    .bind(doctor_id.map(|id| id.get()))
    .bind(treatment_id.map(|id| id.get()))
    .bind(appointment_date)
    .bind(status)
    .bind(total_cost.amount())
    .fetch_one(pool)
    .await?;
    Ok(AppointmentId::new(id))
}
