//! Test Data Builders
//!
//! Builder for seeding a complete clinical scenario (patient, doctor,
//! treatment, appointment) in one call, so integration tests only spell out
//! the fields they care about.

use chrono::NaiveDate;
use core_kernel::{AppointmentId, DoctorId, Money, PatientId, TreatmentId};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::fixtures::{
    person_name, seed_appointment, seed_doctor, seed_patient, seed_treatment, MoneyFixtures,
    TEST_DATE,
};

/// The ids produced by seeding an appointment scenario
#[derive(Debug, Clone, Copy)]
pub struct SeededAppointment {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub treatment_id: TreatmentId,
    pub appointment_id: AppointmentId,
}

/// Builder for a patient/doctor/treatment/appointment scenario
pub struct AppointmentScenarioBuilder {
    patient_name: String,
    doctor_name: String,
    treatment_name: String,
    doctor_percentage: Option<Decimal>,
    appointment_date: NaiveDate,
    status: String,
    total_cost: Money,
}

impl Default for AppointmentScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppointmentScenarioBuilder {
    /// Creates a builder with random names and sensible defaults
    pub fn new() -> Self {
        Self {
            patient_name: person_name(),
            doctor_name: person_name(),
            treatment_name: "Standard Treatment".to_string(),
            doctor_percentage: Some(Decimal::from(40)),
            appointment_date: *TEST_DATE,
            status: "completed".to_string(),
            total_cost: MoneyFixtures::treatment_price(),
        }
    }

    /// Sets the patient name
    pub fn with_patient_name(mut self, name: impl Into<String>) -> Self {
        self.patient_name = name.into();
        self
    }

    /// Sets the doctor name
    pub fn with_doctor_name(mut self, name: impl Into<String>) -> Self {
        self.doctor_name = name.into();
        self
    }

    /// Sets the treatment's doctor percentage; `None` leaves the treatment
    /// unconfigured so splits fall back to 50/50
    pub fn with_doctor_percentage(mut self, percentage: Option<Decimal>) -> Self {
        self.doctor_percentage = percentage;
        self
    }

    /// Sets the appointment date
    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.appointment_date = date;
        self
    }

    /// Sets the appointment status
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Sets the appointment's total cost
    pub fn with_total_cost(mut self, cost: Money) -> Self {
        self.total_cost = cost;
        self
    }

    /// Seeds all four rows, returning their ids
    pub async fn seed(self, pool: &PgPool) -> Result<SeededAppointment, sqlx::Error> {
        let patient_id = seed_patient(pool, &self.patient_name).await?;
        let doctor_id = seed_doctor(pool, &self.doctor_name).await?;
        let treatment_id =
            seed_treatment(pool, &self.treatment_name, self.doctor_percentage).await?;
        let appointment_id = seed_appointment(
            pool,
            patient_id,
            Some(doctor_id),
            Some(treatment_id),
            self.appointment_date,
            &self.status,
            self.total_cost,
        )
        .await?;

        Ok(SeededAppointment {
            patient_id,
            doctor_id,
            treatment_id,
            appointment_id,
        })
    }
}
