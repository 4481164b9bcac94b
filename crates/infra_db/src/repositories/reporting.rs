//! Reporting repository implementation
//!
//! Read-only financial summaries. Doctor earnings and clinic revenue are
//! recomputed from the payments table rather than read off account balances;
//! keeping both derivations gives a standing cross-check between the
//! orchestrated postings and the payment records they came from.

use core_kernel::{DoctorId, Money, PatientId, SupplierId};
use rust_decimal::Decimal;
use sqlx::PgPool;

use domain_ledger::summary::{
    ClinicFinancialSummary, DoctorFinancialSummary, MonthlyFigure, PatientFinancialSummary,
    SupplierFinancialSummary,
};

use crate::error::DatabaseError;

/// Months of history shown in monthly breakdowns
const MONTHLY_WINDOW: i64 = 6;

/// Repository for read-only financial summaries
#[derive(Debug, Clone)]
pub struct ReportingRepository {
    pool: PgPool,
}

impl ReportingRepository {
    /// Creates a new ReportingRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A patient's financial position
    ///
    /// Treatment cost comes from confirmed and completed appointments;
    /// payments count only while `completed`.
    pub async fn patient_summary(
        &self,
        patient_id: PatientId,
    ) -> Result<PatientFinancialSummary, DatabaseError> {
        let total_cost: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_cost), 0)
            FROM appointments
            WHERE patient_id = $1 AND status IN ('confirmed', 'completed')
            "#,
        )
        .bind(patient_id.get())
        .fetch_one(&self.pool)
        .await?;

        let total_paid: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM payments
            WHERE patient_id = $1 AND status = 'completed'
            "#,
        )
        .bind(patient_id.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(PatientFinancialSummary::from_totals(
            Money::new(total_cost),
            Money::new(total_paid),
        ))
    }

    /// A doctor's financial position
    ///
    /// Earnings sum the doctor shares of completed payments on the doctor's
    /// appointments; withdrawals come from the doctor's account history.
    pub async fn doctor_summary(
        &self,
        doctor_id: DoctorId,
    ) -> Result<DoctorFinancialSummary, DatabaseError> {
        let total_earnings: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(p.doctor_share), 0)
            FROM payments p
            JOIN appointments a ON a.id = p.appointment_id
            WHERE a.doctor_id = $1 AND p.status = 'completed'
            "#,
        )
        .bind(doctor_id.get())
        .fetch_one(&self.pool)
        .await?;

        let total_withdrawn: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(t.amount), 0)
            FROM financial_transactions t
            JOIN accounts ac ON ac.id = t.account_id
            WHERE ac.account_type = 'doctor'
              AND ac.holder_id = $1
              AND t.transaction_type = 'withdrawal'
            "#,
        )
        .bind(doctor_id.get())
        .fetch_one(&self.pool)
        .await?;

        let monthly: Vec<(String, Decimal)> = sqlx::query_as(
            r#"
            SELECT to_char(p.payment_date, 'YYYY-MM') AS month,
                   COALESCE(SUM(p.doctor_share), 0)
            FROM payments p
            JOIN appointments a ON a.id = p.appointment_id
            WHERE a.doctor_id = $1 AND p.status = 'completed'
            GROUP BY 1
            ORDER BY 1 DESC
            LIMIT $2
            "#,
        )
        .bind(doctor_id.get())
        .bind(MONTHLY_WINDOW)
        .fetch_all(&self.pool)
        .await?;

        let total_earnings = Money::new(total_earnings);
        let total_withdrawn = Money::new(total_withdrawn);

        Ok(DoctorFinancialSummary {
            total_earnings,
            total_withdrawn,
            current_balance: total_earnings - total_withdrawn,
            monthly_earnings: monthly_figures(monthly),
        })
    }

    /// A supplier's financial position
    ///
    /// Invoices are the credit transactions on the supplier's account,
    /// settlements the payment transactions.
    pub async fn supplier_summary(
        &self,
        supplier_id: SupplierId,
    ) -> Result<SupplierFinancialSummary, DatabaseError> {
        let totals: (Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(t.amount) FILTER (WHERE t.transaction_type = 'credit'), 0),
                COALESCE(SUM(t.amount) FILTER (WHERE t.transaction_type = 'payment'), 0)
            FROM financial_transactions t
            JOIN accounts ac ON ac.id = t.account_id
            WHERE ac.account_type = 'supplier' AND ac.holder_id = $1
            "#,
        )
        .bind(supplier_id.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(SupplierFinancialSummary::from_totals(
            Money::new(totals.0),
            Money::new(totals.1),
        ))
    }

    /// The clinic's financial position
    ///
    /// Revenue sums the clinic shares of completed payments; expenses come
    /// from the expense table.
    pub async fn clinic_summary(&self) -> Result<ClinicFinancialSummary, DatabaseError> {
        let total_revenue: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(clinic_share), 0) FROM payments WHERE status = 'completed'",
        )
        .fetch_one(&self.pool)
        .await?;

        let total_expenses: Decimal =
            sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM expenses")
                .fetch_one(&self.pool)
                .await?;

        let monthly: Vec<(String, Decimal)> = sqlx::query_as(
            r#"
            SELECT to_char(payment_date, 'YYYY-MM') AS month,
                   COALESCE(SUM(clinic_share), 0)
            FROM payments
            WHERE status = 'completed'
            GROUP BY 1
            ORDER BY 1 DESC
            LIMIT $1
            "#,
        )
        .bind(MONTHLY_WINDOW)
        .fetch_all(&self.pool)
        .await?;

        let total_revenue = Money::new(total_revenue);
        let total_expenses = Money::new(total_expenses);

        Ok(ClinicFinancialSummary {
            total_revenue,
            total_expenses,
            net_profit: total_revenue - total_expenses,
            monthly_revenue: monthly_figures(monthly),
        })
    }
}

fn monthly_figures(rows: Vec<(String, Decimal)>) -> Vec<MonthlyFigure> {
    rows.into_iter()
        .map(|(month, total)| MonthlyFigure {
            month,
            total: Money::new(total),
        })
        .collect()
}
