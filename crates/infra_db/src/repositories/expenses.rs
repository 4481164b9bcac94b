//! Expense repository implementation
//!
//! Expenses live in their own table rather than the ledger; the clinic
//! summary subtracts their total from revenue.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{ExpenseId, Money};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;

use domain_ledger::payment::PaymentMethod;

use crate::error::DatabaseError;

/// Data for an expense that has not been recorded yet
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// Expense category (e.g., "rent", "supplies")
    pub category: String,
    /// Description
    pub description: Option<String>,
    /// Amount spent (must be > 0)
    pub amount: Money,
    /// Business date
    pub expense_date: NaiveDate,
    /// How the money was paid out
    pub payment_method: Option<PaymentMethod>,
    /// Notes
    pub notes: Option<String>,
}

impl NewExpense {
    /// Creates an expense request
    pub fn new(category: impl Into<String>, amount: Money, expense_date: NaiveDate) -> Self {
        Self {
            category: category.into(),
            description: None,
            amount,
            expense_date,
            payment_method: None,
            notes: None,
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
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
}

/// A recorded expense
#[derive(Debug, Clone)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub category: String,
    pub description: Option<String>,
    pub amount: Money,
    pub expense_date: NaiveDate,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: i64,
    category: String,
    description: Option<String>,
    amount: Decimal,
    expense_date: NaiveDate,
    payment_method: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl ExpenseRow {
    fn into_domain(self) -> Result<ExpenseRecord, DatabaseError> {
        let payment_method = self
            .payment_method
            .map(|m| m.parse())
            .transpose()
            .map_err(DatabaseError::SerializationError)?;

        Ok(ExpenseRecord {
            id: ExpenseId::new(self.id),
            category: self.category,
            description: self.description,
            amount: Money::new(self.amount),
            expense_date: self.expense_date,
            payment_method,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

/// Repository for the clinic's expense ledger
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records an expense
    ///
    /// # Errors
    ///
    /// Returns `ConstraintViolation` if the amount is not strictly positive
    pub async fn create_expense(&self, new: NewExpense) -> Result<ExpenseId, DatabaseError> {
        if !new.amount.is_positive() {
            return Err(DatabaseError::ConstraintViolation(format!(
                "expense amount must be positive, got {}",
                new.amount
            )));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO expenses (
                category, description, amount, expense_date, payment_method, notes
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&new.category)
        .bind(&new.description)
        .bind(new.amount.amount())
        .bind(new.expense_date)
        .bind(new.payment_method.map(|m| m.as_str()))
        .bind(&new.notes)
        .fetch_one(&self.pool)
        .await?;

        info!(expense = id, category = %new.category, amount = %new.amount, "recorded expense");
        Ok(ExpenseId::new(id))
    }

    /// Lists all expenses, newest first
    pub async fn list_expenses(&self) -> Result<Vec<ExpenseRecord>, DatabaseError> {
        let rows: Vec<ExpenseRow> =
            sqlx::query_as("SELECT * FROM expenses ORDER BY expense_date DESC, id DESC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(ExpenseRow::into_domain).collect()
    }

    /// The sum of all recorded expenses
    pub async fn total_expenses(&self) -> Result<Money, DatabaseError> {
        let total: Decimal =
            sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM expenses")
                .fetch_one(&self.pool)
                .await?;

        Ok(Money::new(total))
    }
}
