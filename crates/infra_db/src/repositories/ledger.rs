//! Ledger repository implementation
//!
//! Database access for the account registry and transaction poster: lazy
//! account creation keyed by (kind, holder), append-only postings applied
//! through the posting-effect table, statements, and per-kind aggregates.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{AccountId, Money, TransactionId};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use domain_ledger::account::{Account, AccountKind};
use domain_ledger::posting::{effect_for, signed_amount, BalanceDirection, PatientCounter};
use domain_ledger::summary::{AccountKindSummary, AccountStatement};
use domain_ledger::transaction::{LedgerTransaction, NewTransaction, TransactionKind};

use crate::error::DatabaseError;

/// Raw `accounts` row
#[derive(Debug, sqlx::FromRow)]
pub struct AccountRow {
    pub id: i64,
    pub account_type: String,
    pub holder_id: i64,
    pub holder_name: String,
    pub balance: Decimal,
    pub total_dues: Decimal,
    pub total_paid: Decimal,
    pub last_transaction_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_domain(self) -> Result<Account, DatabaseError> {
        let kind = self
            .account_type
            .parse::<AccountKind>()
            .map_err(DatabaseError::SerializationError)?;

        Ok(Account {
            id: AccountId::new(self.id),
            kind,
            holder_id: self.holder_id,
            holder_name: self.holder_name,
            balance: Money::new(self.balance),
            total_dues: Money::new(self.total_dues),
            total_paid: Money::new(self.total_paid),
            last_transaction_date: self.last_transaction_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Raw `financial_transactions` row
#[derive(Debug, sqlx::FromRow)]
pub struct TransactionRow {
    pub id: i64,
    pub account_id: i64,
    pub transaction_type: String,
    pub amount: Decimal,
    pub description: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<i64>,
    pub transaction_date: NaiveDate,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_domain(self) -> Result<LedgerTransaction, DatabaseError> {
        let kind = self
            .transaction_type
            .parse::<TransactionKind>()
            .map_err(DatabaseError::SerializationError)?;
        let payment_method = self
            .payment_method
            .map(|m| m.parse())
            .transpose()
            .map_err(DatabaseError::SerializationError)?;

        Ok(LedgerTransaction {
            id: TransactionId::new(self.id),
            account_id: AccountId::new(self.account_id),
            kind,
            amount: Money::new(self.amount),
            description: self.description,
            reference_type: self.reference_type,
            reference_id: self.reference_id,
            transaction_date: self.transaction_date,
            payment_method,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

/// Repository for ledger accounts and transactions
///
/// Postings are atomic: the transaction row and the balance update land
/// together or not at all.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Looks up or lazily creates the account for a (kind, holder) pair
    ///
    /// Idempotent: repeat calls return the existing account id. The holder
    /// name is frozen at first reference and not updated on later calls.
    pub async fn get_or_create_account(
        &self,
        kind: AccountKind,
        holder_id: i64,
        holder_name: &str,
    ) -> Result<AccountId, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        Self::get_or_create_account_on(&mut conn, kind, holder_id, holder_name).await
    }

    /// [`get_or_create_account`](Self::get_or_create_account) over a raw
    /// connection, for composing into a larger transaction
    ///
    /// Concurrent first references race on the accounts unique constraint;
    /// the loser's insert is skipped and the follow-up lookup returns the
    /// winner's row.
    pub async fn get_or_create_account_on(
        conn: &mut PgConnection,
        kind: AccountKind,
        holder_id: i64,
        holder_name: &str,
    ) -> Result<AccountId, DatabaseError> {
        let inserted: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO accounts (account_type, holder_id, holder_name)
            VALUES ($1, $2, $3)
            ON CONFLICT ON CONSTRAINT uq_accounts_type_holder DO NOTHING
            RETURNING id
            "#,
        )
        .bind(kind.as_str())
        .bind(holder_id)
        .bind(holder_name)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(id) = inserted {
            debug!(kind = %kind, holder_id, "opened account");
            return Ok(AccountId::new(id));
        }

        let id: i64 =
            sqlx::query_scalar("SELECT id FROM accounts WHERE account_type = $1 AND holder_id = $2")
                .bind(kind.as_str())
                .bind(holder_id)
                .fetch_one(&mut *conn)
                .await?;

        Ok(AccountId::new(id))
    }

    /// Gets an account by id
    pub async fn get_account(&self, id: AccountId) -> Result<Account, DatabaseError> {
        let row: Option<AccountRow> = sqlx::query_as("SELECT * FROM accounts WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or_else(|| DatabaseError::not_found("Account", id))?
            .into_domain()
    }

    /// Finds the account for a (kind, holder) pair, if one exists
    pub async fn find_account(
        &self,
        kind: AccountKind,
        holder_id: i64,
    ) -> Result<Option<Account>, DatabaseError> {
        let row: Option<AccountRow> =
            sqlx::query_as("SELECT * FROM accounts WHERE account_type = $1 AND holder_id = $2")
                .bind(kind.as_str())
                .bind(holder_id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(AccountRow::into_domain).transpose()
    }

    /// Posts a transaction and applies its effect to the owning account
    ///
    /// # Errors
    ///
    /// - `ConstraintViolation` if the amount is not strictly positive (no
    ///   row is written)
    /// - `NotFound` if the account id is unknown
    pub async fn post(
        &self,
        account_id: AccountId,
        new: NewTransaction,
    ) -> Result<TransactionId, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let id = Self::post_on(&mut tx, account_id, new).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// [`post`](Self::post) over a raw connection, for composing into a
    /// larger transaction
    pub async fn post_on(
        conn: &mut PgConnection,
        account_id: AccountId,
        new: NewTransaction,
    ) -> Result<TransactionId, DatabaseError> {
        if !new.amount.is_positive() {
            return Err(DatabaseError::ConstraintViolation(format!(
                "posting amount must be positive, got {}",
                new.amount
            )));
        }

        let account_kind: Option<String> =
            sqlx::query_scalar("SELECT account_type FROM accounts WHERE id = $1")
                .bind(account_id.get())
                .fetch_optional(&mut *conn)
                .await?;
        let account_kind = account_kind
            .ok_or_else(|| DatabaseError::not_found("Account", account_id))?
            .parse::<AccountKind>()
            .map_err(DatabaseError::SerializationError)?;

        let transaction_date = new.effective_date();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO financial_transactions (
                account_id, transaction_type, amount, description,
                reference_type, reference_id, transaction_date,
                payment_method, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(account_id.get())
        .bind(new.kind.as_str())
        .bind(new.amount.amount())
        .bind(&new.description)
        .bind(&new.reference_type)
        .bind(new.reference_id)
        .bind(transaction_date)
        .bind(new.payment_method.map(|m| m.as_str()))
        .bind(&new.notes)
        .fetch_one(&mut *conn)
        .await?;

        Self::apply_effect_on(conn, account_id, account_kind, new.kind, new.amount, transaction_date)
            .await?;

        debug!(
            account = %account_id,
            kind = %new.kind,
            amount = %new.amount,
            "posted transaction"
        );
        Ok(TransactionId::new(id))
    }

    /// Applies the posting effect for the (account kind, transaction kind)
    /// pair to the account row
    ///
    /// The balance moves by a relative update, so concurrent postings to the
    /// same account serialize on the row without a read-modify-write race.
    /// Record-only pairs still stamp `last_transaction_date`.
    async fn apply_effect_on(
        conn: &mut PgConnection,
        account_id: AccountId,
        account_kind: AccountKind,
        transaction_kind: TransactionKind,
        amount: Money,
        transaction_date: NaiveDate,
    ) -> Result<(), DatabaseError> {
        let effect = effect_for(account_kind, transaction_kind);

        let delta = match effect.direction {
            BalanceDirection::Increase => amount.amount(),
            BalanceDirection::Decrease => -amount.amount(),
            BalanceDirection::RecordOnly => Decimal::ZERO,
        };

        match effect.counter {
            Some(counter) => {
                let sql = match counter {
                    PatientCounter::Paid => {
                        r#"
                        UPDATE accounts
                        SET balance = balance + $1,
                            total_paid = total_paid + $2,
                            last_transaction_date = $3,
                            updated_at = now()
                        WHERE id = $4
                        "#
                    }
                    PatientCounter::Dues => {
                        r#"
                        UPDATE accounts
                        SET balance = balance + $1,
                            total_dues = total_dues + $2,
                            last_transaction_date = $3,
                            updated_at = now()
                        WHERE id = $4
                        "#
                    }
                };
                sqlx::query(sql)
                    .bind(delta)
                    .bind(amount.amount())
                    .bind(transaction_date)
                    .bind(account_id.get())
                    .execute(&mut *conn)
                    .await?;
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE accounts
                    SET balance = balance + $1,
                        last_transaction_date = $2,
                        updated_at = now()
                    WHERE id = $3
                    "#,
                )
                .bind(delta)
                .bind(transaction_date)
                .bind(account_id.get())
                .execute(&mut *conn)
                .await?;
            }
        }

        Ok(())
    }

    /// The statement for a (kind, holder) pair: account plus full history,
    /// most recent first
    pub async fn get_statement(
        &self,
        kind: AccountKind,
        holder_id: i64,
    ) -> Result<AccountStatement, DatabaseError> {
        let account = self
            .find_account(kind, holder_id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Account", format!("{kind}/{holder_id}")))?;

        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT * FROM financial_transactions
            WHERE account_id = $1
            ORDER BY transaction_date DESC, created_at DESC, id DESC
            "#,
        )
        .bind(account.id.get())
        .fetch_all(&self.pool)
        .await?;

        let transactions = rows
            .into_iter()
            .map(TransactionRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AccountStatement {
            account,
            transactions,
        })
    }

    /// Per-kind aggregates across all accounts
    pub async fn all_accounts_summary(&self) -> Result<Vec<AccountKindSummary>, DatabaseError> {
        let rows: Vec<(String, i64, Decimal, Decimal, Decimal)> = sqlx::query_as(
            r#"
            SELECT account_type,
                   COUNT(*),
                   COALESCE(SUM(total_dues), 0),
                   COALESCE(SUM(total_paid), 0),
                   COALESCE(SUM(balance), 0)
            FROM accounts
            GROUP BY account_type
            ORDER BY account_type
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(kind, accounts_count, dues, paid, balance)| {
                Ok(AccountKindSummary {
                    kind: kind.parse().map_err(DatabaseError::SerializationError)?,
                    accounts_count,
                    total_dues: Money::new(dues),
                    total_paid: Money::new(paid),
                    total_balance: Money::new(balance),
                })
            })
            .collect()
    }

    /// Recomputes an account's balance by replaying its history
    ///
    /// Cross-check against the running balance; the two must always agree.
    pub async fn replayed_balance(&self, account_id: AccountId) -> Result<Money, DatabaseError> {
        let account = self.get_account(account_id).await?;

        let rows: Vec<(String, Decimal)> = sqlx::query_as(
            "SELECT transaction_type, amount FROM financial_transactions WHERE account_id = $1",
        )
        .bind(account_id.get())
        .fetch_all(&self.pool)
        .await?;

        let mut total = Money::zero();
        for (kind, amount) in rows {
            let kind = kind
                .parse::<TransactionKind>()
                .map_err(DatabaseError::SerializationError)?;
            total = total + signed_amount(account.kind, kind, Money::new(amount));
        }
        Ok(total)
    }
}
