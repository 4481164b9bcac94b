//! Read-only statement and summary value types
//!
//! Doctor earnings and clinic revenue are recomputed from the payments table
//! rather than read off account balances; the two derivations are kept as an
//! intentional cross-check, and persistent divergence between them signals an
//! inconsistency worth investigating.

use core_kernel::Money;
use serde::{Deserialize, Serialize};

use crate::account::{Account, AccountKind};
use crate::transaction::LedgerTransaction;

/// An account's ordered transaction history plus current balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountStatement {
    /// The account, including its running balance
    pub account: Account,
    /// Transactions ordered most-recent-first
    pub transactions: Vec<LedgerTransaction>,
}

/// One month's aggregate figure, labeled "YYYY-MM"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyFigure {
    /// Month label, e.g. "2024-06"
    pub month: String,
    /// Aggregate amount for that month
    pub total: Money,
}

/// Financial position of a patient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientFinancialSummary {
    /// Sum of completed/confirmed appointment costs
    pub total_cost: Money,
    /// Sum of completed payments
    pub total_paid: Money,
    /// `total_cost - total_paid`
    pub outstanding: Money,
    /// Derived settlement label
    pub status: String,
}

impl PatientFinancialSummary {
    /// Builds the summary, deriving outstanding and the settlement label
    pub fn from_totals(total_cost: Money, total_paid: Money) -> Self {
        let outstanding = total_cost - total_paid;
        Self {
            total_cost,
            total_paid,
            outstanding,
            status: settlement_label(outstanding),
        }
    }
}

/// Financial position of a doctor
///
/// `total_earnings` comes from the payments/appointments join, not the
/// account balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorFinancialSummary {
    /// Sum of doctor shares across completed payments
    pub total_earnings: Money,
    /// Sum of withdrawal transactions on the doctor's account
    pub total_withdrawn: Money,
    /// `total_earnings - total_withdrawn`
    pub current_balance: Money,
    /// Last months of earnings, most recent first
    pub monthly_earnings: Vec<MonthlyFigure>,
}

/// Financial position of a supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierFinancialSummary {
    /// Sum of invoice (credit) transactions on the supplier's account
    pub total_invoiced: Money,
    /// Sum of payment transactions made to the supplier
    pub total_paid: Money,
    /// `total_invoiced - total_paid`
    pub outstanding: Money,
    /// Derived settlement label
    pub status: String,
}

impl SupplierFinancialSummary {
    pub fn from_totals(total_invoiced: Money, total_paid: Money) -> Self {
        let outstanding = total_invoiced - total_paid;
        Self {
            total_invoiced,
            total_paid,
            outstanding,
            status: settlement_label(outstanding),
        }
    }
}

/// Financial position of the clinic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicFinancialSummary {
    /// Sum of clinic shares across completed payments
    pub total_revenue: Money,
    /// Sum of the expense ledger
    pub total_expenses: Money,
    /// `total_revenue - total_expenses`
    pub net_profit: Money,
    /// Last months of revenue, most recent first
    pub monthly_revenue: Vec<MonthlyFigure>,
}

/// Per-kind aggregate across all accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountKindSummary {
    /// Account kind
    pub kind: AccountKind,
    /// Number of accounts of this kind
    pub accounts_count: i64,
    /// Sum of `total_dues`
    pub total_dues: Money,
    /// Sum of `total_paid`
    pub total_paid: Money,
    /// Sum of balances
    pub total_balance: Money,
}

/// The settlement label shown next to an outstanding amount
pub fn settlement_label(outstanding: Money) -> String {
    if outstanding.is_positive() {
        format!("outstanding: {outstanding}")
    } else {
        "fully paid".to_string()
    }
}
