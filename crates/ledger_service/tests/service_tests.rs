//! End-to-end tests for the ledger service against PostgreSQL
//!
//! These tests run against a disposable postgres container and are ignored
//! by default; run them with `cargo test -- --ignored` on a machine with
//! Docker available.

use chrono::NaiveDate;
use core_kernel::{DoctorId, Money, PatientId};
use rust_decimal_macros::dec;

use domain_ledger::account::{AccountKind, CLINIC_HOLDER_ID};
use domain_ledger::payment::{NewPayment, PaymentMethod, PaymentStatus};
use domain_ledger::transaction::{NewTransaction, TransactionKind};
use infra_db::NewExpense;
use ledger_service::LedgerService;
use test_utils::assertions::assert_money_eq;
use test_utils::builders::AppointmentScenarioBuilder;
use test_utils::database::TestDatabase;
use test_utils::fixtures::{seed_patient, MoneyFixtures, TEST_DATE};
use test_utils::logging::init_test_tracing;

fn money(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount)
}

async fn service() -> (TestDatabase, LedgerService) {
    init_test_tracing();
    let db = TestDatabase::new().await.expect("test database");
    let service = LedgerService::new(db.pool().clone());
    (db, service)
}

// ============================================================================
// Payment Orchestration
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_payment_with_configured_split_posts_three_legs() {
    let (db, service) = service().await;
    let scenario = AppointmentScenarioBuilder::new()
        .with_doctor_percentage(Some(dec!(40)))
        .seed(db.pool())
        .await
        .unwrap();

    let payment = service
        .record_payment(NewPayment::for_appointment(
            scenario.appointment_id,
            scenario.patient_id,
            money(dec!(1000)),
            PaymentMethod::Cash,
            *TEST_DATE,
        ))
        .await
        .unwrap();

    assert_eq!(payment.split.doctor_share, money(dec!(400)));
    assert_eq!(payment.split.clinic_share, money(dec!(600)));
    assert_eq!(payment.status, PaymentStatus::Completed);

    let patient = service
        .get_statement(AccountKind::Patient, scenario.patient_id.get())
        .await
        .unwrap();
    assert_eq!(patient.account.total_paid, money(dec!(1000)));
    assert_eq!(patient.account.balance, money(dec!(1000)));

    let doctor = service
        .get_statement(AccountKind::Doctor, scenario.doctor_id.get())
        .await
        .unwrap();
    assert_eq!(doctor.account.balance, money(dec!(400)));

    let clinic = service
        .get_statement(AccountKind::Clinic, CLINIC_HOLDER_ID)
        .await
        .unwrap();
    assert_eq!(clinic.account.balance, money(dec!(600)));

    // All three legs point back at the payment row
    for statement in [&patient, &doctor, &clinic] {
        assert_eq!(statement.transactions.len(), 1);
        assert_eq!(
            statement.transactions[0].reference_type.as_deref(),
            Some("payment")
        );
        assert_eq!(
            statement.transactions[0].reference_id,
            Some(payment.id.get())
        );
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_payment_without_appointment_goes_entirely_to_clinic() {
    let (db, service) = service().await;
    let patient_id = seed_patient(db.pool(), "Walk-in Patient").await.unwrap();

    let payment = service
        .record_payment(NewPayment::general(
            patient_id,
            money(dec!(500)),
            PaymentMethod::CreditCard,
            *TEST_DATE,
        ))
        .await
        .unwrap();

    assert!(payment.split.doctor_share.is_zero());
    assert_eq!(payment.split.clinic_share, money(dec!(500)));

    let clinic = service
        .get_statement(AccountKind::Clinic, CLINIC_HOLDER_ID)
        .await
        .unwrap();
    assert_eq!(clinic.account.balance, money(dec!(500)));

    // No doctor account was ever touched
    let doctor_accounts: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE account_type = 'doctor'")
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(doctor_accounts, 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_unconfigured_treatment_splits_evenly() {
    let (db, service) = service().await;
    let scenario = AppointmentScenarioBuilder::new()
        .with_doctor_percentage(None)
        .seed(db.pool())
        .await
        .unwrap();

    let payment = service
        .record_payment(NewPayment::for_appointment(
            scenario.appointment_id,
            scenario.patient_id,
            money(dec!(500)),
            PaymentMethod::Cash,
            *TEST_DATE,
        ))
        .await
        .unwrap();

    assert_eq!(payment.split.doctor_share, money(dec!(250)));
    assert_eq!(payment.split.clinic_share, money(dec!(250)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_awkward_amount_split_sums_exactly() {
    let (db, service) = service().await;
    let scenario = AppointmentScenarioBuilder::new()
        .with_doctor_percentage(Some(dec!(37.5)))
        .seed(db.pool())
        .await
        .unwrap();

    let amount = MoneyFixtures::awkward_amount();
    let payment = service
        .record_payment(NewPayment::for_appointment(
            scenario.appointment_id,
            scenario.patient_id,
            amount,
            PaymentMethod::Check,
            *TEST_DATE,
        ))
        .await
        .unwrap();

    // 37.5% of 999.99 rounds; the clinic share is the exact remainder
    assert_money_eq(payment.split.doctor_share, dec!(375.00));
    assert_money_eq(payment.split.clinic_share, dec!(624.99));
    assert_eq!(payment.split.doctor_share + payment.split.clinic_share, amount);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_failed_payment_leaves_no_partial_state() {
    let (db, service) = service().await;
    let patient_id = seed_patient(db.pool(), "P").await.unwrap();

    // Unknown patient
    let result = service
        .record_payment(NewPayment::general(
            PatientId::new(999_999),
            money(dec!(100)),
            PaymentMethod::Cash,
            *TEST_DATE,
        ))
        .await;
    assert!(result.unwrap_err().is_not_found());

    // Unknown appointment for a real patient
    let result = service
        .record_payment(NewPayment::for_appointment(
            core_kernel::AppointmentId::new(999_999),
            patient_id,
            money(dec!(100)),
            PaymentMethod::Cash,
            *TEST_DATE,
        ))
        .await;
    assert!(result.unwrap_err().is_not_found());

    for table in ["payments", "financial_transactions", "accounts"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0, "expected no rows in {table}");
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_zero_amount_payment_rejected() {
    let (db, service) = service().await;
    let patient_id = seed_patient(db.pool(), "P").await.unwrap();

    let result = service
        .record_payment(NewPayment::general(
            patient_id,
            Money::zero(),
            PaymentMethod::Cash,
            *TEST_DATE,
        ))
        .await;

    assert!(result.is_err());
}

// ============================================================================
// Accounts and Postings
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_account_creation_yields_one_account() {
    let (_db, service) = service().await;

    let (a, b) = tokio::join!(
        service.get_or_create_account(AccountKind::Doctor, 7, "Dr. A"),
        service.get_or_create_account(AccountKind::Doctor, 7, "Dr. A"),
    );

    assert_eq!(a.unwrap(), b.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_holder_name_frozen_at_first_reference() {
    let (_db, service) = service().await;

    service
        .get_or_create_account(AccountKind::Patient, 3, "Original Name")
        .await
        .unwrap();
    service
        .get_or_create_account(AccountKind::Patient, 3, "Renamed")
        .await
        .unwrap();

    let statement = service
        .get_statement(AccountKind::Patient, 3)
        .await
        .unwrap();
    assert_eq!(statement.account.holder_name, "Original Name");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_postings_both_land() {
    let (_db, service) = service().await;

    let account = service
        .get_or_create_account(AccountKind::Doctor, 7, "Dr. A")
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        service.post_transaction(
            account,
            NewTransaction::new(TransactionKind::Credit, money(dec!(100)), "first"),
        ),
        service.post_transaction(
            account,
            NewTransaction::new(TransactionKind::Credit, money(dec!(200)), "second"),
        ),
    );
    a.unwrap();
    b.unwrap();

    let statement = service
        .get_statement(AccountKind::Doctor, 7)
        .await
        .unwrap();
    assert_eq!(statement.account.balance, money(dec!(300)));
    assert_eq!(statement.transactions.len(), 2);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_statement_is_most_recent_first() {
    let (_db, service) = service().await;

    let account = service
        .get_or_create_account(AccountKind::Supplier, 5, "MedSupply")
        .await
        .unwrap();

    let early = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    let late = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
    service
        .post_transaction(
            account,
            NewTransaction::new(TransactionKind::Credit, money(dec!(75)), "old invoice")
                .dated(early),
        )
        .await
        .unwrap();
    service
        .post_transaction(
            account,
            NewTransaction::new(TransactionKind::Credit, money(dec!(25)), "new invoice")
                .dated(late),
        )
        .await
        .unwrap();

    let statement = service
        .get_statement(AccountKind::Supplier, 5)
        .await
        .unwrap();
    assert_eq!(statement.transactions[0].description, "new invoice");
    assert_eq!(statement.transactions[1].description, "old invoice");
    assert_eq!(statement.account.balance, money(dec!(100)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_running_balance_matches_signed_replay() {
    let (_db, service) = service().await;

    let account = service
        .get_or_create_account(AccountKind::Doctor, 7, "Dr. A")
        .await
        .unwrap();
    let postings = [
        (TransactionKind::Credit, dec!(400)),
        (TransactionKind::Credit, dec!(160.50)),
        (TransactionKind::Withdrawal, dec!(60)),
    ];
    for (kind, amount) in postings {
        service
            .post_transaction(account, NewTransaction::new(kind, money(amount), "tx"))
            .await
            .unwrap();
    }

    let statement = service
        .get_statement(AccountKind::Doctor, 7)
        .await
        .unwrap();
    let replayed = service.replayed_balance(account).await.unwrap();
    assert_eq!(statement.account.balance, money(dec!(500.50)));
    assert_eq!(replayed, statement.account.balance);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_withdrawal_requires_existing_account() {
    let (_db, service) = service().await;

    let result = service
        .record_withdrawal(DoctorId::new(42), money(dec!(100)), *TEST_DATE, None)
        .await;

    assert!(result.unwrap_err().is_not_found());
}

// ============================================================================
// Summaries
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_doctor_summary_cross_checks_account_balance() {
    let (db, service) = service().await;
    let scenario = AppointmentScenarioBuilder::new()
        .with_doctor_percentage(Some(dec!(40)))
        .seed(db.pool())
        .await
        .unwrap();

    service
        .record_payment(NewPayment::for_appointment(
            scenario.appointment_id,
            scenario.patient_id,
            money(dec!(1000)),
            PaymentMethod::BankTransfer,
            *TEST_DATE,
        ))
        .await
        .unwrap();
    service
        .record_withdrawal(scenario.doctor_id, money(dec!(150)), *TEST_DATE, None)
        .await
        .unwrap();

    let summary = service.doctor_summary(scenario.doctor_id).await.unwrap();
    assert_eq!(summary.total_earnings, money(dec!(400)));
    assert_eq!(summary.total_withdrawn, money(dec!(150)));
    assert_eq!(summary.current_balance, money(dec!(250)));
    assert_eq!(summary.monthly_earnings.len(), 1);
    assert_eq!(summary.monthly_earnings[0].month, "2024-06");
    assert_eq!(summary.monthly_earnings[0].total, money(dec!(400)));

    // The payments-derived balance agrees with the account's running balance
    let statement = service
        .get_statement(AccountKind::Doctor, scenario.doctor_id.get())
        .await
        .unwrap();
    assert_eq!(statement.account.balance, summary.current_balance);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_patient_summary_tracks_outstanding() {
    let (db, service) = service().await;
    let scenario = AppointmentScenarioBuilder::new()
        .with_total_cost(money(dec!(1200)))
        .with_status("completed")
        .seed(db.pool())
        .await
        .unwrap();

    service
        .record_payment(NewPayment::for_appointment(
            scenario.appointment_id,
            scenario.patient_id,
            money(dec!(1000)),
            PaymentMethod::Cash,
            *TEST_DATE,
        ))
        .await
        .unwrap();

    let summary = service.patient_summary(scenario.patient_id).await.unwrap();
    assert_eq!(summary.total_cost, money(dec!(1200)));
    assert_eq!(summary.total_paid, money(dec!(1000)));
    assert_eq!(summary.outstanding, money(dec!(200)));
    assert_eq!(summary.status, "outstanding: 200.00");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_cancelled_payment_excluded_from_summaries() {
    let (db, service) = service().await;
    let scenario = AppointmentScenarioBuilder::new().seed(db.pool()).await.unwrap();

    let payment = service
        .record_payment(NewPayment::for_appointment(
            scenario.appointment_id,
            scenario.patient_id,
            money(dec!(1000)),
            PaymentMethod::Cash,
            *TEST_DATE,
        ))
        .await
        .unwrap();
    service
        .update_payment_status(payment.id, PaymentStatus::Cancelled)
        .await
        .unwrap();

    let patient = service.patient_summary(scenario.patient_id).await.unwrap();
    assert!(patient.total_paid.is_zero());

    let clinic = service.clinic_summary().await.unwrap();
    assert!(clinic.total_revenue.is_zero());

    // Already-posted ledger legs stay in place
    let statement = service
        .get_statement(AccountKind::Patient, scenario.patient_id.get())
        .await
        .unwrap();
    assert_eq!(statement.account.total_paid, money(dec!(1000)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_clinic_summary_nets_expenses_against_revenue() {
    let (db, service) = service().await;
    let scenario = AppointmentScenarioBuilder::new()
        .with_doctor_percentage(Some(dec!(40)))
        .seed(db.pool())
        .await
        .unwrap();

    service
        .record_payment(NewPayment::for_appointment(
            scenario.appointment_id,
            scenario.patient_id,
            money(dec!(1000)),
            PaymentMethod::Cash,
            *TEST_DATE,
        ))
        .await
        .unwrap();
    service
        .record_expense(
            NewExpense::new("rent", money(dec!(200)), *TEST_DATE)
                .with_description("June rent"),
        )
        .await
        .unwrap();

    let summary = service.clinic_summary().await.unwrap();
    assert_eq!(summary.total_revenue, money(dec!(600)));
    assert_eq!(summary.total_expenses, money(dec!(200)));
    assert_eq!(summary.net_profit, money(dec!(400)));
    assert_eq!(summary.monthly_revenue.len(), 1);
    assert_eq!(summary.monthly_revenue[0].total, money(dec!(600)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_supplier_summary_from_account_history() {
    let (_db, service) = service().await;

    let account = service
        .get_or_create_account(AccountKind::Supplier, 9, "MedSupply")
        .await
        .unwrap();
    service
        .post_transaction(
            account,
            NewTransaction::new(TransactionKind::Credit, money(dec!(800)), "invoice"),
        )
        .await
        .unwrap();
    service
        .post_transaction(
            account,
            NewTransaction::new(TransactionKind::Payment, money(dec!(300)), "settlement"),
        )
        .await
        .unwrap();

    let summary = service
        .supplier_summary(core_kernel::SupplierId::new(9))
        .await
        .unwrap();
    assert_eq!(summary.total_invoiced, money(dec!(800)));
    assert_eq!(summary.total_paid, money(dec!(300)));
    assert_eq!(summary.outstanding, money(dec!(500)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_accounts_overview_groups_by_kind() {
    let (_db, service) = service().await;

    service
        .get_or_create_account(AccountKind::Patient, 1, "P1")
        .await
        .unwrap();
    service
        .get_or_create_account(AccountKind::Patient, 2, "P2")
        .await
        .unwrap();
    let doctor = service
        .get_or_create_account(AccountKind::Doctor, 1, "D1")
        .await
        .unwrap();
    service
        .post_transaction(
            doctor,
            NewTransaction::new(TransactionKind::Credit, money(dec!(50)), "share"),
        )
        .await
        .unwrap();

    let overview = service.accounts_overview().await.unwrap();
    let patients = overview
        .iter()
        .find(|s| s.kind == AccountKind::Patient)
        .unwrap();
    assert_eq!(patients.accounts_count, 2);

    let doctors = overview
        .iter()
        .find(|s| s.kind == AccountKind::Doctor)
        .unwrap();
    assert_eq!(doctors.accounts_count, 1);
    assert_eq!(doctors.total_balance, money(dec!(50)));
}
