//! Custom Test Assertions
//!
//! Assertion helpers for domain types that give more meaningful error
//! messages than standard assertions.

use core_kernel::Money;
use rust_decimal::Decimal;

/// Asserts that a Money value equals the given decimal amount
///
/// # Panics
///
/// Panics with both values when they differ
pub fn assert_money_eq(actual: Money, expected: Decimal) {
    assert_eq!(
        actual,
        Money::new(expected),
        "Money mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: Money) {
    assert!(money.is_positive(), "Expected positive money, got {}", money);
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: Money) {
    assert!(money.is_zero(), "Expected zero money, got {}", money);
}
