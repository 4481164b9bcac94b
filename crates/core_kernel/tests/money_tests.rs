//! Integration tests for Money and Rate

use core_kernel::{Money, MoneyError, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn test_money_serialization_is_transparent() {
    let m = Money::new(dec!(150.25));
    let json = serde_json::to_string(&m).unwrap();
    assert_eq!(json, "\"150.25\"");

    let back: Money = serde_json::from_str(&json).unwrap();
    assert_eq!(back, m);
}

#[test]
fn test_money_display() {
    assert_eq!(Money::new(dec!(1000)).to_string(), "1000.00");
    assert_eq!(Money::new(dec!(-3.5)).to_string(), "-3.50");
}

#[test]
fn test_money_ordering() {
    let small = Money::new(dec!(10));
    let large = Money::new(dec!(20));
    assert!(small < large);
    assert_eq!(small.max(large), large);
}

#[test]
fn test_checked_add_overflow() {
    let max = Money::new(Decimal::MAX);
    let result = max.checked_add(&Money::new(Decimal::MAX));
    assert_eq!(result, Err(MoneyError::Overflow));
}

#[test]
fn test_rate_zero_and_full() {
    let amount = Money::new(dec!(500));

    assert_eq!(Rate::from_percentage(dec!(0)).apply(&amount), Money::zero());
    assert_eq!(Rate::from_percentage(dec!(100)).apply(&amount), amount);
}

#[test]
fn test_rate_rounds_to_cents() {
    // 33.33% of 100 rounds to a representable amount
    let share = Rate::from_percentage(dec!(33.33)).apply(&Money::new(dec!(100)));
    assert_eq!(share.amount(), dec!(33.33));

    // A third of 0.10 cannot be represented exactly; rounding applies
    let tiny = Rate::from_percentage(dec!(33.33)).apply(&Money::new(dec!(0.10)));
    assert_eq!(tiny.amount(), dec!(0.03));
}
