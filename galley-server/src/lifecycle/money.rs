//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic is done on `Decimal` internally, then converted to `f64`
//! for storage/serialization (2 decimal places, half-up).

use rust_decimal::prelude::*;
use shared::models::OrderItemCreate;
use shared::{AppError, AppResult, ErrorCode};

/// Rounding for monetary values (2 decimal places)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per item
const MAX_QUANTITY: i32 = 999;

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or(Decimal::ZERO)
}

fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp(DECIMAL_PLACES)
        .to_f64()
        .unwrap_or(0.0)
}

/// Line total for a single item
pub fn line_total(unit_price: f64, quantity: i32) -> f64 {
    to_f64(to_decimal(unit_price) * Decimal::from(quantity))
}

/// Order total over validated items
pub fn order_total(items: &[OrderItemCreate]) -> f64 {
    let sum = items
        .iter()
        .map(|i| to_decimal(i.unit_price) * Decimal::from(i.quantity))
        .sum::<Decimal>();
    to_f64(sum)
}

/// Validate line items before they reach the state machine
pub fn validate_items(items: &[OrderItemCreate]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    for item in items {
        if !item.unit_price.is_finite() || item.unit_price < 0.0 || item.unit_price > MAX_PRICE {
            return Err(AppError::validation(format!(
                "unit_price out of range for '{}': {}",
                item.name, item.unit_price
            )));
        }
        if item.quantity < 1 || item.quantity > MAX_QUANTITY {
            return Err(AppError::validation(format!(
                "quantity out of range for '{}': {}",
                item.name, item.quantity
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, quantity: i32, unit_price: f64) -> OrderItemCreate {
        OrderItemCreate {
            name: name.to_string(),
            quantity,
            unit_price,
            note: None,
        }
    }

    #[test]
    fn test_line_total_rounds_to_cents() {
        assert_eq!(line_total(3.333, 3), 10.0); // 9.999 -> 10.00
        assert_eq!(line_total(2.5, 2), 5.0);
    }

    #[test]
    fn test_order_total_sums_before_rounding() {
        // 0.333 * 3 items of qty 1 = 0.999 -> 1.00, not 3 * 0.33 = 0.99
        let items = vec![item("a", 1, 0.333), item("b", 1, 0.333), item("c", 1, 0.333)];
        assert_eq!(order_total(&items), 1.0);
    }

    #[test]
    fn test_validate_rejects_empty() {
        let err = validate_items(&[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderEmpty);
    }

    #[test]
    fn test_validate_rejects_nan_price() {
        let err = validate_items(&[item("soup", 1, f64::NAN)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let err = validate_items(&[item("soup", 0, 4.5)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
