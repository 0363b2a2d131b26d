// src/validation.rs
use rust_decimal::Decimal;

use crate::error::AppError;

/// Money fields carry at most two fractional digits.
pub const MONEY_SCALE: u32 = 2;

/// Largest magnitude a NUMERIC(12, 2) column holds: 9,999,999,999.99
/// (mantissa 999_999_999_999 = 232 * 2^32 + 3_567_587_327).
pub const MAX_MONEY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, MONEY_SCALE);

/// Upper bound for any single bottle or quantity count.
pub const MAX_COUNT: i32 = 100_000;

pub fn money(field: &str, value: Decimal) -> Result<(), AppError> {
    if value.normalize().scale() > MONEY_SCALE {
        return Err(AppError::validation(format!(
            "{field} must have at most {MONEY_SCALE} decimal places"
        )));
    }
    if value.abs() > MAX_MONEY {
        return Err(AppError::validation(format!("{field} cannot exceed {MAX_MONEY}")));
    }
    Ok(())
}

pub fn non_negative_money(field: &str, value: Decimal) -> Result<(), AppError> {
    money(field, value)?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::validation(format!("{field} cannot be negative")));
    }
    Ok(())
}

pub fn positive_money(field: &str, value: Decimal) -> Result<(), AppError> {
    money(field, value)?;
    if value <= Decimal::ZERO {
        return Err(AppError::validation(format!("{field} must be greater than 0")));
    }
    Ok(())
}

pub fn non_negative_count(field: &str, value: i32) -> Result<(), AppError> {
    if value < 0 {
        return Err(AppError::validation(format!("{field} cannot be negative")));
    }
    if value > MAX_COUNT {
        return Err(AppError::validation(format!("{field} cannot exceed {MAX_COUNT}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn accepts_cents() {
        assert!(non_negative_money("cash_collected", dec!(12.50)).is_ok());
        assert!(non_negative_money("cash_collected", dec!(0)).is_ok());
        assert!(non_negative_money("cash_collected", dec!(12.500)).is_ok());
    }

    #[test]
    fn rejects_sub_cent_amounts() {
        assert!(money("actual_cash", dec!(1.005)).is_err());
    }

    #[test]
    fn rejects_negative_amounts_and_counts() {
        assert!(non_negative_money("actual_cash", dec!(-0.01)).is_err());
        assert!(positive_money("amount", dec!(0)).is_err());
        assert!(non_negative_count("filled_given", -1).is_err());
    }

    #[test]
    fn max_money_is_the_numeric_12_2_ceiling() {
        assert_eq!(MAX_MONEY, dec!(9999999999.99));
    }

    #[test]
    fn rejects_amounts_the_store_cannot_hold() {
        assert!(non_negative_money("actual_cash", dec!(9999999999.99)).is_ok());
        assert!(non_negative_money("actual_cash", dec!(100000000000)).is_err());
        assert!(money("adjustment_amount", dec!(-10000000000)).is_err());

        let err = non_negative_money("cash_collected", dec!(100000000000.00)).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn rejects_counts_above_the_bound() {
        assert!(non_negative_count("filled_given", MAX_COUNT).is_ok());
        assert!(non_negative_count("filled_given", MAX_COUNT + 1).is_err());
        assert!(non_negative_count("filled_given", i32::MAX).is_err());
    }
}
