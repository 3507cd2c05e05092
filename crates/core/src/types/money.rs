//! Monetary amounts.
//!
//! Amounts are plain [`Decimal`] values in the store's currency (INR). There
//! is no multi-currency support; the only rule shared by catalog prices and
//! order totals is that they must be strictly positive.

use rust_decimal::Decimal;

/// Errors for amounts that must be strictly positive.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The amount is zero or negative.
    #[error("{field} must be greater than zero (got {value})")]
    NotPositive {
        /// Which field was rejected.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },
}

/// Check that `value` is strictly positive.
///
/// # Errors
///
/// Returns [`AmountError::NotPositive`] naming `field` otherwise.
pub fn ensure_positive(field: &'static str, value: Decimal) -> Result<Decimal, AmountError> {
    if value > Decimal::ZERO {
        Ok(value)
    } else {
        Err(AmountError::NotPositive { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_positive() {
        assert_eq!(ensure_positive("price", Decimal::new(4999, 2)), Ok(Decimal::new(4999, 2)));
        assert!(ensure_positive("price", Decimal::ZERO).is_err());
        assert_eq!(
            ensure_positive("totalAmount", Decimal::NEGATIVE_ONE),
            Err(AmountError::NotPositive {
                field: "totalAmount",
                value: Decimal::NEGATIVE_ONE
            })
        );
    }
}
