use bigdecimal::BigDecimal;
use std::fmt;

use crate::domain::Transaction;

/// Integer digits available in a `NUMERIC(10, 2)` column.
pub const AMOUNT_INTEGER_DIGITS: u32 = 8;
/// Fractional digits kept by the amount column.
pub const AMOUNT_FRACTION_DIGITS: i64 = 2;
/// Largest decimal exponent, in either direction, accepted for an amount.
pub const AMOUNT_MAX_EXPONENT: i64 = 18;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

/// Must run before any arithmetic or comparison on a caller-supplied amount.
pub fn validate_amount_exponent(amount: &BigDecimal) -> ValidationResult {
    let (_, scale) = amount.as_bigint_and_exponent();
    if scale.abs() > AMOUNT_MAX_EXPONENT {
        return Err(ValidationError::new(
            "amount",
            format!("exponent must be within +/-{}", AMOUNT_MAX_EXPONENT),
        ));
    }

    Ok(())
}

pub fn validate_amount_precision(amount: &BigDecimal) -> ValidationResult {
    validate_amount_exponent(amount)?;

    if amount.with_scale(AMOUNT_FRACTION_DIGITS) != *amount {
        return Err(ValidationError::new(
            "amount",
            format!("must have at most {} fractional digits", AMOUNT_FRACTION_DIGITS),
        ));
    }

    Ok(())
}

/// Rejects amounts whose integer part does not fit the amount column.
pub fn validate_amount_range(amount: &BigDecimal) -> ValidationResult {
    validate_amount_exponent(amount)?;

    let limit = BigDecimal::from(10u64.pow(AMOUNT_INTEGER_DIGITS));
    if amount.abs() >= limit {
        return Err(ValidationError::new(
            "amount",
            format!("must be smaller than {} in absolute value", limit),
        ));
    }

    Ok(())
}

pub fn validate_transaction(tx: &Transaction) -> ValidationResult {
    validate_required("id", &tx.id)?;
    validate_required("vendor", &tx.vendor)?;
    validate_amount_precision(&tx.amount)?;
    validate_amount_range(&tx.amount)?;

    Ok(())
}
