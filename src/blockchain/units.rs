//! Native-token amount parsing and formatting.
//!
//! One NEW is 10^18 ISAAC (the base unit).

use alloy::primitives::U256;
use std::str::FromStr;
use thiserror::Error;

const DECIMALS: usize = 18;

/// Upper bound on a single amount: 100,000,000,000 NEW.
pub fn max_amount() -> U256 {
    U256::from(100_000_000_000u64) * U256::from(10u64).pow(U256::from(DECIMALS))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("illegal unit: {0}")]
    IllegalUnit(String),

    #[error("illegal amount: {0}")]
    IllegalAmount(String),

    #[error("amount cannot be negative")]
    Negative,

    #[error("amount exceeds the maximum of 100000000000 NEW")]
    ExceedsMax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    New,
    Isaac,
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Unit::New),
            "ISAAC" => Ok(Unit::Isaac),
            other => Err(UnitError::IllegalUnit(other.to_string())),
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::New => write!(f, "NEW"),
            Unit::Isaac => write!(f, "ISAAC"),
        }
    }
}

fn parse_digits(digits: &str, original: &str) -> Result<U256, UnitError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UnitError::IllegalAmount(original.to_string()));
    }
    U256::from_str_radix(digits, 10).map_err(|_| UnitError::IllegalAmount(original.to_string()))
}

/// Parse a decimal amount in `unit` into ISAAC.
pub fn parse_amount(amount: &str, unit: Unit) -> Result<U256, UnitError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Ok(U256::ZERO);
    }
    if amount.starts_with('-') {
        return Err(UnitError::Negative);
    }

    let value = match unit {
        Unit::Isaac => parse_digits(amount, amount)?,
        Unit::New => {
            let (int_part, dec_part) = match amount.split_once('.') {
                Some((i, d)) => (if i.is_empty() { "0" } else { i }, d),
                None => (amount, ""),
            };
            if dec_part.len() > DECIMALS {
                return Err(UnitError::IllegalAmount(amount.to_string()));
            }
            let zeros = "0".repeat(DECIMALS - dec_part.len());
            let padded = format!("{int_part}{dec_part}{zeros}");
            parse_digits(&padded, amount)?
        }
    };

    if value > max_amount() {
        return Err(UnitError::ExceedsMax);
    }
    Ok(value)
}

/// Render an ISAAC amount in `unit` without a unit suffix.
///
/// `1000000000` ISAAC renders as `0.000000001` NEW; trailing zeros in the
/// fractional part are dropped.
pub fn format_amount(amount: U256, unit: Unit) -> String {
    let digits = amount.to_string();
    match unit {
        Unit::Isaac => digits,
        Unit::New => {
            let (int_part, dec_part) = if digits.len() <= DECIMALS {
                ("0".to_string(), format!("{}{}", "0".repeat(DECIMALS - digits.len()), digits))
            } else {
                let split = digits.len() - DECIMALS;
                (digits[..split].to_string(), digits[split..].to_string())
            };
            let dec_part = dec_part.trim_end_matches('0');
            if dec_part.is_empty() {
                int_part
            } else {
                format!("{}.{}", int_part, dec_part)
            }
        }
    }
}

/// Render with a unit suffix, choosing ISAAC for amounts below one NEW when
/// no unit is given.
pub fn format_with_unit(amount: U256, unit: Option<Unit>) -> String {
    let unit = unit.unwrap_or_else(|| {
        if amount.to_string().len() <= DECIMALS {
            Unit::Isaac
        } else {
            Unit::New
        }
    });
    format!("{} {}", format_amount(amount, unit), unit)
}
