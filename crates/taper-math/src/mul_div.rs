//! Full-precision multiply-then-divide over 256-bit intermediates.

use ethnum::U256;

use crate::errors::{MathError, MathResult};

/// Rounding direction for divisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round toward zero.
    Down,
    /// Round away from zero.
    Up,
}

/// Computes `a * b / denominator` without intermediate truncation.
pub fn mul_div(a: U256, b: U256, denominator: U256, rounding: Rounding) -> MathResult<U256> {
    if denominator == U256::ZERO {
        return Err(MathError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(MathError::Overflow)?;
    let quotient = product / denominator;
    match rounding {
        Rounding::Down => Ok(quotient),
        Rounding::Up => {
            if product % denominator == U256::ZERO {
                Ok(quotient)
            } else {
                quotient.checked_add(U256::ONE).ok_or(MathError::Overflow)
            }
        }
    }
}

/// `mul_div` over `u128` operands with a checked narrowing of the result.
pub fn mul_div_u128(a: u128, b: u128, denominator: u128, rounding: Rounding) -> MathResult<u128> {
    let quotient = mul_div(
        U256::from(a),
        U256::from(b),
        U256::from(denominator),
        rounding,
    )?;
    to_u128(quotient)
}

/// Narrows a `U256` to `u128`, failing instead of truncating.
pub fn to_u128(value: U256) -> MathResult<u128> {
    if value > U256::from(u128::MAX) {
        return Err(MathError::Conversion);
    }
    Ok(value.as_u128())
}
