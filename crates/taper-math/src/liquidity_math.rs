//! Conversions between liquidity units and token amounts over a price range,
//! plus the per-step price update used by the swap engine.
//!
//! Rounding always goes against the party whose balance would otherwise be
//! flattered: amounts charged round up, amounts paid out round down.

use ethnum::U256;

use crate::constants::Q64;
use crate::errors::{MathError, MathResult};
use crate::mul_div::{mul_div, to_u128, Rounding};

/// Amount of token0 moved across `[sqrt_a, sqrt_b]` by `liquidity` units.
///
/// `delta0 = (liquidity << 64) * (sqrt_b - sqrt_a) / (sqrt_b * sqrt_a)`
pub fn get_amount_0_delta(
    sqrt_ratio_a_x64: u128,
    sqrt_ratio_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> MathResult<u128> {
    let (sqrt_a, sqrt_b) = sorted(sqrt_ratio_a_x64, sqrt_ratio_b_x64);
    if sqrt_a == 0 {
        return Err(MathError::InvalidPrice);
    }

    let numerator1 = U256::from(liquidity)
        .checked_mul(U256::from(Q64))
        .ok_or(MathError::Overflow)?;
    let numerator2 = U256::from(sqrt_b - sqrt_a);
    let denominator = U256::from(sqrt_b)
        .checked_mul(U256::from(sqrt_a))
        .ok_or(MathError::Overflow)?;

    to_u128(mul_div(numerator1, numerator2, denominator, rounding(round_up))?)
}

/// Amount of token1 moved across `[sqrt_a, sqrt_b]` by `liquidity` units.
///
/// `delta1 = liquidity * (sqrt_b - sqrt_a) / 2^64`
pub fn get_amount_1_delta(
    sqrt_ratio_a_x64: u128,
    sqrt_ratio_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> MathResult<u128> {
    let (sqrt_a, sqrt_b) = sorted(sqrt_ratio_a_x64, sqrt_ratio_b_x64);
    to_u128(mul_div(
        U256::from(liquidity),
        U256::from(sqrt_b - sqrt_a),
        U256::from(Q64),
        rounding(round_up),
    )?)
}

/// Largest liquidity fundable by `amount0` of token0 across `[sqrt_a, sqrt_b]`.
pub fn get_liquidity_for_amount_0(
    sqrt_ratio_a_x64: u128,
    sqrt_ratio_b_x64: u128,
    amount0: u128,
) -> MathResult<u128> {
    let (sqrt_a, sqrt_b) = sorted(sqrt_ratio_a_x64, sqrt_ratio_b_x64);
    if sqrt_a == 0 {
        return Err(MathError::InvalidPrice);
    }
    if sqrt_a == sqrt_b {
        return Err(MathError::DivisionByZero);
    }

    let intermediate = mul_div(
        U256::from(sqrt_a),
        U256::from(sqrt_b),
        U256::from(Q64),
        Rounding::Down,
    )?;
    to_u128(mul_div(
        U256::from(amount0),
        intermediate,
        U256::from(sqrt_b - sqrt_a),
        Rounding::Down,
    )?)
}

/// Largest liquidity fundable by `amount1` of token1 across `[sqrt_a, sqrt_b]`.
pub fn get_liquidity_for_amount_1(
    sqrt_ratio_a_x64: u128,
    sqrt_ratio_b_x64: u128,
    amount1: u128,
) -> MathResult<u128> {
    let (sqrt_a, sqrt_b) = sorted(sqrt_ratio_a_x64, sqrt_ratio_b_x64);
    if sqrt_a == sqrt_b {
        return Err(MathError::DivisionByZero);
    }
    mul_div_amount(amount1, Q64, sqrt_b - sqrt_a)
}

/// Token amounts currently backing `liquidity` across `[sqrt_a, sqrt_b]` at
/// the given pool price.
pub fn get_amounts_for_liquidity(
    sqrt_price_x64: u128,
    sqrt_ratio_a_x64: u128,
    sqrt_ratio_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> MathResult<(u128, u128)> {
    let (sqrt_a, sqrt_b) = sorted(sqrt_ratio_a_x64, sqrt_ratio_b_x64);

    if sqrt_price_x64 <= sqrt_a {
        Ok((get_amount_0_delta(sqrt_a, sqrt_b, liquidity, round_up)?, 0))
    } else if sqrt_price_x64 < sqrt_b {
        Ok((
            get_amount_0_delta(sqrt_price_x64, sqrt_b, liquidity, round_up)?,
            get_amount_1_delta(sqrt_a, sqrt_price_x64, liquidity, round_up)?,
        ))
    } else {
        Ok((0, get_amount_1_delta(sqrt_a, sqrt_b, liquidity, round_up)?))
    }
}

/// Next sqrt price after swapping `amount_in` into `liquidity` at
/// `sqrt_price_x64`, rounding against the swapper.
pub fn get_next_sqrt_price_from_input(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount_in: u128,
    zero_for_one: bool,
) -> MathResult<u128> {
    if amount_in == 0 || liquidity == 0 {
        return Ok(sqrt_price_x64);
    }
    if zero_for_one {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_price_x64, liquidity, amount_in)
    } else {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_price_x64, liquidity, amount_in)
    }
}

/// `sqrt' = liquidity * sqrt * 2^64 / (liquidity * 2^64 + amount * sqrt)`,
/// rounded up so the pool never undercharges token0 input.
fn get_next_sqrt_price_from_amount_0_rounding_up(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount: u128,
) -> MathResult<u128> {
    let numerator1 = U256::from(sqrt_price_x64)
        .checked_mul(U256::from(liquidity))
        .ok_or(MathError::Overflow)?;
    let product = U256::from(amount)
        .checked_mul(U256::from(sqrt_price_x64))
        .ok_or(MathError::Overflow)?;
    let denominator = U256::from(liquidity)
        .checked_mul(U256::from(Q64))
        .ok_or(MathError::Overflow)?
        .checked_add(product)
        .ok_or(MathError::Overflow)?;

    to_u128(mul_div(numerator1, U256::from(Q64), denominator, Rounding::Up)?)
}

/// `sqrt' = sqrt + amount * 2^64 / liquidity`, rounded down so the pool
/// never overcredits the price move for token1 input.
fn get_next_sqrt_price_from_amount_1_rounding_down(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount: u128,
) -> MathResult<u128> {
    let quotient = mul_div_amount(amount, Q64, liquidity)?;
    sqrt_price_x64
        .checked_add(quotient)
        .ok_or(MathError::Overflow)
}

fn mul_div_amount(a: u128, b: u128, denominator: u128) -> MathResult<u128> {
    to_u128(mul_div(
        U256::from(a),
        U256::from(b),
        U256::from(denominator),
        Rounding::Down,
    )?)
}

fn sorted(a: u128, b: u128) -> (u128, u128) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

fn rounding(round_up: bool) -> Rounding {
    if round_up {
        Rounding::Up
    } else {
        Rounding::Down
    }
}
