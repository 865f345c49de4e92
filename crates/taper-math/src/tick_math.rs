//! Conversions between ticks and Q64.64 sqrt prices.
//!
//! A tick `t` indexes the price `1.0001^t`; the pool works in `sqrt(price)`
//! scaled by 2^64. Conversion uses binary decomposition over pre-computed
//! powers `floor(sqrt(1.0001)^(2^i) * 2^64)`, with the reciprocal taken for
//! negative ticks.

use ethnum::U256;

use crate::constants::{MAX_SQRT_PRICE_X64, MAX_TICK, MIN_SQRT_PRICE_X64, MIN_TICK, Q64};
use crate::errors::{MathError, MathResult};
use crate::mul_div::{mul_div, to_u128, Rounding};

/// `floor(sqrt(1.0001)^(2^i) * 2^64)` for `i = 0..=18`.
///
/// 19 entries cover every admissible `|tick| <= MAX_TICK < 2^19`.
const SQRT_1_0001_POWERS: [u128; 19] = [
    18_447_666_387_855_959_850,
    18_448_588_748_116_922_571,
    18_450_433_606_991_734_263,
    18_454_123_878_217_468_680,
    18_461_506_635_090_006_701,
    18_476_281_010_653_910_144,
    18_505_865_242_158_250_041,
    18_565_175_891_880_433_522,
    18_684_368_066_214_940_582,
    18_925_053_041_275_764_671,
    19_415_764_168_677_886_926,
    20_435_687_552_633_177_494,
    22_639_080_592_224_303_007,
    27_784_196_929_998_399_742,
    41_848_122_137_994_986_128,
    94_936_283_578_220_370_716,
    488_590_176_327_622_479_860,
    12_941_056_668_319_229_769_860,
    9_078_618_265_828_848_800_676_189,
];

/// Returns the Q64.64 sqrt price at `tick`.
pub fn get_sqrt_price_at_tick(tick: i32) -> MathResult<u128> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::InvalidTick);
    }

    let abs_tick = tick.unsigned_abs();
    let mut ratio = Q64;
    for (i, power) in SQRT_1_0001_POWERS.iter().enumerate() {
        if abs_tick & (1u32 << i) != 0 {
            ratio = mul_shift(ratio, *power)?;
        }
    }

    if tick < 0 {
        ratio = reciprocal_x64(ratio)?;
    }
    Ok(ratio)
}

/// Returns the floor tick for a sqrt price: the greatest `t` with
/// `get_sqrt_price_at_tick(t) <= sqrt_price_x64`.
pub fn get_tick_at_sqrt_price(sqrt_price_x64: u128) -> MathResult<i32> {
    if !(MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&sqrt_price_x64) {
        return Err(MathError::InvalidPrice);
    }

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;
    while low <= high {
        let mid = low + (high - low) / 2;
        let price = get_sqrt_price_at_tick(mid)?;
        match price.cmp(&sqrt_price_x64) {
            std::cmp::Ordering::Equal => return Ok(mid),
            std::cmp::Ordering::Less => low = mid + 1,
            std::cmp::Ordering::Greater => high = mid - 1,
        }
    }
    Ok(high)
}

/// Greatest spacing-aligned tick `<= tick`.
pub fn snap_tick_down(tick: i32, tick_spacing: i32) -> i32 {
    tick - tick.rem_euclid(tick_spacing)
}

/// Smallest spacing-aligned tick `>= tick`.
pub fn snap_tick_up(tick: i32, tick_spacing: i32) -> i32 {
    let down = snap_tick_down(tick, tick_spacing);
    if down == tick {
        tick
    } else {
        down + tick_spacing
    }
}

/// Lowest spacing-aligned tick a position may use.
pub fn min_usable_tick(tick_spacing: i32) -> i32 {
    (MIN_TICK / tick_spacing) * tick_spacing
}

/// Highest spacing-aligned tick a position may use.
pub fn max_usable_tick(tick_spacing: i32) -> i32 {
    (MAX_TICK / tick_spacing) * tick_spacing
}

/// `floor(a * b / 2^64)`.
fn mul_shift(a: u128, b: u128) -> MathResult<u128> {
    to_u128(mul_div(
        U256::from(a),
        U256::from(b),
        U256::from(Q64),
        Rounding::Down,
    )?)
}

/// `floor(2^128 / value)`.
fn reciprocal_x64(value: u128) -> MathResult<u128> {
    if value == 0 {
        return Err(MathError::DivisionByZero);
    }
    let numerator = U256::from(Q64)
        .checked_mul(U256::from(Q64))
        .ok_or(MathError::Overflow)?;
    to_u128(numerator / U256::from(value))
}
