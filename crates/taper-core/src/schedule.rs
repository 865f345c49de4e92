//! Schedule evaluation: pure functions from an epoch-floored timestamp to
//! the target cumulative amount and the target floor tick.

use ethnum::U256;

use taper_math::{mul_div, Rounding};

use crate::config::BootstrapConfig;
use crate::errors::{EngineError, EngineResult};

/// Floors a timestamp to its epoch boundary.
pub fn floor_epoch(timestamp: u64, epoch_size: u64) -> u64 {
    (timestamp / epoch_size) * epoch_size
}

/// Cumulative amount scheduled for commitment through time `t`:
/// `total * (t - start) / (end - start)`, saturating at `total` after the
/// window. The product is widened to 256 bits (u32 interval times u128
/// amount).
pub fn target_amount(config: &BootstrapConfig, t: u64) -> EngineResult<u128> {
    let start = u64::from(config.start_time);
    let end = u64::from(config.end_time);
    if t >= end {
        return Ok(config.total_amount);
    }
    if t < start {
        return Err(EngineError::BeforeStartTime);
    }

    let scaled = mul_div(
        U256::from(u128::from(t - start)),
        U256::from(config.total_amount),
        U256::from(u128::from(end - start)),
        Rounding::Down,
    )?;
    // bounded by total_amount, so the narrowing cannot fail
    Ok(taper_math::mul_div::to_u128(scaled)?)
}

/// Target floor tick at time `t`: `max - (t - start) * (max - min) / (end -
/// start)`, truncated toward zero, reaching `min` at the end of the window.
///
/// Anchoring at `max` keeps the endpoints exact: the floor starts at
/// `max_tick` and lands on `min_tick` with no residual rounding.
pub fn target_min_tick(config: &BootstrapConfig, t: u64) -> EngineResult<i32> {
    let start = u64::from(config.start_time);
    let end = u64::from(config.end_time);
    if t >= end {
        return Ok(config.min_tick);
    }
    if t < start {
        return Err(EngineError::BeforeStartTime);
    }

    // 32-bit interval times 25-bit tick range: i128 is ample
    let elapsed = (t - start) as i128;
    let range = i128::from(config.max_tick) - i128::from(config.min_tick);
    let duration = (end - start) as i128;
    let delta = elapsed * range / duration;
    Ok(config.max_tick - delta as i32)
}
