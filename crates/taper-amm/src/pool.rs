//! Pool state: price, active liquidity, the initialized-tick table, position
//! accounting, and the tick-crossing swap engine.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use taper_math::liquidity_math::{
    get_amount_0_delta, get_amount_1_delta, get_next_sqrt_price_from_input,
};
use taper_math::tick_math::{
    get_sqrt_price_at_tick, get_tick_at_sqrt_price, max_usable_tick, min_usable_tick,
};
use taper_math::{MathError, MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64};

use crate::errors::AmmError;
use crate::types::{AccountId, BalanceDelta, ModifyParams, PoolKey, Slot0, SwapOutcome, SwapParams};

/// Net/gross liquidity bookkeeping at an initialized tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInfo {
    /// Total liquidity referencing this tick as a bound.
    pub liquidity_gross: u128,
    /// Liquidity added when the tick is crossed left-to-right.
    pub liquidity_net: i128,
}

#[derive(Debug, Clone)]
pub struct PoolState {
    pub key: PoolKey,
    pub sqrt_price_x64: u128,
    pub tick: i32,
    /// Liquidity active at the current tick.
    pub liquidity: u128,
    ticks: BTreeMap<i32, TickInfo>,
    positions: HashMap<(AccountId, i32, i32), u128>,
}

impl PoolState {
    pub fn new(key: PoolKey, sqrt_price_x64: u128) -> Result<Self, AmmError> {
        let tick = get_tick_at_sqrt_price(sqrt_price_x64)?;
        Ok(Self {
            key,
            sqrt_price_x64,
            tick,
            liquidity: 0,
            ticks: BTreeMap::new(),
            positions: HashMap::new(),
        })
    }

    pub fn slot0(&self) -> Slot0 {
        Slot0 {
            sqrt_price_x64: self.sqrt_price_x64,
            tick: self.tick,
        }
    }

    pub fn position(&self, owner: AccountId, tick_lower: i32, tick_upper: i32) -> u128 {
        self.positions
            .get(&(owner, tick_lower, tick_upper))
            .copied()
            .unwrap_or(0)
    }

    /// Applies a liquidity change to `owner`'s position at the given range
    /// and returns the token deltas it produces.
    pub fn modify_position(
        &mut self,
        owner: AccountId,
        params: &ModifyParams,
    ) -> Result<BalanceDelta, AmmError> {
        let ModifyParams {
            tick_lower,
            tick_upper,
            liquidity_delta,
        } = *params;
        self.check_ticks(tick_lower, tick_upper)?;
        if liquidity_delta == 0 {
            return Ok(BalanceDelta::default());
        }

        // position accounting
        let slot = self.positions.entry((owner, tick_lower, tick_upper)).or_default();
        *slot = slot
            .checked_add_signed(liquidity_delta)
            .ok_or(AmmError::LiquidityUnderflow)?;
        if *slot == 0 {
            self.positions.remove(&(owner, tick_lower, tick_upper));
        }

        // tick table
        self.update_tick(tick_lower, liquidity_delta, false)?;
        self.update_tick(tick_upper, liquidity_delta, true)?;

        // token amounts by price region, rounded against the caller
        let round_up = liquidity_delta > 0;
        let magnitude = liquidity_delta.unsigned_abs();
        let sqrt_lower = get_sqrt_price_at_tick(tick_lower)?;
        let sqrt_upper = get_sqrt_price_at_tick(tick_upper)?;

        let (amount0, amount1) = if self.tick < tick_lower {
            (
                get_amount_0_delta(sqrt_lower, sqrt_upper, magnitude, round_up)?,
                0,
            )
        } else if self.tick < tick_upper {
            self.liquidity = self
                .liquidity
                .checked_add_signed(liquidity_delta)
                .ok_or(AmmError::LiquidityUnderflow)?;
            (
                get_amount_0_delta(self.sqrt_price_x64, sqrt_upper, magnitude, round_up)?,
                get_amount_1_delta(sqrt_lower, self.sqrt_price_x64, magnitude, round_up)?,
            )
        } else {
            (
                0,
                get_amount_1_delta(sqrt_lower, sqrt_upper, magnitude, round_up)?,
            )
        };

        signed_delta(amount0, amount1, liquidity_delta > 0)
    }

    /// Exact-input swap bounded by a √price limit. Walks initialized ticks in
    /// the swap direction, jumping zero-liquidity gaps outright.
    pub fn swap(&mut self, params: &SwapParams) -> Result<(SwapOutcome, BalanceDelta), AmmError> {
        let SwapParams {
            zero_for_one,
            amount_in,
            sqrt_price_limit_x64: limit,
        } = *params;

        if zero_for_one {
            if limit >= self.sqrt_price_x64 || limit < MIN_SQRT_PRICE_X64 {
                return Err(AmmError::InvalidPriceLimit);
            }
        } else if limit <= self.sqrt_price_x64 || limit > MAX_SQRT_PRICE_X64 {
            return Err(AmmError::InvalidPriceLimit);
        }

        let mut remaining = amount_in;
        let mut amount_out: u128 = 0;

        while remaining > 0 && self.sqrt_price_x64 != limit {
            let next_initialized = if zero_for_one {
                self.ticks.range(..=self.tick).next_back().map(|(t, _)| *t)
            } else {
                self.ticks.range(self.tick + 1..).next().map(|(t, _)| *t)
            };
            let boundary_price = match next_initialized {
                Some(t) => Some(get_sqrt_price_at_tick(t)?),
                None => None,
            };
            let target = match boundary_price {
                Some(b) if zero_for_one => b.max(limit),
                Some(b) => b.min(limit),
                None => limit,
            };

            if self.liquidity == 0 {
                // nothing to trade against until the next boundary
                self.sqrt_price_x64 = target;
            } else {
                let unconstrained = get_next_sqrt_price_from_input(
                    self.sqrt_price_x64,
                    self.liquidity,
                    remaining,
                    zero_for_one,
                )?;
                let next = if zero_for_one {
                    unconstrained.max(target)
                } else {
                    unconstrained.min(target)
                };

                let step_in = if next == target {
                    if zero_for_one {
                        get_amount_0_delta(next, self.sqrt_price_x64, self.liquidity, true)?
                    } else {
                        get_amount_1_delta(self.sqrt_price_x64, next, self.liquidity, true)?
                    }
                } else {
                    // the full remaining input fits inside this segment
                    remaining
                };
                let step_out = if zero_for_one {
                    get_amount_1_delta(next, self.sqrt_price_x64, self.liquidity, false)?
                } else {
                    get_amount_0_delta(self.sqrt_price_x64, next, self.liquidity, false)?
                };

                remaining = remaining.saturating_sub(step_in);
                amount_out = amount_out
                    .checked_add(step_out)
                    .ok_or(MathError::Overflow)?;
                self.sqrt_price_x64 = next;
            }

            // cross the boundary, or re-derive the tick from the price
            if let (Some(boundary), Some(boundary_price)) = (next_initialized, boundary_price) {
                if self.sqrt_price_x64 == boundary_price {
                    let net = self
                        .ticks
                        .get(&boundary)
                        .map(|info| info.liquidity_net)
                        .unwrap_or(0);
                    if zero_for_one {
                        self.liquidity = self
                            .liquidity
                            .checked_add_signed(net.checked_neg().ok_or(MathError::Overflow)?)
                            .ok_or(AmmError::LiquidityUnderflow)?;
                        self.tick = boundary - 1;
                    } else {
                        self.liquidity = self
                            .liquidity
                            .checked_add_signed(net)
                            .ok_or(AmmError::LiquidityUnderflow)?;
                        self.tick = boundary;
                    }
                    continue;
                }
            }
            self.tick = get_tick_at_sqrt_price(self.sqrt_price_x64)?;
        }

        let amount_in_used = amount_in - remaining;
        let outcome = SwapOutcome {
            amount_in_used,
            amount_out,
            sqrt_price_after_x64: self.sqrt_price_x64,
            tick_after: self.tick,
        };
        let delta = signed_swap_delta(amount_in_used, amount_out, zero_for_one)?;
        Ok((outcome, delta))
    }

    fn check_ticks(&self, tick_lower: i32, tick_upper: i32) -> Result<(), AmmError> {
        if tick_lower >= tick_upper {
            return Err(AmmError::InvalidTickRange);
        }
        let spacing = self.key.tick_spacing;
        if tick_lower < min_usable_tick(spacing) || tick_upper > max_usable_tick(spacing) {
            return Err(AmmError::InvalidTickRange);
        }
        for tick in [tick_lower, tick_upper] {
            if tick.rem_euclid(spacing) != 0 {
                return Err(AmmError::MisalignedTick(tick));
            }
        }
        Ok(())
    }

    fn update_tick(
        &mut self,
        tick: i32,
        liquidity_delta: i128,
        is_upper: bool,
    ) -> Result<(), AmmError> {
        let info = self.ticks.entry(tick).or_default();
        info.liquidity_gross = info
            .liquidity_gross
            .checked_add_signed(liquidity_delta)
            .ok_or(AmmError::LiquidityUnderflow)?;
        let signed = if is_upper {
            liquidity_delta.checked_neg().ok_or(MathError::Overflow)?
        } else {
            liquidity_delta
        };
        info.liquidity_net = info
            .liquidity_net
            .checked_add(signed)
            .ok_or(MathError::Overflow)?;
        if info.liquidity_gross == 0 {
            self.ticks.remove(&tick);
        }
        Ok(())
    }
}

fn signed_delta(amount0: u128, amount1: u128, owed_to_pool: bool) -> Result<BalanceDelta, AmmError> {
    let a0 = i128::try_from(amount0).map_err(|_| MathError::Conversion)?;
    let a1 = i128::try_from(amount1).map_err(|_| MathError::Conversion)?;
    Ok(if owed_to_pool {
        BalanceDelta {
            amount0: a0,
            amount1: a1,
        }
    } else {
        BalanceDelta {
            amount0: -a0,
            amount1: -a1,
        }
    })
}

fn signed_swap_delta(
    amount_in: u128,
    amount_out: u128,
    zero_for_one: bool,
) -> Result<BalanceDelta, AmmError> {
    let amount_in = i128::try_from(amount_in).map_err(|_| MathError::Conversion)?;
    let amount_out = i128::try_from(amount_out).map_err(|_| MathError::Conversion)?;
    Ok(if zero_for_one {
        BalanceDelta {
            amount0: amount_in,
            amount1: -amount_out,
        }
    } else {
        BalanceDelta {
            amount0: -amount_out,
            amount1: amount_in,
        }
    })
}
