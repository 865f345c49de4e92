//! The bootstrapping engine: epoch synchronisation, position reconciliation,
//! forced sells, and the owner exit.

use std::collections::HashMap;

use tracing::{debug, info};

use taper_amm::{
    lock, AccountId, AmmError, Host, HookAbort, LockCallback, LockIntent, ModifyParams, PoolKey,
    SwapHooks, SwapParams,
};
use taper_math::liquidity_math::{
    get_amount_0_delta, get_amount_1_delta, get_liquidity_for_amount_0, get_liquidity_for_amount_1,
};
use taper_math::tick_math::{
    get_sqrt_price_at_tick, max_usable_tick, min_usable_tick, snap_tick_down, snap_tick_up,
};
use taper_math::{MathError, MAX_TICK, MIN_TICK};

use crate::config::BootstrapConfig;
use crate::errors::{EngineError, EngineResult};
use crate::orientation::Orientation;
use crate::schedule::{floor_epoch, target_amount, target_min_tick};
use crate::state::PoolBootstrap;

/// Keyed bootstrapping engine: one instance hosts any number of pools on the
/// same venue.
#[derive(Debug)]
pub struct Bootstrapper {
    account: AccountId,
    pools: HashMap<PoolKey, PoolBootstrap>,
}

impl Bootstrapper {
    pub fn new(account: AccountId) -> Self {
        Self {
            account,
            pools: HashMap::new(),
        }
    }

    /// The engine's own ledger account.
    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn pool(&self, key: &PoolKey) -> Option<&PoolBootstrap> {
        self.pools.get(key)
    }

    /// Registers a bootstrap on an existing pool: validates the schedule and
    /// pulls the full `total_amount` of the bootstrapping token from
    /// `sender`, who becomes the pool owner.
    pub fn after_initialize(
        &mut self,
        host: &mut Host,
        sender: AccountId,
        key: PoolKey,
        config: BootstrapConfig,
        epoch_size: u64,
    ) -> EngineResult<()> {
        if self.pools.contains_key(&key) {
            return Err(EngineError::AlreadyInitialized);
        }
        if config.start_time > config.end_time || u64::from(config.end_time) < host.now() {
            return Err(EngineError::InvalidTimeRange);
        }
        if epoch_size == 0 {
            return Err(EngineError::InvalidEpochSize);
        }
        let spacing = key.tick_spacing;
        if config.min_tick >= config.max_tick
            || config.min_tick < min_usable_tick(spacing)
            || config.max_tick > max_usable_tick(spacing)
        {
            return Err(EngineError::InvalidTickRange);
        }
        host.slot0(&key)?;

        let token = key.token(config.is_token0);
        host.transfer(token, sender, self.account, config.total_amount)?;

        info!(
            ?key,
            total = config.total_amount,
            start = config.start_time,
            end = config.end_time,
            epoch_size,
            "bootstrap initialised"
        );
        self.pools
            .insert(key, PoolBootstrap::new(sender, config, epoch_size));
        Ok(())
    }

    /// Reconciles the pool with the schedule for the current epoch. The
    /// first call in an epoch does the work; repeat calls are no-ops, as are
    /// calls before the first epoch of the window or after `exit`.
    pub fn sync(&mut self, host: &mut Host, key: &PoolKey) -> EngineResult<()> {
        let state = self.pools.get(key).ok_or(EngineError::UnknownPool)?;
        if state.exited || state.in_internal_swap {
            return Ok(());
        }

        let config = state.config;
        let epoch = floor_epoch(host.now(), state.epoch_size);
        if epoch < u64::from(config.start_time) {
            return Ok(());
        }
        if state.synced_epochs.contains(&epoch) {
            return Ok(());
        }

        let committed = state.amount_committed;
        let floor_old = state.floor_tick;
        let amount_target = target_amount(&config, epoch)?;
        let tranche = amount_target.saturating_sub(committed);
        let floor_new = target_min_tick(&config, epoch)?;

        let orientation = Orientation::new(config.is_token0);
        let current = orientation.canonical_tick(host.slot0(key)?.tick);
        // the position's actual lower bound is the spacing-snapped floor
        let floor_snapped = snap_tick_down(floor_new, key.tick_spacing);

        debug!(
            epoch,
            tranche,
            floor_new,
            floor_old,
            current,
            "syncing epoch"
        );

        let state = self.pools.get_mut(key).ok_or(EngineError::UnknownPool)?;
        state.amount_committed = amount_target;

        if current < floor_snapped {
            // market already below the new floor: provision directly
            self.reconcile(host, key, tranche, floor_new)?;
        } else {
            self.forced_sell(host, key, tranche, floor_new)?;
        }

        let state = self.pools.get_mut(key).ok_or(EngineError::UnknownPool)?;
        state.synced_epochs.insert(epoch);
        info!(
            epoch,
            committed = state.amount_committed,
            floor = state.floor_tick,
            "epoch synced"
        );
        Ok(())
    }

    /// Final withdrawal. Requires the window to be over (epoch-floored) and
    /// the caller to be the owner; runs one last sync, hands the whole
    /// position to the owner, and permanently disables syncing.
    pub fn exit(&mut self, host: &mut Host, key: &PoolKey, caller: AccountId) -> EngineResult<()> {
        let state = self.pools.get(key).ok_or(EngineError::UnknownPool)?;
        if caller != state.owner {
            return Err(EngineError::Unauthorized);
        }
        if floor_epoch(host.now(), state.epoch_size) < u64::from(state.config.end_time) {
            return Err(EngineError::BeforeEndTime);
        }
        if state.exited {
            return Ok(());
        }

        self.sync(host, key)?;

        let state = self.pools.get(key).ok_or(EngineError::UnknownPool)?;
        let config = state.config;
        let orientation = Orientation::new(config.is_token0);
        let (tick_lower, tick_upper) = snapped_range(
            orientation,
            state.floor_tick,
            config.max_tick,
            key.tick_spacing,
        );
        let liquidity = host.position(key, self.account, tick_lower, tick_upper)?;
        if liquidity > 0 {
            let liquidity_delta = to_signed(liquidity)?;
            lock(
                host,
                self,
                LockIntent::ModifyPosition {
                    key: *key,
                    params: ModifyParams {
                        tick_lower,
                        tick_upper,
                        liquidity_delta: -liquidity_delta,
                    },
                    take_to_owner: true,
                },
            )?;
        }

        let state = self.pools.get_mut(key).ok_or(EngineError::UnknownPool)?;
        state.exited = true;
        info!(?key, "bootstrap exited");
        Ok(())
    }

    /// Moves the position to canonical floor `floor_new`, carrying the old
    /// position's tokens over and adding `tranche` on top.
    ///
    /// The carry-over is denominated in token amount rather than liquidity
    /// units: the same tokens back a different number of units at the wider
    /// range.
    fn reconcile(
        &mut self,
        host: &mut Host,
        key: &PoolKey,
        tranche: u128,
        floor_new: i32,
    ) -> EngineResult<()> {
        let state = self.pools.get(key).ok_or(EngineError::UnknownPool)?;
        let config = state.config;
        let floor_old = state.floor_tick;
        let unplaced = state.unplaced;
        if tranche == 0 && unplaced == 0 && floor_new == floor_old {
            return Ok(());
        }

        let orientation = Orientation::new(config.is_token0);
        let spacing = key.tick_spacing;

        let (old_lower, old_upper) = snapped_range(orientation, floor_old, config.max_tick, spacing);
        let liquidity = host.position(key, self.account, old_lower, old_upper)?;
        let carried = if liquidity > 0 {
            position_amount(config.is_token0, old_lower, old_upper, liquidity)?
        } else {
            0
        };
        let total = carried
            .checked_add(tranche)
            .and_then(|sum| sum.checked_add(unplaced))
            .ok_or(MathError::Overflow)?;

        if liquidity > 0 {
            let liquidity_delta = to_signed(liquidity)?;
            lock(
                host,
                self,
                LockIntent::ModifyPosition {
                    key: *key,
                    params: ModifyParams {
                        tick_lower: old_lower,
                        tick_upper: old_upper,
                        liquidity_delta: -liquidity_delta,
                    },
                    take_to_owner: false,
                },
            )?;
        }

        let (new_lower, new_upper) = snapped_range(orientation, floor_new, config.max_tick, spacing);
        let mut placed = false;
        if new_lower < new_upper && total > 0 {
            let liquidity_new = range_liquidity(config.is_token0, new_lower, new_upper, total)?;
            if liquidity_new > 0 {
                lock(
                    host,
                    self,
                    LockIntent::ModifyPosition {
                        key: *key,
                        params: ModifyParams {
                            tick_lower: new_lower,
                            tick_upper: new_upper,
                            liquidity_delta: to_signed(liquidity_new)?,
                        },
                        take_to_owner: false,
                    },
                )?;
                placed = true;
            }
        }

        let state = self.pools.get_mut(key).ok_or(EngineError::UnknownPool)?;
        state.floor_tick = floor_new;
        // a tranche the range could not absorb is carried, not dropped
        state.unplaced = if placed { 0 } else { total };
        debug!(
            floor_new,
            carried,
            tranche,
            unplaced = state.unplaced,
            "position reconciled"
        );
        Ok(())
    }

    /// The market still sits inside (or above) the shrinking range: sell
    /// into it down to one tick outside the new floor, then provision
    /// whatever was not absorbed.
    fn forced_sell(
        &mut self,
        host: &mut Host,
        key: &PoolKey,
        tranche: u128,
        floor_new: i32,
    ) -> EngineResult<()> {
        let state = self.pools.get(key).ok_or(EngineError::UnknownPool)?;
        let config = state.config;
        let orientation = Orientation::new(config.is_token0);
        let token = key.token(config.is_token0);

        let snapped_floor = snap_tick_down(floor_new, key.tick_spacing);
        let limit_tick = orientation
            .sell_limit_tick(snapped_floor)
            .clamp(MIN_TICK, MAX_TICK);
        let params = SwapParams {
            zero_for_one: orientation.zero_for_one(),
            amount_in: tranche,
            sqrt_price_limit_x64: get_sqrt_price_at_tick(limit_tick)?,
        };

        let balance_before = host.balance_of(token, self.account);

        let state = self.pools.get_mut(key).ok_or(EngineError::UnknownPool)?;
        state.in_internal_swap = true;
        let result = lock(
            host,
            self,
            LockIntent::Swap {
                key: *key,
                params,
            },
        );
        let state = self.pools.get_mut(key).ok_or(EngineError::UnknownPool)?;
        state.in_internal_swap = false;
        result?;

        let sold = balance_before.saturating_sub(host.balance_of(token, self.account));
        debug!(sold, intended = tranche, limit_tick, "forced sell");

        if sold < tranche {
            // the limit stopped the sell: the unsold remainder goes into the
            // book at the new floor
            self.reconcile(host, key, tranche - sold, floor_new)
        } else {
            // external demand absorbed the full tranche; leave the position
            // where it is until the next epoch
            Ok(())
        }
    }
}

impl SwapHooks for Bootstrapper {
    /// Host-initiated swaps poke the engine first; the engine's own swaps
    /// short-circuit on the in-flight flag.
    fn before_swap(
        &mut self,
        host: &mut Host,
        _sender: AccountId,
        key: &PoolKey,
        _params: &SwapParams,
    ) -> Result<(), HookAbort> {
        let Some(state) = self.pools.get(key) else {
            return Ok(());
        };
        if state.exited || state.in_internal_swap {
            return Ok(());
        }
        if floor_epoch(host.now(), state.epoch_size) < u64::from(state.config.start_time) {
            return Ok(());
        }
        self.sync(host, key)
            .map_err(|err| HookAbort::new(err.to_string()))
    }
}

impl LockCallback for Bootstrapper {
    fn lock_acquired(&mut self, host: &mut Host, intent: &LockIntent) -> Result<(), AmmError> {
        match *intent {
            LockIntent::ModifyPosition {
                key,
                params,
                take_to_owner,
            } => {
                let delta = host.modify_position(&key, self.account, &params)?;
                let recipient = if take_to_owner {
                    self.pools
                        .get(&key)
                        .map(|state| state.owner)
                        .unwrap_or(self.account)
                } else {
                    self.account
                };
                for (token, amount) in [(key.token0, delta.amount0), (key.token1, delta.amount1)] {
                    if amount > 0 {
                        host.settle(token, self.account, amount as u128)?;
                    } else if amount < 0 {
                        host.take(token, recipient, amount.unsigned_abs())?;
                    }
                }
                Ok(())
            }
            LockIntent::Swap { key, params } => {
                // routed through the hooked entry so the re-entrant
                // before_swap fires against the in-flight flag
                let account = self.account;
                taper_amm::swap(host, self, account, &key, &params).map(|_| ())
            }
        }
    }
}

/// Host-tick position range for a canonical `(floor, ceiling)`, snapped
/// outward to the pool's tick spacing.
fn snapped_range(
    orientation: Orientation,
    floor_tick: i32,
    ceiling_tick: i32,
    tick_spacing: i32,
) -> (i32, i32) {
    let lower = snap_tick_down(floor_tick, tick_spacing);
    let upper = snap_tick_up(ceiling_tick, tick_spacing);
    orientation.position_range(lower, upper)
}

/// Bootstrapping-token amount a position pays out when closed out of range.
fn position_amount(
    is_token0: bool,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
) -> EngineResult<u128> {
    let sqrt_lower = get_sqrt_price_at_tick(tick_lower)?;
    let sqrt_upper = get_sqrt_price_at_tick(tick_upper)?;
    let amount = if is_token0 {
        get_amount_0_delta(sqrt_lower, sqrt_upper, liquidity, false)?
    } else {
        get_amount_1_delta(sqrt_lower, sqrt_upper, liquidity, false)?
    };
    Ok(amount)
}

/// Liquidity units a bootstrapping-token amount backs across a range.
fn range_liquidity(
    is_token0: bool,
    tick_lower: i32,
    tick_upper: i32,
    amount: u128,
) -> EngineResult<u128> {
    let sqrt_lower = get_sqrt_price_at_tick(tick_lower)?;
    let sqrt_upper = get_sqrt_price_at_tick(tick_upper)?;
    let liquidity = if is_token0 {
        get_liquidity_for_amount_0(sqrt_lower, sqrt_upper, amount)?
    } else {
        get_liquidity_for_amount_1(sqrt_lower, sqrt_upper, amount)?
    };
    Ok(liquidity)
}

fn to_signed(liquidity: u128) -> EngineResult<i128> {
    i128::try_from(liquidity).map_err(|_| EngineError::Math(MathError::Conversion))
}
