//! The venue host: pools, the token ledger, the clock, and the lock
//! discipline tying pool operations to token settlement.
//!
//! Pool operations are only reachable inside a lock, and every token the pool
//! math produces or consumes must be netted out through [`Host::take`] /
//! [`Host::settle`] before the outermost lock releases.

use std::collections::HashMap;

use tracing::debug;

use taper_math::{MathError, MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64};

use crate::errors::AmmError;
use crate::hooks::{LockCallback, SwapHooks};
use crate::ledger::Ledger;
use crate::pool::PoolState;
use crate::types::{
    AccountId, BalanceDelta, LockIntent, ModifyParams, PoolKey, Slot0, SwapOutcome, SwapParams,
    TokenId,
};

/// Per-token deltas outstanding in the current lock. Positive amounts are
/// owed to the venue, negative to the locker.
#[derive(Debug, Default)]
struct DeltaTracker {
    depth: u32,
    owed: HashMap<TokenId, i128>,
}

#[derive(Debug, Default)]
pub struct Host {
    ledger: Ledger,
    pools: HashMap<PoolKey, PoolState>,
    now: u64,
    lock: Option<DeltaTracker>,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    // --- clock -----------------------------------------------------------

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn set_now(&mut self, now: u64) {
        self.now = now;
    }

    // --- ledger ----------------------------------------------------------

    pub fn mint(&mut self, token: TokenId, account: AccountId, amount: u128) {
        self.ledger.mint(token, account, amount);
    }

    pub fn balance_of(&self, token: TokenId, account: AccountId) -> u128 {
        self.ledger.balance_of(token, account)
    }

    pub fn transfer(
        &mut self,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<(), AmmError> {
        self.ledger.transfer(token, from, to, amount)
    }

    // --- pools -----------------------------------------------------------

    pub fn create_pool(&mut self, key: PoolKey, sqrt_price_x64: u128) -> Result<Slot0, AmmError> {
        if key.tick_spacing <= 0 || key.token0 >= key.token1 {
            return Err(AmmError::InvalidPoolKey);
        }
        if !(MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&sqrt_price_x64) {
            return Err(AmmError::InvalidPriceLimit);
        }
        if self.pools.contains_key(&key) {
            return Err(AmmError::PoolAlreadyExists);
        }
        let pool = PoolState::new(key, sqrt_price_x64)?;
        let slot0 = pool.slot0();
        debug!(?key, tick = slot0.tick, "pool created");
        self.pools.insert(key, pool);
        Ok(slot0)
    }

    pub fn slot0(&self, key: &PoolKey) -> Result<Slot0, AmmError> {
        Ok(self.pool(key)?.slot0())
    }

    pub fn position(
        &self,
        key: &PoolKey,
        owner: AccountId,
        tick_lower: i32,
        tick_upper: i32,
    ) -> Result<u128, AmmError> {
        Ok(self.pool(key)?.position(owner, tick_lower, tick_upper))
    }

    /// Applies a position change. Lock-only; the resulting deltas must be
    /// netted out before the lock releases.
    pub fn modify_position(
        &mut self,
        key: &PoolKey,
        owner: AccountId,
        params: &ModifyParams,
    ) -> Result<BalanceDelta, AmmError> {
        if self.lock.is_none() {
            return Err(AmmError::NoActiveLock);
        }
        let pool = self.pools.get_mut(key).ok_or(AmmError::UnknownPool)?;
        let delta = pool.modify_position(owner, params)?;
        let (token0, token1) = (key.token0, key.token1);
        self.record(token0, delta.amount0);
        self.record(token1, delta.amount1);
        Ok(delta)
    }

    /// Executes the pool-level swap. Lock-only; deltas as for
    /// [`Host::modify_position`].
    pub fn pool_swap(
        &mut self,
        key: &PoolKey,
        params: &SwapParams,
    ) -> Result<(SwapOutcome, BalanceDelta), AmmError> {
        if self.lock.is_none() {
            return Err(AmmError::NoActiveLock);
        }
        let pool = self.pools.get_mut(key).ok_or(AmmError::UnknownPool)?;
        let (outcome, delta) = pool.swap(params)?;
        let (token0, token1) = (key.token0, key.token1);
        self.record(token0, delta.amount0);
        self.record(token1, delta.amount1);
        Ok((outcome, delta))
    }

    // --- settlement ------------------------------------------------------

    /// Withdraws `amount` of `token` the pool owes to `to`.
    pub fn take(&mut self, token: TokenId, to: AccountId, amount: u128) -> Result<(), AmmError> {
        if self.lock.is_none() {
            return Err(AmmError::NoActiveLock);
        }
        self.ledger.transfer(token, AccountId::HOST, to, amount)?;
        self.record(token, i128::try_from(amount).map_err(|_| MathError::Conversion)?);
        Ok(())
    }

    /// Pays `amount` of `token` owed to the pool out of `from`.
    pub fn settle(
        &mut self,
        token: TokenId,
        from: AccountId,
        amount: u128,
    ) -> Result<(), AmmError> {
        if self.lock.is_none() {
            return Err(AmmError::NoActiveLock);
        }
        self.ledger.transfer(token, from, AccountId::HOST, amount)?;
        let signed = i128::try_from(amount).map_err(|_| MathError::Conversion)?;
        self.record(token, -signed);
        Ok(())
    }

    // --- lock plumbing ---------------------------------------------------

    fn begin_lock(&mut self) {
        match &mut self.lock {
            Some(tracker) => tracker.depth += 1,
            None => self.lock = Some(DeltaTracker::default()),
        }
    }

    fn end_lock(&mut self) -> Result<(), AmmError> {
        let tracker = self.lock.as_mut().ok_or(AmmError::NoActiveLock)?;
        if tracker.depth > 0 {
            tracker.depth -= 1;
            return Ok(());
        }
        let balanced = tracker.owed.values().all(|net| *net == 0);
        self.lock = None;
        if balanced {
            Ok(())
        } else {
            Err(AmmError::UnsettledDelta)
        }
    }

    fn abort_lock(&mut self) {
        match &mut self.lock {
            Some(tracker) if tracker.depth > 0 => tracker.depth -= 1,
            _ => self.lock = None,
        }
    }

    fn record(&mut self, token: TokenId, delta: i128) {
        if let Some(tracker) = &mut self.lock {
            let net = tracker.owed.entry(token).or_default();
            // take() records positive, settle() negative; pool ops record
            // their own sign directly
            *net += delta;
        }
    }

    fn pool(&self, key: &PoolKey) -> Result<&PoolState, AmmError> {
        self.pools.get(key).ok_or(AmmError::UnknownPool)
    }
}

// --- public entry points --------------------------------------------------

/// Acquires the lock and hands control back to `callback` with the encoded
/// intent. The outermost release fails unless every token delta was netted
/// out with `take`/`settle`.
pub fn lock<C: LockCallback>(
    host: &mut Host,
    callback: &mut C,
    intent: LockIntent,
) -> Result<(), AmmError> {
    host.begin_lock();
    match callback.lock_acquired(host, &intent) {
        Ok(()) => host.end_lock(),
        Err(err) => {
            host.abort_lock();
            Err(err)
        }
    }
}

/// Hooked swap entry: runs `before_swap`, executes the swap, and settles the
/// sender's legs, all under one lock.
pub fn swap<H: SwapHooks>(
    host: &mut Host,
    hooks: &mut H,
    sender: AccountId,
    key: &PoolKey,
    params: &SwapParams,
) -> Result<SwapOutcome, AmmError> {
    host.begin_lock();
    match swap_locked(host, hooks, sender, key, params) {
        Ok(outcome) => {
            host.end_lock()?;
            Ok(outcome)
        }
        Err(err) => {
            host.abort_lock();
            Err(err)
        }
    }
}

fn swap_locked<H: SwapHooks>(
    host: &mut Host,
    hooks: &mut H,
    sender: AccountId,
    key: &PoolKey,
    params: &SwapParams,
) -> Result<SwapOutcome, AmmError> {
    hooks
        .before_swap(host, sender, key, params)
        .map_err(|abort| AmmError::HookAborted(abort.0))?;
    let (outcome, delta) = host.pool_swap(key, params)?;
    settle_legs(host, sender, key, &delta)?;
    debug!(
        ?key,
        amount_in = outcome.amount_in_used,
        amount_out = outcome.amount_out,
        tick_after = outcome.tick_after,
        "swap settled"
    );
    Ok(outcome)
}

/// External liquidity entry: applies the change and settles the sender's
/// legs under one lock. No hooks run for liquidity changes.
pub fn modify_liquidity(
    host: &mut Host,
    sender: AccountId,
    key: &PoolKey,
    params: &ModifyParams,
) -> Result<BalanceDelta, AmmError> {
    host.begin_lock();
    let result: Result<BalanceDelta, AmmError> = (|| {
        let delta = host.modify_position(key, sender, params)?;
        settle_legs(host, sender, key, &delta)?;
        Ok(delta)
    })();
    match result {
        Ok(delta) => {
            host.end_lock()?;
            Ok(delta)
        }
        Err(err) => {
            host.abort_lock();
            Err(err)
        }
    }
}

fn settle_legs(
    host: &mut Host,
    account: AccountId,
    key: &PoolKey,
    delta: &BalanceDelta,
) -> Result<(), AmmError> {
    for (token, amount) in [(key.token0, delta.amount0), (key.token1, delta.amount1)] {
        if amount > 0 {
            host.settle(token, account, amount as u128)?;
        } else if amount < 0 {
            host.take(token, account, amount.unsigned_abs())?;
        }
    }
    Ok(())
}
