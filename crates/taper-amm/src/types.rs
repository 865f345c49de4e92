//! Identifier and parameter types shared across the venue surface.

use serde::{Deserialize, Serialize};

/// Opaque token identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub u64);

/// Opaque account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub u64);

impl AccountId {
    /// The venue's own custody account: all pool funds live here.
    pub const HOST: AccountId = AccountId(0);
}

/// Identity of a pool. `token0` must sort below `token1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub token0: TokenId,
    pub token1: TokenId,
    pub tick_spacing: i32,
}

impl PoolKey {
    pub fn new(token0: TokenId, token1: TokenId, tick_spacing: i32) -> Self {
        Self {
            token0,
            token1,
            tick_spacing,
        }
    }

    /// Token selected by pool side.
    pub fn token(&self, zero: bool) -> TokenId {
        if zero {
            self.token0
        } else {
            self.token1
        }
    }
}

/// Pool price snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot0 {
    pub sqrt_price_x64: u128,
    pub tick: i32,
}

/// Exact-input swap request. The √price limit is mandatory and must lie
/// strictly beyond the current price in the swap direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParams {
    pub zero_for_one: bool,
    pub amount_in: u128,
    pub sqrt_price_limit_x64: u128,
}

/// Position change request. Positive `liquidity_delta` opens/extends,
/// negative closes/shrinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyParams {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity_delta: i128,
}

/// Token deltas produced by a pool operation. Positive amounts are owed to
/// the pool (the caller settles), negative amounts are owed to the caller
/// (the caller takes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDelta {
    pub amount0: i128,
    pub amount1: i128,
}

/// Result of a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOutcome {
    /// Input actually consumed; less than the request when the limit was hit.
    pub amount_in_used: u128,
    pub amount_out: u128,
    pub sqrt_price_after_x64: u128,
    pub tick_after: i32,
}

/// Operation descriptor carried through the lock round-trip, one variant per
/// pool operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockIntent {
    ModifyPosition {
        key: PoolKey,
        params: ModifyParams,
        /// Route withdrawn tokens to the position owner's principal instead
        /// of the calling contract.
        take_to_owner: bool,
    },
    Swap {
        key: PoolKey,
        params: SwapParams,
    },
}
