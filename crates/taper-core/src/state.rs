//! Per-pool dynamic state.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use taper_amm::AccountId;

use crate::config::BootstrapConfig;

/// Engine state for one bootstrapping pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolBootstrap {
    /// Account that funded the bootstrap; sole caller of `exit` and receiver
    /// of the final withdrawal.
    pub owner: AccountId,
    pub config: BootstrapConfig,
    /// Width of one sync bucket, seconds.
    pub epoch_size: u64,
    /// Cumulative tokens scheduled through the last synced epoch; monotone,
    /// bounded by `config.total_amount`.
    pub amount_committed: u128,
    /// Committed tokens not yet backing a position because the target range
    /// was still empty (or too small for a whole liquidity unit) when their
    /// epoch reconciled. Folded into the next position open.
    pub unplaced: u128,
    /// Canonical lower bound of the currently held position. Starts at
    /// `config.max_tick` and only ever moves down.
    pub floor_tick: i32,
    /// Set while the engine executes its own swap so the re-entrant
    /// `before_swap` callback short-circuits.
    pub in_internal_swap: bool,
    /// Latched by `exit`; the pool never syncs again.
    pub exited: bool,
    /// Epoch-floor timestamps already reconciled.
    pub synced_epochs: HashSet<u64>,
}

impl PoolBootstrap {
    pub fn new(owner: AccountId, config: BootstrapConfig, epoch_size: u64) -> Self {
        Self {
            owner,
            config,
            epoch_size,
            amount_committed: 0,
            unplaced: 0,
            floor_tick: config.max_tick,
            in_internal_swap: false,
            exited: false,
            synced_epochs: HashSet::new(),
        }
    }
}
