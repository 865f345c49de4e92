//! Bootstrap schedule configuration.

use serde::{Deserialize, Serialize};

/// Immutable schedule recorded at initialization.
///
/// `min_tick`/`max_tick` describe the eventual widest range in canonical
/// orientation (as if the bootstrapping token were token0); `is_token0`
/// records which side of the pool the bootstrapping token actually is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Total bootstrapping tokens committed over the window.
    pub total_amount: u128,
    /// Window start, unix seconds.
    pub start_time: u32,
    /// Window end, unix seconds.
    pub end_time: u32,
    /// Final (widest) lower bound of the range, canonical orientation.
    pub min_tick: i32,
    /// Upper bound of the range, canonical orientation.
    pub max_tick: i32,
    /// Whether the bootstrapping token is the pool's token0.
    pub is_token0: bool,
}
