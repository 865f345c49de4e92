//! Token-orientation handling.
//!
//! Internally the engine always reasons as if it were selling token0: the
//! range shrinks downward and "price still in range" means the host tick is
//! at or above the target floor. When the bootstrapping token is token1,
//! every tick crossing the engine boundary is reflected through zero instead
//! of duplicating the main logic.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Orientation {
    is_token0: bool,
}

impl Orientation {
    pub fn new(is_token0: bool) -> Self {
        Self { is_token0 }
    }

    /// Swap direction that sells the bootstrapping token.
    pub fn zero_for_one(&self) -> bool {
        self.is_token0
    }

    /// Canonical view of the host's current tick.
    pub fn canonical_tick(&self, host_tick: i32) -> i32 {
        if self.is_token0 {
            host_tick
        } else {
            -host_tick
        }
    }

    /// Host ticks of the position for a canonical `(floor, ceiling)` range.
    pub fn position_range(&self, floor_tick: i32, ceiling_tick: i32) -> (i32, i32) {
        if self.is_token0 {
            (floor_tick, ceiling_tick)
        } else {
            (-ceiling_tick, -floor_tick)
        }
    }

    /// Host tick whose sqrt price bounds a forced sell so the market ends up
    /// strictly outside a range with canonical floor `floor_tick`.
    pub fn sell_limit_tick(&self, floor_tick: i32) -> i32 {
        if self.is_token0 {
            floor_tick - 1
        } else {
            -floor_tick + 1
        }
    }
}
