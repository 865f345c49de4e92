//! # Taper Core
//!
//! The liquidity bootstrapping engine. A schedule sells `total_amount` of a
//! bootstrapping token over `[start_time, end_time]` behind a linearly
//! decaying price floor: each epoch the engine widens its single-sided range
//! position down to the scheduled floor tick and tops it up with the newly
//! scheduled tranche. If the market price still sits inside the shrinking
//! range, the engine first pushes it out with a price-limited internal sell.
//! After the window the pool owner withdraws whatever is left.
//!
//! The engine is keyed by pool: one [`Bootstrapper`] hosts any number of
//! bootstrapping pools on the same venue.

pub mod config;
pub mod engine;
pub mod errors;
pub mod orientation;
pub mod schedule;
pub mod state;

pub use config::BootstrapConfig;
pub use engine::Bootstrapper;
pub use errors::{EngineError, EngineResult};
pub use state::PoolBootstrap;
