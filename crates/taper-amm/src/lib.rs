//! # Taper AMM
//!
//! An in-memory concentrated-liquidity venue. It owns pool state, position
//! accounting, a tick-crossing swap engine with √price limits, and a token
//! ledger, and it exposes the lock / `take` / `settle` discipline and the
//! swap-hook dispatch that the bootstrapping engine is written against.
//!
//! The venue is deliberately fee-free and exact-input only; it is the host
//! collaborator for the engine, not a general-purpose exchange.

pub mod errors;
pub mod hooks;
pub mod host;
pub mod ledger;
pub mod pool;
pub mod types;

pub use errors::AmmError;
pub use hooks::{HookAbort, LockCallback, NoHooks, SwapHooks};
pub use host::{lock, modify_liquidity, swap, Host};
pub use ledger::Ledger;
pub use types::{
    AccountId, BalanceDelta, LockIntent, ModifyParams, PoolKey, Slot0, SwapOutcome, SwapParams,
    TokenId,
};
