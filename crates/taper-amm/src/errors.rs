//! Venue error types.

use thiserror::Error;

use taper_math::MathError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmmError {
    #[error("pool already exists")]
    PoolAlreadyExists,

    #[error("malformed pool key")]
    InvalidPoolKey,

    #[error("unknown pool")]
    UnknownPool,

    #[error("tick {0} is not aligned to the pool tick spacing")]
    MisalignedTick(i32),

    #[error("invalid tick range")]
    InvalidTickRange,

    #[error("sqrt price limit outside the reachable range")]
    InvalidPriceLimit,

    #[error("position has less liquidity than requested")]
    LiquidityUnderflow,

    #[error("insufficient balance")]
    InsufficientBalance,

    #[error("no lock is active")]
    NoActiveLock,

    #[error("lock released with unsettled token deltas")]
    UnsettledDelta,

    #[error("hook aborted the operation: {0}")]
    HookAborted(String),

    #[error(transparent)]
    Math(#[from] MathError),
}
