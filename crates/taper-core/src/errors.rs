//! Engine error types.

use thiserror::Error;

use taper_amm::AmmError;
use taper_math::MathError;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("start time is after end time, or the window is already over")]
    InvalidTimeRange,

    #[error("invalid bootstrap tick range")]
    InvalidTickRange,

    #[error("epoch size must be positive")]
    InvalidEpochSize,

    /// Internal: the schedule was evaluated before `start_time`. Unreachable
    /// through the public surface, which floors and guards first.
    #[error("schedule evaluated before start time")]
    BeforeStartTime,

    #[error("the bootstrap window has not ended yet")]
    BeforeEndTime,

    #[error("caller is not the pool owner")]
    Unauthorized,

    #[error("no bootstrap is registered for this pool")]
    UnknownPool,

    #[error("a bootstrap is already registered for this pool")]
    AlreadyInitialized,

    #[error("host failure: {0}")]
    Host(#[from] AmmError),

    #[error(transparent)]
    Math(#[from] MathError),
}
