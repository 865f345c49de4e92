//! Error types for fixed-point math.

use thiserror::Error;

pub type MathResult<T> = Result<T, MathError>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("math overflow")]
    Overflow,

    #[error("math underflow")]
    Underflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("value does not fit the target width")]
    Conversion,

    #[error("tick out of range")]
    InvalidTick,

    #[error("sqrt price out of range")]
    InvalidPrice,
}
