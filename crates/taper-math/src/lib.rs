//! # Taper Math
//!
//! Fixed-point math shared by the venue model and the bootstrapping engine.
//! Sqrt prices are Q64.64 values in `u128`; token amounts and liquidity are
//! plain `u128`; every product that can exceed 128 bits goes through a
//! 256-bit intermediate and comes back with an explicit rounding direction.

pub mod constants;
pub mod errors;
pub mod liquidity_math;
pub mod mul_div;
pub mod tick_math;

pub use constants::*;
pub use errors::{MathError, MathResult};
pub use mul_div::{mul_div, mul_div_u128, Rounding};
