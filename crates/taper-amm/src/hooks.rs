//! Callback traits through which the venue hands control back to attached
//! contracts during its own operations.

use thiserror::Error;

use crate::errors::AmmError;
use crate::host::Host;
use crate::types::{AccountId, LockIntent, PoolKey, SwapParams};

/// Returned by a hook to abort the operation that triggered it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HookAbort(pub String);

impl HookAbort {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Swap-time hook. `before_swap` runs under the swap's lock, before any pool
/// state changes; returning an error aborts the swap.
pub trait SwapHooks {
    fn before_swap(
        &mut self,
        host: &mut Host,
        sender: AccountId,
        key: &PoolKey,
        params: &SwapParams,
    ) -> Result<(), HookAbort>;
}

/// Hook-free marker for pools without an attached contract.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl SwapHooks for NoHooks {
    fn before_swap(
        &mut self,
        _host: &mut Host,
        _sender: AccountId,
        _key: &PoolKey,
        _params: &SwapParams,
    ) -> Result<(), HookAbort> {
        Ok(())
    }
}

/// Receiver side of the lock round-trip: the caller encodes a [`LockIntent`],
/// acquires the lock, and is called back with the same descriptor to perform
/// the operation and net out its token deltas.
pub trait LockCallback {
    fn lock_acquired(&mut self, host: &mut Host, intent: &LockIntent) -> Result<(), AmmError>;
}
