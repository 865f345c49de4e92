//! Token balance ledger.

use std::collections::HashMap;

use crate::errors::AmmError;
use crate::types::{AccountId, TokenId};

/// Balances keyed by `(token, account)`. Transfers are checked; minting is a
/// test/integration convenience mirroring an external token program.
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    balances: HashMap<(TokenId, AccountId), u128>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self, token: TokenId, account: AccountId, amount: u128) {
        *self.balances.entry((token, account)).or_default() += amount;
    }

    pub fn balance_of(&self, token: TokenId, account: AccountId) -> u128 {
        self.balances.get(&(token, account)).copied().unwrap_or(0)
    }

    pub fn transfer(
        &mut self,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        amount: u128,
    ) -> Result<(), AmmError> {
        if amount == 0 {
            return Ok(());
        }
        let from_balance = self.balance_of(token, from);
        if from_balance < amount {
            return Err(AmmError::InsufficientBalance);
        }
        self.balances.insert((token, from), from_balance - amount);
        *self.balances.entry((token, to)).or_default() += amount;
        Ok(())
    }
}
