//! Fungible governance token bookkeeping

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use velock_core::constants::MAX_SUPPLY;

use crate::error::{Result, TokenError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenLedger {
    accounts: HashMap<String, u64>,
    total_supply: u64,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, address: &str) -> u64 {
        self.accounts.get(address).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Fail unless `address` can cover `amount`.
    pub fn require_balance(&self, address: &str, amount: u64) -> Result<()> {
        let available = self.balance_of(address);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        Ok(())
    }

    pub fn mint(&mut self, recipient: &str, amount: u64) -> Result<()> {
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .filter(|supply| *supply <= MAX_SUPPLY)
            .ok_or(TokenError::SupplyOverflow { amount })?;
        *self.accounts.entry(recipient.to_string()).or_insert(0) += amount;
        self.total_supply = new_supply;
        Ok(())
    }

    pub fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<()> {
        self.require_balance(from, amount)?;
        if let Some(balance) = self.accounts.get_mut(from) {
            *balance -= amount;
        }
        *self.accounts.entry(to.to_string()).or_insert(0) += amount;
        Ok(())
    }
}
