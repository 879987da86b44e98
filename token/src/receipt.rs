//! Stake receipt registry
//!
//! NFT-style ownership records controlling a stake's lifecycle, decoupled
//! from the beneficiary who receives its voting power.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Result, TokenError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptRegistry {
    owners: HashMap<u64, String>,
}

impl ReceiptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self, owner: &str, receipt_id: u64) -> Result<()> {
        if self.owners.contains_key(&receipt_id) {
            return Err(TokenError::ReceiptExists(receipt_id));
        }
        self.owners.insert(receipt_id, owner.to_string());
        Ok(())
    }

    pub fn burn(&mut self, receipt_id: u64) -> Result<()> {
        self.owners
            .remove(&receipt_id)
            .map(|_| ())
            .ok_or(TokenError::ReceiptNotFound(receipt_id))
    }

    pub fn owner_of(&self, receipt_id: u64) -> Result<&str> {
        self.owners
            .get(&receipt_id)
            .map(String::as_str)
            .ok_or(TokenError::ReceiptNotFound(receipt_id))
    }

    /// Fail unless `caller` owns the receipt.
    pub fn require_owner(&self, receipt_id: u64, caller: &str) -> Result<()> {
        if self.owner_of(receipt_id)? != caller {
            return Err(TokenError::NotReceiptOwner {
                receipt_id,
                caller: caller.to_string(),
            });
        }
        Ok(())
    }

    pub fn transfer(&mut self, caller: &str, to: &str, receipt_id: u64) -> Result<()> {
        self.require_owner(receipt_id, caller)?;
        self.owners.insert(receipt_id, to.to_string());
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.owners.len()
    }
}
