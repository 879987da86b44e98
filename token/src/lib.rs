//! VELock Token Module
//!
//! Conventional ledger bookkeeping consumed by the staking engine: the
//! fungible governance token and the transferable receipts that control a
//! stake's lifecycle.

pub mod error;
pub mod ledger;
pub mod receipt;

pub use error::{Result, TokenError};
pub use ledger::TokenLedger;
pub use receipt::ReceiptRegistry;

#[cfg(test)]
mod tests {
    use velock_core::constants::{COIN, MAX_SUPPLY};

    #[test]
    fn test_supply_constants() {
        assert_eq!(MAX_SUPPLY, 1_000_000_000 * COIN);
    }
}
