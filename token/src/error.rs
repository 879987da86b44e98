//! Token error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("Minting {amount} would exceed the maximum supply")]
    SupplyOverflow { amount: u64 },

    #[error("Receipt already exists: {0}")]
    ReceiptExists(u64),

    #[error("Receipt not found: {0}")]
    ReceiptNotFound(u64),

    #[error("{caller} does not own receipt {receipt_id}")]
    NotReceiptOwner { receipt_id: u64, caller: String },
}

pub type Result<T> = std::result::Result<T, TokenError>;
