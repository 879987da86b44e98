//! Staking error types

use thiserror::Error;
use token::TokenError;

#[derive(Error, Debug)]
pub enum StakingError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid lockup period: {0} epochs")]
    InvalidLockup(u64),

    #[error("Nothing to increase: both amount and lockup deltas are zero")]
    NothingToIncrease,

    #[error("Invalid split amount {split} for a stake of {amount}")]
    InvalidSplit { split: u64, amount: u64 },

    #[error("Mismatched lockups: stake {id1} ends at epoch {final1}, stake {id2} at {final2}")]
    MismatchedLockup {
        id1: u64,
        final1: u64,
        id2: u64,
        final2: u64,
    },

    #[error("Stake {id} lockup already ended at epoch {final_epoch}")]
    StakeExpired { id: u64, final_epoch: u64 },

    #[error("Stake not found: {0}")]
    StakeNotFound(u64),

    #[error("Lockup not ended: stake {id} unlocks at epoch {final_epoch}, current epoch is {current}")]
    LockupNotEnded {
        id: u64,
        final_epoch: u64,
        current: u64,
    },

    #[error("Epoch {epoch} is still running (current epoch {current})")]
    EpochStillRunning { epoch: u64, current: u64 },

    #[error("Total power already calculated through epoch {watermark}, requested {epoch}")]
    PowerAlreadyCalculated { epoch: u64, watermark: u64 },

    #[error("Epoch {0} is finalized and cannot accept new deltas")]
    EpochFinalized(u64),

    #[error("Total power went negative at epoch {0}")]
    NegativePower(u64),

    #[error("Power delta overflow at epoch {0}")]
    PowerOverflow(u64),

    #[error("Token operation failed: {0}")]
    Token(#[from] TokenError),
}

pub type Result<T> = std::result::Result<T, StakingError>;
