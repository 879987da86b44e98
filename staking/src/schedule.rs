//! Power schedule calculation
//!
//! Converts an (amount, lockup) pair into the deterministic list of
//! per-epoch power deltas written into the ledger. The multiplier is a step
//! function over whole-year lockup buckets; it is a policy table, not a
//! formula, and the values must match exactly. Multipliers are expressed in
//! hundredths so amounts that are multiples of `MIN_STAKE_UNIT` never round.

use serde::{Deserialize, Serialize};
use velock_core::constants::{
    EPOCHS_PER_YEAR, EXTENDED_LOCKUP_EPOCHS, MAX_LOCKUP_EPOCHS, MAX_SUPPLY, MIN_LOCKUP_EPOCHS,
    MIN_STAKE_UNIT,
};

use crate::error::{Result, StakingError};

/// One (epoch, delta) ledger write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub epoch: u64,
    pub delta: i64,
}

/// Absolute power in force from `epoch` onward, for client previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePowerPoint {
    pub epoch: u64,
    pub power: u64,
}

/// Multiplier applied while `remaining` lockup epochs are left, in
/// hundredths (100 = 1.00x).
pub fn power_multiplier(remaining: u64) -> u64 {
    match remaining {
        r if r <= EPOCHS_PER_YEAR => 100,
        r if r <= 2 * EPOCHS_PER_YEAR => 115,
        r if r <= 3 * EPOCHS_PER_YEAR => 130,
        r if r <= 4 * EPOCHS_PER_YEAR => 150,
        r if r <= 5 * EPOCHS_PER_YEAR => 175,
        _ => 350,
    }
}

/// Delta applied when the remaining lockup falls to `remaining`. The 5-year
/// boundary carries the whole 10-year cliff (1.75x) in a single step;
/// expiry removes the final 1.00x.
pub fn power_decrease_at_boundary(amount: u64, remaining: u64) -> i64 {
    let decrement = match remaining {
        0 => 100,
        r if r == EPOCHS_PER_YEAR => 15,
        r if r == 2 * EPOCHS_PER_YEAR => 15,
        r if r == 3 * EPOCHS_PER_YEAR => 20,
        r if r == 4 * EPOCHS_PER_YEAR => 25,
        r if r == 5 * EPOCHS_PER_YEAR => 175,
        _ => 0,
    };
    -(((amount / MIN_STAKE_UNIT) * decrement) as i64)
}

/// Epochs until the next multiplier-changing boundary.
pub fn epochs_to_next_boundary(remaining: u64) -> u64 {
    if remaining == 0 {
        0
    } else if remaining > 5 * EPOCHS_PER_YEAR {
        remaining - 5 * EPOCHS_PER_YEAR
    } else if remaining % EPOCHS_PER_YEAR == 0 {
        EPOCHS_PER_YEAR
    } else {
        remaining % EPOCHS_PER_YEAR
    }
}

pub fn validate_amount(amount: u64) -> Result<()> {
    if amount == 0 {
        return Err(StakingError::InvalidAmount("amount is zero".to_string()));
    }
    if amount % MIN_STAKE_UNIT != 0 {
        return Err(StakingError::InvalidAmount(format!(
            "amount must be a multiple of {}",
            MIN_STAKE_UNIT
        )));
    }
    if amount > MAX_SUPPLY {
        return Err(StakingError::InvalidAmount(format!(
            "amount exceeds the maximum supply of {}",
            MAX_SUPPLY
        )));
    }
    Ok(())
}

pub fn validate_lockup(lockup_epochs: u64) -> Result<()> {
    let standard = (MIN_LOCKUP_EPOCHS..=MAX_LOCKUP_EPOCHS).contains(&lockup_epochs);
    if !standard && lockup_epochs != EXTENDED_LOCKUP_EPOCHS {
        return Err(StakingError::InvalidLockup(lockup_epochs));
    }
    Ok(())
}

/// Full delta schedule for a validated stake: the initial power at
/// `start_epoch`, a decrement at every year boundary, zero net power from
/// `start_epoch + lockup_epochs`.
pub fn schedule_for(amount: u64, start_epoch: u64, lockup_epochs: u64) -> Result<Vec<ScheduleEntry>> {
    validate_amount(amount)?;
    validate_lockup(lockup_epochs)?;
    Ok(decay_entries(amount, start_epoch, lockup_epochs))
}

/// Unvalidated schedule generator. Cancellation paths negate its output for
/// arbitrary remaining lockups, including ones outside the creation bounds.
pub(crate) fn decay_entries(amount: u64, start_epoch: u64, lockup_epochs: u64) -> Vec<ScheduleEntry> {
    let mut entries = Vec::new();
    if lockup_epochs == 0 {
        return entries;
    }
    entries.push(ScheduleEntry {
        epoch: start_epoch,
        delta: ((amount / MIN_STAKE_UNIT) * power_multiplier(lockup_epochs)) as i64,
    });
    let mut remaining = lockup_epochs;
    let mut epoch = start_epoch;
    while remaining > 0 {
        let step = epochs_to_next_boundary(remaining);
        epoch += step;
        remaining -= step;
        entries.push(ScheduleEntry {
            epoch,
            delta: power_decrease_at_boundary(amount, remaining),
        });
    }
    entries
}

/// Read-only preview of the decay curve a stake created at `current_epoch`
/// would follow.
pub fn simulate_stake_powers(
    current_epoch: u64,
    amount: u64,
    lockup_epochs: u64,
) -> Result<Vec<StakePowerPoint>> {
    let entries = schedule_for(amount, current_epoch + 1, lockup_epochs)?;
    let mut points = Vec::with_capacity(entries.len());
    let mut power: i64 = 0;
    for entry in &entries {
        power += entry.delta;
        points.push(StakePowerPoint {
            epoch: entry.epoch,
            power: power as u64,
        });
    }
    Ok(points)
}
