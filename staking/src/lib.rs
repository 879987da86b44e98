//! VELock Staking Engine
//!
//! Epoch-indexed vote-escrow accounting: users lock governance tokens for a
//! chosen duration and receive voting power that decays in discrete yearly
//! steps, tracked as per-epoch deltas in a bitpacked ledger. Lifecycle
//! operations (create/split/merge/increase/withdraw/delegate) only ever
//! touch epochs after the current one, so elapsed history stays immutable,
//! and an explicit lazy fold materializes cumulative total power on demand.

pub mod beneficiary;
pub mod error;
pub mod ledger;
pub mod registry;
pub mod schedule;
pub mod stake;
pub mod store;
pub mod total;

pub use beneficiary::BeneficiarySets;
pub use error::{Result, StakingError};
pub use ledger::{EpochLedger, Namespace};
pub use registry::{StakeRegistry, VAULT_ADDRESS};
pub use schedule::{
    epochs_to_next_boundary, power_decrease_at_boundary, power_multiplier, schedule_for,
    simulate_stake_powers, ScheduleEntry, StakePowerPoint,
};
pub use stake::{Stake, StakeStatus};
pub use store::{StakingStore, StoreError};
pub use total::TotalPowerAccumulator;

#[cfg(test)]
mod tests {
    use velock_core::constants::{EPOCHS_PER_YEAR, EXTENDED_LOCKUP_EPOCHS, MAX_LOCKUP_EPOCHS};

    #[test]
    fn test_lockup_constants() {
        assert_eq!(EPOCHS_PER_YEAR, 13);
        assert_eq!(MAX_LOCKUP_EPOCHS, 65);
        assert_eq!(EXTENDED_LOCKUP_EPOCHS, 130);
    }
}
