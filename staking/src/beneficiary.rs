//! Epoch-versioned beneficiary stake sets
//!
//! Append-only snapshot lists answering "which stakes did this address hold
//! power over at epoch E". Snapshots for elapsed epochs are never rewritten;
//! only the pending next-epoch snapshot may be edited in place.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::{Result, StakingError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeSetSnapshot {
    /// Epoch from which this snapshot is effective.
    pub epoch: u64,
    pub stake_ids: BTreeSet<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeneficiarySets {
    sets: HashMap<String, Vec<StakeSetSnapshot>>,
}

impl BeneficiarySets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stake ids the beneficiary holds power over at `epoch`. Empty before
    /// the first recorded snapshot.
    pub fn stakes_of_at(&self, beneficiary: &str, epoch: u64) -> BTreeSet<u64> {
        let Some(snapshots) = self.sets.get(beneficiary) else {
            return BTreeSet::new();
        };
        let idx = snapshots.partition_point(|s| s.epoch <= epoch);
        if idx == 0 {
            return BTreeSet::new();
        }
        snapshots[idx - 1].stake_ids.clone()
    }

    /// Whether the latest snapshot (current or pending) contains the id.
    pub fn holds(&self, beneficiary: &str, stake_id: u64) -> bool {
        self.sets
            .get(beneficiary)
            .and_then(|snapshots| snapshots.last())
            .map(|snapshot| snapshot.stake_ids.contains(&stake_id))
            .unwrap_or(false)
    }

    /// Register `stake_id` for the beneficiary from `effective_epoch`
    /// onward. The pending snapshot is edited in place; otherwise the
    /// latest set is cloned forward.
    pub fn add(&mut self, beneficiary: &str, stake_id: u64, effective_epoch: u64) {
        let snapshots = self.sets.entry(beneficiary.to_string()).or_default();
        match snapshots.last_mut() {
            Some(last) if last.epoch == effective_epoch => {
                last.stake_ids.insert(stake_id);
            }
            Some(last) => {
                debug_assert!(last.epoch < effective_epoch);
                let mut stake_ids = last.stake_ids.clone();
                stake_ids.insert(stake_id);
                snapshots.push(StakeSetSnapshot {
                    epoch: effective_epoch,
                    stake_ids,
                });
            }
            None => {
                let mut stake_ids = BTreeSet::new();
                stake_ids.insert(stake_id);
                snapshots.push(StakeSetSnapshot {
                    epoch: effective_epoch,
                    stake_ids,
                });
            }
        }
    }

    /// Drop `stake_id` from `effective_epoch` onward. Removing an id the
    /// latest snapshot does not contain is a caller error.
    pub fn remove(&mut self, beneficiary: &str, stake_id: u64, effective_epoch: u64) -> Result<()> {
        let snapshots = self
            .sets
            .get_mut(beneficiary)
            .ok_or(StakingError::StakeNotFound(stake_id))?;
        let Some(last) = snapshots.last_mut() else {
            return Err(StakingError::StakeNotFound(stake_id));
        };
        if !last.stake_ids.contains(&stake_id) {
            return Err(StakingError::StakeNotFound(stake_id));
        }
        if last.epoch == effective_epoch {
            last.stake_ids.remove(&stake_id);
        } else {
            debug_assert!(last.epoch < effective_epoch);
            let mut stake_ids = last.stake_ids.clone();
            stake_ids.remove(&stake_id);
            snapshots.push(StakeSetSnapshot {
                epoch: effective_epoch,
                stake_ids,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_before_first_snapshot() {
        let mut sets = BeneficiarySets::new();
        sets.add("alice", 1, 5);
        assert!(sets.stakes_of_at("alice", 4).is_empty());
        assert!(sets.stakes_of_at("bob", 10).is_empty());
    }

    #[test]
    fn test_snapshot_lookup() {
        let mut sets = BeneficiarySets::new();
        sets.add("alice", 1, 3);
        sets.add("alice", 2, 7);
        assert_eq!(sets.stakes_of_at("alice", 3), BTreeSet::from([1]));
        assert_eq!(sets.stakes_of_at("alice", 6), BTreeSet::from([1]));
        assert_eq!(sets.stakes_of_at("alice", 7), BTreeSet::from([1, 2]));
        assert_eq!(sets.stakes_of_at("alice", 100), BTreeSet::from([1, 2]));
    }

    #[test]
    fn test_pending_snapshot_edited_in_place() {
        let mut sets = BeneficiarySets::new();
        sets.add("alice", 1, 5);
        sets.add("alice", 2, 5);
        sets.remove("alice", 1, 5).unwrap();
        assert_eq!(sets.stakes_of_at("alice", 5), BTreeSet::from([2]));
        assert!(sets.stakes_of_at("alice", 4).is_empty());
    }

    #[test]
    fn test_removal_preserves_history() {
        let mut sets = BeneficiarySets::new();
        sets.add("alice", 1, 3);
        sets.remove("alice", 1, 8).unwrap();
        assert_eq!(sets.stakes_of_at("alice", 7), BTreeSet::from([1]));
        assert!(sets.stakes_of_at("alice", 8).is_empty());
    }

    #[test]
    fn test_remove_missing_id_fails() {
        let mut sets = BeneficiarySets::new();
        assert!(matches!(
            sets.remove("alice", 1, 5),
            Err(StakingError::StakeNotFound(1))
        ));
        sets.add("alice", 1, 5);
        assert!(matches!(
            sets.remove("alice", 2, 5),
            Err(StakingError::StakeNotFound(2))
        ));
    }

    #[test]
    fn test_holds_tracks_latest_snapshot() {
        let mut sets = BeneficiarySets::new();
        sets.add("alice", 1, 5);
        assert!(sets.holds("alice", 1));
        sets.remove("alice", 1, 9).unwrap();
        assert!(!sets.holds("alice", 1));
    }
}
