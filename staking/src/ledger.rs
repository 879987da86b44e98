//! Bitpacked epoch-indexed power ledger
//!
//! Namespace-addressable store of per-epoch signed power deltas. Two
//! consecutive epochs share one 128-bit word (even epoch in the low lane,
//! odd epoch in the high lane), halving map entries for the sequential
//! scans the total-power fold performs.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, StakingError};

/// Logical partition of the ledger keyspace.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace([u8; 32]);

impl Namespace {
    /// Namespace holding the global total-power deltas.
    pub const TOTAL_POWER: Namespace = Namespace([0u8; 32]);

    /// Derive a stable namespace from an arbitrary entity key.
    pub fn derive(key: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"velock:namespace:");
        hasher.update(key.as_bytes());
        Namespace(hasher.finalize().into())
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({})", hex::encode(&self.0[..8]))
    }
}

/// Sparse store of packed epoch-delta words.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpochLedger {
    words: HashMap<(Namespace, u64), u128>,
}

impl EpochLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored for `(namespace, epoch)`; unwritten slots read as zero.
    pub fn get(&self, namespace: Namespace, epoch: u64) -> i64 {
        let word = self
            .words
            .get(&(namespace, epoch / 2))
            .copied()
            .unwrap_or(0);
        unpack_lane(word, epoch)
    }

    /// Add `delta` to the stored value. Accounting is additive: independent
    /// stakes contribute to the same epoch slot.
    pub fn update(&mut self, namespace: Namespace, epoch: u64, delta: i64) -> Result<()> {
        let merged = self
            .get(namespace, epoch)
            .checked_add(delta)
            .ok_or(StakingError::PowerOverflow(epoch))?;
        self.write(namespace, epoch, merged);
        Ok(())
    }

    /// Overwrite the stored value. Only the total-power fold uses this, when
    /// it replaces a delta with the frozen absolute value.
    pub fn set(&mut self, namespace: Namespace, epoch: u64, value: i64) {
        self.write(namespace, epoch, value);
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    fn write(&mut self, namespace: Namespace, epoch: u64, value: i64) {
        let word = self.words.entry((namespace, epoch / 2)).or_insert(0);
        *word = pack_lane(*word, epoch, value);
    }
}

fn unpack_lane(word: u128, epoch: u64) -> i64 {
    let shift = (epoch % 2) * 64;
    ((word >> shift) as u64) as i64
}

fn pack_lane(word: u128, epoch: u64, value: i64) -> u128 {
    let shift = (epoch % 2) * 64;
    let mask = (u64::MAX as u128) << shift;
    (word & !mask) | (((value as u64) as u128) << shift)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lanes_are_independent() {
        let mut ledger = EpochLedger::new();
        let ns = Namespace::TOTAL_POWER;
        ledger.update(ns, 4, 1_000).unwrap();
        ledger.update(ns, 5, -250).unwrap();
        assert_eq!(ledger.get(ns, 4), 1_000);
        assert_eq!(ledger.get(ns, 5), -250);
        // Both epochs live in the same physical word.
        assert_eq!(ledger.word_count(), 1);
    }

    #[test]
    fn test_update_is_additive() {
        let mut ledger = EpochLedger::new();
        let ns = Namespace::TOTAL_POWER;
        ledger.update(ns, 7, 500).unwrap();
        ledger.update(ns, 7, 300).unwrap();
        ledger.update(ns, 7, -200).unwrap();
        assert_eq!(ledger.get(ns, 7), 600);
    }

    #[test]
    fn test_set_overwrites() {
        let mut ledger = EpochLedger::new();
        let ns = Namespace::TOTAL_POWER;
        ledger.update(ns, 2, 42).unwrap();
        ledger.set(ns, 2, 1_000);
        assert_eq!(ledger.get(ns, 2), 1_000);
    }

    #[test]
    fn test_update_overflow_rejected() {
        let mut ledger = EpochLedger::new();
        let ns = Namespace::TOTAL_POWER;
        ledger.update(ns, 0, i64::MAX).unwrap();
        assert!(matches!(
            ledger.update(ns, 0, 1),
            Err(StakingError::PowerOverflow(0))
        ));
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let mut ledger = EpochLedger::new();
        let alice = Namespace::derive("alice");
        let bob = Namespace::derive("bob");
        assert_ne!(alice, bob);
        assert_ne!(alice, Namespace::TOTAL_POWER);
        ledger.update(alice, 3, 111).unwrap();
        ledger.update(bob, 3, 222).unwrap();
        assert_eq!(ledger.get(alice, 3), 111);
        assert_eq!(ledger.get(bob, 3), 222);
        assert_eq!(ledger.get(Namespace::TOTAL_POWER, 3), 0);
    }

    #[test]
    fn test_derive_is_deterministic() {
        assert_eq!(Namespace::derive("alice"), Namespace::derive("alice"));
    }

    #[test]
    fn test_word_packing_halves_entries() {
        let mut ledger = EpochLedger::new();
        let ns = Namespace::TOTAL_POWER;
        for epoch in 0..8 {
            ledger.update(ns, epoch, 1).unwrap();
        }
        assert_eq!(ledger.word_count(), 4);
    }
}
