//! Epoch clock
//!
//! Maps wall-clock time to monotonically increasing epoch numbers derived
//! from a fixed genesis timestamp and a fixed epoch length.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochClock {
    genesis: i64,
    epoch_seconds: i64,
}

impl EpochClock {
    /// Create a clock. The genesis timestamp must not be in the future.
    pub fn new(genesis: i64, epoch_seconds: i64) -> Result<Self> {
        if epoch_seconds <= 0 {
            return Err(CoreError::InvalidEpochLength(epoch_seconds));
        }
        let now = Utc::now().timestamp();
        if genesis > now {
            return Err(CoreError::GenesisInFuture { genesis, now });
        }
        Ok(EpochClock {
            genesis,
            epoch_seconds,
        })
    }

    /// Epoch containing `timestamp`. Timestamps before genesis map to 0.
    pub fn epoch_for(&self, timestamp: i64) -> u64 {
        if timestamp <= self.genesis {
            return 0;
        }
        ((timestamp - self.genesis) / self.epoch_seconds) as u64
    }

    /// Epoch containing the current wall-clock time.
    pub fn current_epoch(&self) -> u64 {
        self.epoch_for(Utc::now().timestamp())
    }

    /// Timestamp at which `epoch` begins.
    pub fn timestamp_for(&self, epoch: u64) -> i64 {
        self.genesis + epoch as i64 * self.epoch_seconds
    }

    pub fn genesis(&self) -> i64 {
        self.genesis
    }

    pub fn epoch_seconds(&self) -> i64 {
        self.epoch_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::EPOCH_SECONDS;

    #[test]
    fn test_epoch_for() {
        let clock = EpochClock::new(0, EPOCH_SECONDS).unwrap();
        assert_eq!(clock.epoch_for(0), 0);
        assert_eq!(clock.epoch_for(EPOCH_SECONDS - 1), 0);
        assert_eq!(clock.epoch_for(EPOCH_SECONDS), 1);
        assert_eq!(clock.epoch_for(13 * EPOCH_SECONDS), 13);
    }

    #[test]
    fn test_before_genesis_saturates_to_zero() {
        let clock = EpochClock::new(1_000, 100).unwrap();
        assert_eq!(clock.epoch_for(500), 0);
    }

    #[test]
    fn test_genesis_in_future_rejected() {
        let future = Utc::now().timestamp() + 3_600;
        assert!(EpochClock::new(future, 100).is_err());
    }

    #[test]
    fn test_invalid_epoch_length_rejected() {
        assert!(EpochClock::new(0, 0).is_err());
        assert!(EpochClock::new(0, -60).is_err());
    }

    #[test]
    fn test_timestamp_round_trip() {
        let clock = EpochClock::new(1_000, 60).unwrap();
        assert_eq!(clock.epoch_for(clock.timestamp_for(7)), 7);
        assert_eq!(clock.epoch_for(clock.timestamp_for(7) + 59), 7);
        assert_eq!(clock.epoch_for(clock.timestamp_for(8)), 8);
    }
}
