//! Lazy total-power materialization
//!
//! Per-epoch deltas in the `TOTAL_POWER` namespace stay raw until an
//! explicit fold replaces them with running absolutes up to a watermark
//! epoch. Reads past the watermark sum the remaining deltas on the fly
//! without persisting anything.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StakingError};
use crate::ledger::{EpochLedger, Namespace};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TotalPowerAccumulator {
    /// Highest epoch whose ledger slot holds a folded absolute total.
    /// Epoch 0 is trivially final: the earliest schedule entry is epoch 1.
    last_calculated_epoch: u64,
}

impl TotalPowerAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_calculated_epoch(&self) -> u64 {
        self.last_calculated_epoch
    }

    /// Total power at `epoch`. Folded epochs read straight from the ledger;
    /// later epochs add the raw deltas on the fly.
    pub fn total_power_at(&self, ledger: &EpochLedger, epoch: u64) -> Result<u64> {
        let watermark = self.last_calculated_epoch;
        if epoch <= watermark {
            let value = ledger.get(Namespace::TOTAL_POWER, epoch);
            return u64::try_from(value).map_err(|_| StakingError::NegativePower(epoch));
        }
        let mut running = ledger.get(Namespace::TOTAL_POWER, watermark) as i128;
        for e in (watermark + 1)..=epoch {
            running += ledger.get(Namespace::TOTAL_POWER, e) as i128;
            if running < 0 {
                return Err(StakingError::NegativePower(e));
            }
        }
        Ok(running as u64)
    }

    /// Fold raw deltas into absolutes through `epoch` and advance the
    /// watermark. Absolutes are computed and checked before anything is
    /// written, so a failure leaves the ledger untouched.
    pub fn calculate_up_to(
        &mut self,
        ledger: &mut EpochLedger,
        epoch: u64,
        current_epoch: u64,
    ) -> Result<()> {
        if epoch > current_epoch {
            return Err(StakingError::EpochStillRunning {
                epoch,
                current: current_epoch,
            });
        }
        let watermark = self.last_calculated_epoch;
        if epoch <= watermark {
            return Err(StakingError::PowerAlreadyCalculated { epoch, watermark });
        }
        let mut running = ledger.get(Namespace::TOTAL_POWER, watermark) as i128;
        let mut absolutes = Vec::with_capacity((epoch - watermark) as usize);
        for e in (watermark + 1)..=epoch {
            running += ledger.get(Namespace::TOTAL_POWER, e) as i128;
            if running < 0 {
                return Err(StakingError::NegativePower(e));
            }
            absolutes.push(running as i64);
        }
        for (offset, value) in absolutes.into_iter().enumerate() {
            ledger.set(Namespace::TOTAL_POWER, watermark + 1 + offset as u64, value);
        }
        self.last_calculated_epoch = epoch;
        log::debug!("total power folded through epoch {}", epoch);
        Ok(())
    }
}
