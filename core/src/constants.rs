//! Protocol constants

/// VELOCK token unit (8 decimal places)
pub const COIN: u64 = 100_000_000;

/// Hard cap on total token supply (1 billion VELOCK)
pub const MAX_SUPPLY: u64 = 1_000_000_000 * COIN;

/// Length of one epoch in seconds (4 weeks)
pub const EPOCH_SECONDS: i64 = 28 * 24 * 60 * 60;

/// Epochs per lockup year (13 x 4 weeks = 52 weeks)
pub const EPOCHS_PER_YEAR: u64 = 13;

/// Stake amounts must be a multiple of this unit so that hundredth-based
/// power multipliers never lose a fractional remainder
pub const MIN_STAKE_UNIT: u64 = 100;

/// Shortest allowed lockup (1 year)
pub const MIN_LOCKUP_EPOCHS: u64 = EPOCHS_PER_YEAR;

/// Longest standard lockup (5 years)
pub const MAX_LOCKUP_EPOCHS: u64 = 5 * EPOCHS_PER_YEAR;

/// The special extended lockup tier (10 years)
pub const EXTENDED_LOCKUP_EPOCHS: u64 = 10 * EPOCHS_PER_YEAR;
