use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Parameters read by every calculator on each update.
///
/// Copy-on-read: the engine snapshots the whole struct once per submitted
/// observation, so a concurrent setter is observed either entirely before or
/// entirely after any given update - never torn. Changing the EMA lengths
/// affects only future recurrence steps; already-seeded EMAs are untouched.
#[derive(Copy, Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Length of the fast EMA recurrence.
    pub short_ema_length: usize,
    /// Length of the slow EMA recurrence.
    pub long_ema_length: usize,
    /// How many IV samples the per-instrument history retains.
    pub iv_history_capacity: usize,
    /// Absolute distance from the rolling IV average that counts as a
    /// spike/drop.
    pub iv_spike_threshold: Decimal,
    /// Positive-IV samples required before the IV signal may fire.
    pub min_iv_samples_for_signal: usize,
    /// How many volume samples the per-instrument history retains.
    pub volume_history_capacity: usize,
    /// Current volume must exceed the rolling average by this factor to count
    /// as a burst.
    pub volume_burst_multiplier: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            short_ema_length: 9,
            long_ema_length: 21,
            iv_history_capacity: 15,
            iv_spike_threshold: Decimal::new(1, 2),
            min_iv_samples_for_signal: 2,
            volume_history_capacity: 12,
            volume_burst_multiplier: 2.0,
        }
    }
}

impl AnalysisConfig {
    /// Check every field is usable by the calculators.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.short_ema_length == 0 || self.long_ema_length == 0 {
            return Err(ConfigError::ZeroEmaLength);
        }
        if self.iv_history_capacity == 0 || self.volume_history_capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }
        if self.min_iv_samples_for_signal == 0 {
            return Err(ConfigError::ZeroMinIvSamples);
        }
        if self.iv_spike_threshold < Decimal::ZERO {
            return Err(ConfigError::NegativeIvSpikeThreshold(self.iv_spike_threshold));
        }
        if !self.volume_burst_multiplier.is_finite() || self.volume_burst_multiplier <= 0.0 {
            return Err(ConfigError::InvalidBurstMultiplier(self.volume_burst_multiplier));
        }
        Ok(())
    }
}
