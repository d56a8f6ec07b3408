use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors generated in `pulse-analytics`.
///
/// The tick path itself is infallible - malformed observations are clamped at
/// the boundary rather than rejected - so the only fallible surface is live
/// configuration validation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Error)]
pub enum ConfigError {
    #[error("EMA length must be non-zero")]
    ZeroEmaLength,

    #[error("history capacity must be non-zero")]
    ZeroHistoryCapacity,

    #[error("minimum IV sample count must be non-zero")]
    ZeroMinIvSamples,

    #[error("IV spike threshold must be non-negative, got: {0}")]
    NegativeIvSpikeThreshold(Decimal),

    #[error("volume burst multiplier must be finite and positive, got: {0}")]
    InvalidBurstMultiplier(f64),
}
