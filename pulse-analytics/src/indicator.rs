use crate::{
    config::AnalysisConfig,
    history::BoundedHistory,
    signal::{IvSignal, VolumeSignal},
};
use derive_more::Constructor;
use rust_decimal::Decimal;

/// Running indicator accumulators for a single instrument.
///
/// Owned exclusively by the [`InstrumentStateStore`](crate::store::InstrumentStateStore)
/// and only ever mutated inside its keyed critical section. A zero EMA is the
/// unseeded sentinel: the seed is a strictly positive price, so a live EMA of
/// exactly zero cannot occur, and once seeded an EMA is never reset.
#[derive(Debug, Clone)]
pub struct IndicatorState {
    pub cumulative_price_volume: Decimal,
    pub cumulative_volume: u64,
    pub short_ema: Decimal,
    pub long_ema: Decimal,
    pub iv_history: BoundedHistory<Decimal>,
    pub volume_history: BoundedHistory<u64>,
}

impl IndicatorState {
    /// Zero-valued state for a never-seen instrument.
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            cumulative_price_volume: Decimal::ZERO,
            cumulative_volume: 0,
            short_ema: Decimal::ZERO,
            long_ema: Decimal::ZERO,
            iv_history: BoundedHistory::new(config.iv_history_capacity),
            volume_history: BoundedHistory::new(config.volume_history_capacity),
        }
    }
}

/// Derived implied-volatility reading for one update.
#[derive(Copy, Clone, PartialEq, Debug, Constructor)]
pub struct IvReading {
    pub current: Decimal,
    pub average: Decimal,
    pub signal: IvSignal,
}

/// Derived traded-volume reading for one update.
#[derive(Copy, Clone, PartialEq, Debug, Constructor)]
pub struct VolumeReading {
    pub current: u64,
    pub average: u64,
    pub signal: VolumeSignal,
}

/// Fold one trade into the session VWAP accumulators and return the refreshed
/// VWAP.
///
/// Session-cumulative by contract: the accumulators run from the instrument's
/// first observation and are never reset here - a fresh session means fresh
/// state.
pub fn update_vwap(state: &mut IndicatorState, avg_trade_price: Decimal, quantity: u64) -> Decimal {
    state.cumulative_price_volume += avg_trade_price * Decimal::from(quantity);
    state.cumulative_volume += quantity;

    if state.cumulative_volume > 0 {
        state.cumulative_price_volume / Decimal::from(state.cumulative_volume)
    } else {
        Decimal::ZERO
    }
}

/// Advance one EMA recurrence step and return the refreshed value.
///
/// The first observation seeds the EMA with the price itself - no smoothing
/// on the seed, which avoids an artificial ramp-up from zero.
pub fn update_ema(ema: &mut Decimal, last_price: Decimal, length: usize) -> Decimal {
    if ema.is_zero() {
        *ema = last_price;
    } else {
        let multiplier = Decimal::from(2u64) / Decimal::from(length as u64 + 1);
        *ema = (last_price - *ema) * multiplier + *ema;
    }
    *ema
}

/// Classify the current implied volatility against its bounded history.
///
/// Zero IV (non-option instruments, missing ticks) never enters the history
/// and never fires a signal. With fewer than the configured minimum of
/// positive samples the reading is `Building History` rather than a false
/// neutral.
pub fn evaluate_iv(
    state: &mut IndicatorState,
    current_iv: Decimal,
    config: &AnalysisConfig,
) -> IvReading {
    state.iv_history.set_capacity(config.iv_history_capacity);

    if current_iv <= Decimal::ZERO {
        return IvReading::new(Decimal::ZERO, Decimal::ZERO, IvSignal::Neutral);
    }

    state.iv_history.push(current_iv);

    let valid: Vec<Decimal> = state
        .iv_history
        .valid_values(|iv| *iv > Decimal::ZERO)
        .collect();

    if valid.len() < config.min_iv_samples_for_signal {
        return IvReading::new(current_iv, Decimal::ZERO, IvSignal::BuildingHistory);
    }

    let average = valid.iter().copied().sum::<Decimal>() / Decimal::from(valid.len() as u64);

    let signal = if current_iv > average + config.iv_spike_threshold {
        IvSignal::SpikeUp
    } else if current_iv < average - config.iv_spike_threshold {
        IvSignal::DropDown
    } else {
        IvSignal::Neutral
    };

    IvReading::new(current_iv, average, signal)
}

/// Classify the current session volume against its bounded history.
///
/// Every observation's cumulative volume is recorded, zero included. The
/// average is taken over the history after the push (the current sample
/// participates), and the burst comparison runs in `f64` since the multiplier
/// is a plain float.
pub fn evaluate_volume(
    state: &mut IndicatorState,
    current_volume: u64,
    config: &AnalysisConfig,
) -> VolumeReading {
    state.volume_history.set_capacity(config.volume_history_capacity);
    state.volume_history.push(current_volume);

    let len = state.volume_history.len();
    let average = if len > 0 {
        state.volume_history.iter().map(|v| v as f64).sum::<f64>() / len as f64
    } else {
        0.0
    };

    let signal = if average > 0.0 && (current_volume as f64) > average * config.volume_burst_multiplier
    {
        VolumeSignal::Burst
    } else {
        VolumeSignal::Neutral
    };

    VolumeReading::new(current_volume, average as u64, signal)
}
