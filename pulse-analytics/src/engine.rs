use crate::{
    config::AnalysisConfig,
    error::ConfigError,
    event::{AnalysisResult, Observation},
    indicator::{self, IndicatorState},
    signal,
    store::InstrumentStateStore,
};
use parking_lot::RwLock;
use pulse_instrument::classify;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Buffered capacity of the result broadcast channel. Slow subscribers that
/// fall further behind than this lag and skip, they never block `submit`.
const UPDATE_CHANNEL_CAPACITY: usize = 1024;

/// Streaming analysis engine: accepts one [`Observation`] per tick and
/// produces one [`AnalysisResult`], keeping independent running state per
/// instrument.
///
/// `submit` is synchronous, bounded-time CPU work - no I/O, no awaits. It may
/// be called from any number of feed threads concurrently; updates for one
/// instrument apply in submission order, distinct instruments in parallel.
///
/// State is never evicted and the session VWAP is cumulative from each
/// instrument's first observation, so a fresh trading session requires a
/// fresh engine.
#[derive(Debug)]
pub struct AnalysisEngine {
    config: Arc<RwLock<AnalysisConfig>>,
    store: InstrumentStateStore,
    update_tx: broadcast::Sender<AnalysisResult>,
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        let (update_tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            config: Arc::new(RwLock::new(AnalysisConfig::default())),
            store: InstrumentStateStore::new(),
            update_tx,
        }
    }
}

impl AnalysisEngine {
    /// Construct an engine with validated parameters.
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = Self::default();
        *engine.config.write() = config;
        Ok(engine)
    }

    /// Process one observation and return the refreshed analysis.
    ///
    /// Always succeeds: malformed values are clamped at the boundary
    /// (negative prices and IV become zero) so one corrupt tick degrades its
    /// own signal quality without disturbing any other instrument.
    pub fn submit(&self, observation: Observation) -> AnalysisResult {
        let observation = observation.sanitized();
        let config = *self.config.read();

        let classification = classify(
            observation.segment,
            observation.is_future,
            &observation.display_name,
            &observation.underlying_symbol,
        );
        let display_bucket = classification
            .group
            .display_bucket(&classification.underlying_group);

        let result = self.store.with_state(
            &observation.instrument_id,
            || {
                debug!(instrument = %observation.instrument_id, "tracking new instrument");
                IndicatorState::new(&config)
            },
            |state| {
                let vwap = indicator::update_vwap(
                    state,
                    observation.avg_trade_price,
                    observation.last_traded_quantity,
                );
                let short_ema = indicator::update_ema(
                    &mut state.short_ema,
                    observation.last_price,
                    config.short_ema_length,
                );
                let long_ema = indicator::update_ema(
                    &mut state.long_ema,
                    observation.last_price,
                    config.long_ema_length,
                );
                let iv = indicator::evaluate_iv(state, observation.implied_volatility, &config);
                let volume =
                    indicator::evaluate_volume(state, observation.cumulative_volume, &config);

                let trading_signal = signal::synthesize(
                    observation.last_price,
                    vwap,
                    short_ema,
                    long_ema,
                    iv.signal,
                    volume.signal,
                );

                AnalysisResult {
                    instrument_id: observation.instrument_id.clone(),
                    symbol: observation.display_name.clone(),
                    vwap,
                    short_ema,
                    long_ema,
                    trading_signal,
                    current_iv: iv.current,
                    avg_iv: iv.average,
                    iv_signal: iv.signal,
                    current_volume: volume.current,
                    avg_volume: volume.average,
                    volume_signal: volume.signal,
                    instrument_group: classification.group,
                    underlying_group: classification.underlying_group.clone(),
                    display_bucket,
                    time_received: observation.time_received,
                }
            },
        );

        // Fire-and-forget: a send only errors when no subscriber exists.
        let _ = self.update_tx.send(result.clone());

        result
    }

    /// Subscribe to the stream of results, one per processed observation.
    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisResult> {
        self.update_tx.subscribe()
    }

    /// Snapshot of the current parameters.
    pub fn config(&self) -> AnalysisConfig {
        *self.config.read()
    }

    /// Number of instruments with live state.
    pub fn instrument_count(&self) -> usize {
        self.store.len()
    }

    pub fn set_short_ema_length(&self, length: usize) -> Result<(), ConfigError> {
        self.update_config(|config| config.short_ema_length = length)
    }

    pub fn set_long_ema_length(&self, length: usize) -> Result<(), ConfigError> {
        self.update_config(|config| config.long_ema_length = length)
    }

    pub fn set_iv_history_capacity(&self, capacity: usize) -> Result<(), ConfigError> {
        self.update_config(|config| config.iv_history_capacity = capacity)
    }

    pub fn set_iv_spike_threshold(&self, threshold: Decimal) -> Result<(), ConfigError> {
        self.update_config(|config| config.iv_spike_threshold = threshold)
    }

    pub fn set_min_iv_samples_for_signal(&self, samples: usize) -> Result<(), ConfigError> {
        self.update_config(|config| config.min_iv_samples_for_signal = samples)
    }

    pub fn set_volume_history_capacity(&self, capacity: usize) -> Result<(), ConfigError> {
        self.update_config(|config| config.volume_history_capacity = capacity)
    }

    pub fn set_volume_burst_multiplier(&self, multiplier: f64) -> Result<(), ConfigError> {
        self.update_config(|config| config.volume_burst_multiplier = multiplier)
    }

    /// Validate-then-swap under the write lock: the updated copy only
    /// replaces the live parameters once it passes validation, and in-flight
    /// submissions keep the snapshot they already took.
    fn update_config(&self, apply: impl FnOnce(&mut AnalysisConfig)) -> Result<(), ConfigError> {
        let mut guard = self.config.write();
        let mut updated = *guard;
        apply(&mut updated);
        updated.validate()?;
        *guard = updated;
        drop(guard);
        info!(config = ?updated, "analysis parameters updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{IvSignal, TradingSignal, VolumeSignal};
    use chrono::Utc;
    use pulse_instrument::{DisplayBucket, InstrumentGroup, SegmentKind};
    use rust_decimal_macros::dec;
    use smol_str::SmolStr;

    fn observation(id: &str, last_price: Decimal) -> Observation {
        Observation {
            instrument_id: SmolStr::new(id),
            display_name: "HDFCBANK".to_string(),
            last_price,
            avg_trade_price: last_price,
            last_traded_quantity: 0,
            cumulative_volume: 0,
            implied_volatility: dec!(0),
            segment: SegmentKind::Equity,
            is_future: false,
            underlying_symbol: String::new(),
            time_received: Utc::now(),
        }
    }

    #[test]
    fn test_dual_ema_scenario_with_zero_volume() {
        // Prices [100, 102, 101, 105] on a fresh instrument with no traded
        // volume. Short EMA follows the seed-then-recurrence rule exactly,
        // and the 4th tick reads "Bullish: Above Both EMAs" - the VWAP is
        // still zero, so the strong-bullish rung stays off even though the
        // price sits above it numerically.
        let engine = AnalysisEngine::default();
        let prices = [dec!(100), dec!(102), dec!(101), dec!(105)];

        let mut last = None;
        for price in prices {
            last = Some(engine.submit(observation("2885", price)));
        }
        let result = last.unwrap();

        // Seed 100, then three steps at multiplier 0.2:
        // 100.4, 100.52, 101.416
        assert_eq!(result.short_ema, dec!(101.416));
        assert_eq!(result.vwap, dec!(0));
        assert!(result.long_ema > dec!(100) && result.long_ema < result.short_ema);
        assert_eq!(result.trading_signal, TradingSignal::AboveBothEmas);
    }

    #[test]
    fn test_first_observation_seeds_both_emas() {
        let engine = AnalysisEngine::default();

        let result = engine.submit(observation("2885", dec!(123.45)));

        assert_eq!(result.short_ema, dec!(123.45));
        assert_eq!(result.long_ema, dec!(123.45));
    }

    #[test]
    fn test_vwap_accumulates_across_submissions() {
        let engine = AnalysisEngine::default();

        let mut obs = observation("2885", dec!(100));
        obs.avg_trade_price = dec!(100);
        obs.last_traded_quantity = 10;
        engine.submit(obs);

        let mut obs = observation("2885", dec!(110));
        obs.avg_trade_price = dec!(110);
        obs.last_traded_quantity = 10;
        let result = engine.submit(obs);

        assert_eq!(result.vwap, dec!(105));
    }

    #[test]
    fn test_iv_spike_scenario() {
        let engine = AnalysisEngine::default();

        for iv in [dec!(0.20), dec!(0.21), dec!(0.19)] {
            let mut obs = observation("44444", dec!(100));
            obs.implied_volatility = iv;
            engine.submit(obs);
        }

        let mut obs = observation("44444", dec!(100));
        obs.implied_volatility = dec!(0.35);
        let result = engine.submit(obs);

        assert_eq!(result.iv_signal, IvSignal::SpikeUp);
        assert_eq!(result.current_iv, dec!(0.35));
        assert_eq!(result.avg_iv, dec!(0.2375));
    }

    #[test]
    fn test_iv_building_history_before_min_samples() {
        let engine = AnalysisEngine::default();

        let mut obs = observation("44444", dec!(100));
        obs.implied_volatility = dec!(0.20);
        let result = engine.submit(obs);

        assert_eq!(result.iv_signal, IvSignal::BuildingHistory);
        assert_eq!(result.avg_iv, dec!(0));
    }

    #[test]
    fn test_volume_burst_scenario() {
        let engine = AnalysisEngine::default();

        for volume in [100, 100, 100] {
            let mut obs = observation("2885", dec!(100));
            obs.cumulative_volume = volume;
            engine.submit(obs);
        }

        let mut obs = observation("2885", dec!(100));
        obs.cumulative_volume = 500;
        let result = engine.submit(obs);

        assert_eq!(result.volume_signal, VolumeSignal::Burst);
        assert_eq!(result.current_volume, 500);
    }

    #[test]
    fn test_spike_overlay_end_to_end() {
        let engine = AnalysisEngine::default();

        // Build IV history and rising prices with traded volume so the base
        // label is bullish by the final tick.
        for (price, iv, volume) in [
            (dec!(100), dec!(0.20), 100u64),
            (dec!(101), dec!(0.21), 100),
            (dec!(103), dec!(0.19), 100),
        ] {
            let mut obs = observation("9999", price);
            obs.display_name = "NIFTY 21 AUG 24500 CALL".to_string();
            obs.underlying_symbol = "NIFTY".to_string();
            obs.segment = SegmentKind::Derivative;
            obs.implied_volatility = iv;
            obs.cumulative_volume = volume;
            obs.avg_trade_price = price;
            obs.last_traded_quantity = 10;
            engine.submit(obs);
        }

        // IV spikes and session volume bursts on a bullish price move.
        let mut obs = observation("9999", dec!(110));
        obs.display_name = "NIFTY 21 AUG 24500 CALL".to_string();
        obs.underlying_symbol = "NIFTY".to_string();
        obs.segment = SegmentKind::Derivative;
        obs.implied_volatility = dec!(0.35);
        obs.cumulative_volume = 500;
        obs.avg_trade_price = dec!(110);
        obs.last_traded_quantity = 10;
        let result = engine.submit(obs);

        assert_eq!(result.iv_signal, IvSignal::SpikeUp);
        assert_eq!(result.volume_signal, VolumeSignal::Burst);
        assert_eq!(result.trading_signal, TradingSignal::StrongBuySpike);
        assert_eq!(result.instrument_group, InstrumentGroup::Options);
        assert_eq!(result.underlying_group, SmolStr::new("NIFTY"));
        assert_eq!(result.display_bucket, Some(DisplayBucket::NiftyOptions));
    }

    #[test]
    fn test_instrument_isolation() {
        let engine = AnalysisEngine::default();

        let mut obs = observation("A", dec!(100));
        obs.avg_trade_price = dec!(100);
        obs.last_traded_quantity = 50;
        engine.submit(obs);

        // B's first observation: its own state, untouched by A's volume.
        let result = engine.submit(observation("B", dec!(200)));

        assert_eq!(result.vwap, dec!(0));
        assert_eq!(result.short_ema, dec!(200));
        assert_eq!(engine.instrument_count(), 2);
    }

    #[test]
    fn test_negative_values_clamped_not_fatal() {
        let engine = AnalysisEngine::default();

        let mut obs = observation("A", dec!(-10));
        obs.avg_trade_price = dec!(-10);
        obs.implied_volatility = dec!(-1);
        let result = engine.submit(obs);

        // A zero price cannot seed the EMAs, so everything stays neutral.
        assert_eq!(result.short_ema, dec!(0));
        assert_eq!(result.trading_signal, TradingSignal::Neutral);
        assert_eq!(result.iv_signal, IvSignal::Neutral);

        // The next valid tick for the same instrument proceeds normally.
        let result = engine.submit(observation("A", dec!(100)));
        assert_eq!(result.short_ema, dec!(100));
    }

    #[test]
    fn test_config_changes_apply_to_future_steps_only() {
        let engine = AnalysisEngine::default();

        engine.submit(observation("A", dec!(100)));
        engine.set_short_ema_length(4).unwrap();

        // multiplier = 2 / (4 + 1) = 0.4; ema = (110 - 100) * 0.4 + 100
        let result = engine.submit(observation("A", dec!(110)));
        assert_eq!(result.short_ema, dec!(104.0));
        assert_eq!(engine.config().short_ema_length, 4);
    }

    #[test]
    fn test_config_setters_validate() {
        let engine = AnalysisEngine::default();

        assert_eq!(
            engine.set_short_ema_length(0),
            Err(ConfigError::ZeroEmaLength)
        );
        assert_eq!(
            engine.set_volume_burst_multiplier(-1.0),
            Err(ConfigError::InvalidBurstMultiplier(-1.0))
        );
        // A rejected update leaves the live parameters untouched.
        assert_eq!(engine.config(), AnalysisConfig::default());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = AnalysisConfig {
            long_ema_length: 0,
            ..AnalysisConfig::default()
        };
        assert!(AnalysisEngine::new(config).is_err());
    }

    #[tokio::test]
    async fn test_subscribers_receive_every_result() {
        let engine = AnalysisEngine::default();
        let mut updates = engine.subscribe();

        let submitted = engine.submit(observation("2885", dec!(100)));
        let received = updates.recv().await.unwrap();

        assert_eq!(received, submitted);
    }

    #[test]
    fn test_result_serializes_with_spec_labels() {
        let engine = AnalysisEngine::default();
        let result = engine.submit(observation("2885", dec!(100)));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["trading_signal"], "Neutral");
        assert_eq!(json["instrument_group"], "Stocks");
        assert_eq!(json["volume_signal"], "Neutral");
    }
}
