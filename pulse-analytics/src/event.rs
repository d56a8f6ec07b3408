use chrono::{DateTime, Utc};
use pulse_instrument::{DisplayBucket, InstrumentGroup, SegmentKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::signal::{IvSignal, TradingSignal, VolumeSignal};

/// One per-instrument market-data update, as delivered by the feed adapter
/// with identity fields already resolved.
///
/// `cumulative_volume` is the running session total, not a per-tick delta.
/// `implied_volatility` is zero for instruments it does not apply to.
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct Observation {
    pub instrument_id: SmolStr,
    pub display_name: String,
    pub last_price: Decimal,
    pub avg_trade_price: Decimal,
    pub last_traded_quantity: u64,
    pub cumulative_volume: u64,
    pub implied_volatility: Decimal,
    pub segment: SegmentKind,
    pub is_future: bool,
    pub underlying_symbol: String,
    pub time_received: DateTime<Utc>,
}

impl Observation {
    /// Clamp boundary-invalid values so feed corruption degrades signal
    /// quality instead of halting ingestion. Quantities are unsigned by type;
    /// negative prices and IV clamp to zero.
    pub(crate) fn sanitized(mut self) -> Self {
        if self.last_price < Decimal::ZERO {
            self.last_price = Decimal::ZERO;
        }
        if self.avg_trade_price < Decimal::ZERO {
            self.avg_trade_price = Decimal::ZERO;
        }
        if self.implied_volatility < Decimal::ZERO {
            self.implied_volatility = Decimal::ZERO;
        }
        self
    }
}

/// One refreshed analysis, emitted per processed [`Observation`].
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct AnalysisResult {
    pub instrument_id: SmolStr,
    /// Display name of the instrument, carried through for presentation.
    pub symbol: String,
    pub vwap: Decimal,
    pub short_ema: Decimal,
    pub long_ema: Decimal,
    pub trading_signal: TradingSignal,
    pub current_iv: Decimal,
    pub avg_iv: Decimal,
    pub iv_signal: IvSignal,
    pub current_volume: u64,
    pub avg_volume: u64,
    pub volume_signal: VolumeSignal,
    pub instrument_group: InstrumentGroup,
    pub underlying_group: SmolStr,
    /// Dashboard bucket for derivative groups, `None` for cash instruments.
    pub display_bucket: Option<DisplayBucket>,
    /// When the observation that produced this result was received.
    pub time_received: DateTime<Utc>,
}
