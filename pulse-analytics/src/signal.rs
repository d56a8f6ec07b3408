use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Discrete implied-volatility classification for one update.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
pub enum IvSignal {
    #[serde(rename = "IV Spike Up")]
    SpikeUp,
    #[serde(rename = "IV Drop Down")]
    DropDown,
    /// Positive IV observed, but not enough history yet to judge it.
    /// Distinguishes "no data yet" from a confirmed neutral reading.
    #[serde(rename = "Building History")]
    BuildingHistory,
    #[serde(rename = "Neutral")]
    Neutral,
}

impl IvSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            IvSignal::SpikeUp => "IV Spike Up",
            IvSignal::DropDown => "IV Drop Down",
            IvSignal::BuildingHistory => "Building History",
            IvSignal::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for IvSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Discrete traded-volume classification for one update.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
pub enum VolumeSignal {
    #[serde(rename = "Volume Burst")]
    Burst,
    #[serde(rename = "Neutral")]
    Neutral,
}

impl VolumeSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeSignal::Burst => "Volume Burst",
            VolumeSignal::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for VolumeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Discrete trading-state label synthesized from price, VWAP, both EMAs and
/// the IV/volume anomaly readings.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
pub enum TradingSignal {
    #[serde(rename = "Strong Bullish")]
    StrongBullish,
    /// Strong-bullish variant while only the short EMA is seeded.
    #[serde(rename = "Strong Bullish (Short EMA)")]
    StrongBullishShort,
    #[serde(rename = "Bullish: Above Both EMAs")]
    AboveBothEmas,
    #[serde(rename = "Bearish: Below Both EMAs")]
    BelowBothEmas,
    #[serde(rename = "Bullish Crossover (Short > Long)")]
    BullishCrossover,
    #[serde(rename = "Bearish Crossover (Short < Long)")]
    BearishCrossover,
    #[serde(rename = "Bullish: Above Short EMA")]
    AboveShortEma,
    #[serde(rename = "Bearish: Below Short EMA")]
    BelowShortEma,
    /// IV spike and volume burst landed on an already-bullish base label.
    #[serde(rename = "Strong Buy Signal (Spike)")]
    StrongBuySpike,
    /// IV spike and volume burst without bullish price confirmation.
    #[serde(rename = "Potential Spike (IV/Vol)")]
    PotentialSpike,
    #[serde(rename = "Neutral")]
    Neutral,
}

impl TradingSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradingSignal::StrongBullish => "Strong Bullish",
            TradingSignal::StrongBullishShort => "Strong Bullish (Short EMA)",
            TradingSignal::AboveBothEmas => "Bullish: Above Both EMAs",
            TradingSignal::BelowBothEmas => "Bearish: Below Both EMAs",
            TradingSignal::BullishCrossover => "Bullish Crossover (Short > Long)",
            TradingSignal::BearishCrossover => "Bearish Crossover (Short < Long)",
            TradingSignal::AboveShortEma => "Bullish: Above Short EMA",
            TradingSignal::BelowShortEma => "Bearish: Below Short EMA",
            TradingSignal::StrongBuySpike => "Strong Buy Signal (Spike)",
            TradingSignal::PotentialSpike => "Potential Spike (IV/Vol)",
            TradingSignal::Neutral => "Neutral",
        }
    }

    /// Whether the label reads as bullish (used by the spike overlay).
    pub fn is_bullish(&self) -> bool {
        matches!(
            self,
            TradingSignal::StrongBullish
                | TradingSignal::StrongBullishShort
                | TradingSignal::AboveBothEmas
                | TradingSignal::BullishCrossover
                | TradingSignal::AboveShortEma
        )
    }
}

impl std::fmt::Display for TradingSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synthesize the trading signal for one update.
///
/// Price rules run first (ordered, first match wins), then the IV/volume
/// spike overlay may override the base label.
pub fn synthesize(
    price: Decimal,
    vwap: Decimal,
    short_ema: Decimal,
    long_ema: Decimal,
    iv_signal: IvSignal,
    volume_signal: VolumeSignal,
) -> TradingSignal {
    let base = base_signal(price, vwap, short_ema, long_ema);

    if iv_signal == IvSignal::SpikeUp && volume_signal == VolumeSignal::Burst {
        if base.is_bullish() {
            TradingSignal::StrongBuySpike
        } else {
            TradingSignal::PotentialSpike
        }
    } else {
        base
    }
}

/// Ordered price/EMA/VWAP rule table.
///
/// A zero EMA is the unseeded sentinel, so the table degrades from dual-EMA
/// rules to short-only rules to plain neutral as state warms up. The
/// strong-bullish rungs additionally require a meaningful (positive) VWAP:
/// before any volume has traded the session VWAP is still zero and price
/// sitting above it carries no information.
fn base_signal(price: Decimal, vwap: Decimal, short_ema: Decimal, long_ema: Decimal) -> TradingSignal {
    let zero = Decimal::ZERO;

    if short_ema > zero && long_ema > zero {
        if price > short_ema && price > long_ema && vwap > zero && price > vwap {
            TradingSignal::StrongBullish
        } else if price > short_ema && price > long_ema {
            TradingSignal::AboveBothEmas
        } else if price < short_ema && price < long_ema {
            TradingSignal::BelowBothEmas
        } else if short_ema > long_ema && price > short_ema {
            TradingSignal::BullishCrossover
        } else if short_ema < long_ema && price < short_ema {
            TradingSignal::BearishCrossover
        } else if price > short_ema {
            TradingSignal::AboveShortEma
        } else if price < short_ema {
            TradingSignal::BelowShortEma
        } else {
            TradingSignal::Neutral
        }
    } else if short_ema > zero {
        if price > short_ema && vwap > zero && price > vwap {
            TradingSignal::StrongBullishShort
        } else if price > short_ema {
            TradingSignal::AboveShortEma
        } else if price < short_ema {
            TradingSignal::BelowShortEma
        } else {
            TradingSignal::Neutral
        }
    } else {
        TradingSignal::Neutral
    }
}
