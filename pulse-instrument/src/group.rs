use crate::segment::SegmentKind;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Top-level grouping of an instrument for aggregate display.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
pub enum InstrumentGroup {
    #[serde(rename = "Indices")]
    Indices,
    #[serde(rename = "Futures")]
    Futures,
    #[serde(rename = "Options")]
    Options,
    #[serde(rename = "Stocks")]
    Stocks,
}

impl InstrumentGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentGroup::Indices => "Indices",
            InstrumentGroup::Futures => "Futures",
            InstrumentGroup::Options => "Options",
            InstrumentGroup::Stocks => "Stocks",
        }
    }

    /// Fold an underlying name into its display bucket.
    ///
    /// A convenience for dashboards only - buckets exist for the derivative
    /// groups, cash instruments have none. Substring matching is intentional:
    /// an underlying like "NIFTY 25JUL FUT" still lands in the index bucket.
    /// BANKNIFTY is tested before NIFTY since the former contains the latter.
    pub fn display_bucket(&self, underlying: &str) -> Option<DisplayBucket> {
        let underlying = underlying.to_uppercase();
        match self {
            InstrumentGroup::Options => Some(if underlying.contains("BANKNIFTY") {
                DisplayBucket::BankniftyOptions
            } else if underlying.contains("SENSEX") {
                DisplayBucket::SensexOptions
            } else if underlying.contains("NIFTY") {
                DisplayBucket::NiftyOptions
            } else {
                DisplayBucket::OtherStockOptions
            }),
            InstrumentGroup::Futures => {
                Some(if underlying.contains("NIFTY") || underlying.contains("SENSEX") {
                    DisplayBucket::IndexFutures
                } else {
                    DisplayBucket::StockFutures
                })
            }
            InstrumentGroup::Indices | InstrumentGroup::Stocks => None,
        }
    }
}

impl std::fmt::Display for InstrumentGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Display bucket an underlying group folds into.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
pub enum DisplayBucket {
    #[serde(rename = "Nifty Options")]
    NiftyOptions,
    #[serde(rename = "Banknifty Options")]
    BankniftyOptions,
    #[serde(rename = "Sensex Options")]
    SensexOptions,
    #[serde(rename = "Other Stock Options")]
    OtherStockOptions,
    #[serde(rename = "Index Futures")]
    IndexFutures,
    #[serde(rename = "Stock Futures")]
    StockFutures,
}

impl DisplayBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayBucket::NiftyOptions => "Nifty Options",
            DisplayBucket::BankniftyOptions => "Banknifty Options",
            DisplayBucket::SensexOptions => "Sensex Options",
            DisplayBucket::OtherStockOptions => "Other Stock Options",
            DisplayBucket::IndexFutures => "Index Futures",
            DisplayBucket::StockFutures => "Stock Futures",
        }
    }
}

impl std::fmt::Display for DisplayBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Instrument classification derived from observation fields alone.
#[derive(Clone, Eq, PartialEq, Debug, Deserialize, Serialize)]
pub struct Classification {
    pub group: InstrumentGroup,
    /// Root symbol the instrument aggregates under: the underlying symbol for
    /// derivatives, the display name itself for cash instruments.
    pub underlying_group: SmolStr,
}

/// Classify an instrument from the fields the feed resolution already carries.
///
/// Rules are ordered: index segments win over everything (index futures carry
/// `is_future` and are caught second), and the CALL/PUT scan of the display
/// name is case-insensitive.
pub fn classify(
    segment: SegmentKind,
    is_future: bool,
    display_name: &str,
    underlying_symbol: &str,
) -> Classification {
    if segment == SegmentKind::Index {
        return Classification {
            group: InstrumentGroup::Indices,
            underlying_group: SmolStr::new(display_name),
        };
    }

    if is_future {
        return Classification {
            group: InstrumentGroup::Futures,
            underlying_group: SmolStr::new(underlying_symbol),
        };
    }

    let name = display_name.to_uppercase();
    if name.contains("CALL") || name.contains("PUT") {
        return Classification {
            group: InstrumentGroup::Options,
            underlying_group: SmolStr::new(underlying_symbol),
        };
    }

    Classification {
        group: InstrumentGroup::Stocks,
        underlying_group: SmolStr::new(display_name),
    }
}
