use serde::{Deserialize, Serialize};

/// Exchange segment an instrument trades in, as resolved by the reference-data
/// layer before an observation reaches the engine.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize,
)]
pub enum SegmentKind {
    /// A cash index (e.g. Nifty 50, Sensex) - quoted, never traded directly.
    Index,
    /// A cash-market equity.
    Equity,
    /// A derivative contract (future or option) on some underlying.
    Derivative,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Index => "Index",
            SegmentKind::Equity => "Equity",
            SegmentKind::Derivative => "Derivative",
        }
    }
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
