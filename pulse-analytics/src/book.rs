use crate::event::AnalysisResult;
use fnv::FnvHashMap;
use parking_lot::RwLock;
use smol_str::SmolStr;

/// Latest analysis per instrument, merged last-value-wins.
///
/// A convenience for presentation layers consuming the engine's update
/// stream: feed every received result through [`apply`](Self::apply) and
/// render from [`snapshot`](Self::snapshot). The engine itself does not
/// depend on it.
#[derive(Debug, Default)]
pub struct ResultBook {
    latest: RwLock<FnvHashMap<SmolStr, AnalysisResult>>,
}

impl ResultBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one result, replacing any previous entry for its instrument.
    pub fn apply(&self, result: AnalysisResult) {
        self.latest
            .write()
            .insert(result.instrument_id.clone(), result);
    }

    /// Latest result for one instrument, if any has been applied.
    pub fn get(&self, instrument_id: &str) -> Option<AnalysisResult> {
        self.latest.read().get(instrument_id).cloned()
    }

    /// Clone of every instrument's latest result.
    pub fn snapshot(&self) -> Vec<AnalysisResult> {
        self.latest.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.latest.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AnalysisConfig, engine::AnalysisEngine, event::Observation};
    use chrono::Utc;
    use pulse_instrument::SegmentKind;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use smol_str::SmolStr;

    fn result_for(engine: &AnalysisEngine, id: &str, price: Decimal) -> crate::AnalysisResult {
        engine.submit(Observation {
            instrument_id: SmolStr::new(id),
            display_name: id.to_string(),
            last_price: price,
            avg_trade_price: price,
            last_traded_quantity: 0,
            cumulative_volume: 0,
            implied_volatility: dec!(0),
            segment: SegmentKind::Equity,
            is_future: false,
            underlying_symbol: String::new(),
            time_received: Utc::now(),
        })
    }

    #[test]
    fn test_last_value_wins() {
        let engine = AnalysisEngine::new(AnalysisConfig::default()).unwrap();
        let book = ResultBook::new();

        book.apply(result_for(&engine, "A", dec!(100)));
        book.apply(result_for(&engine, "B", dec!(50)));
        book.apply(result_for(&engine, "A", dec!(110)));

        assert_eq!(book.len(), 2);
        let latest = book.get("A").unwrap();
        // Second submission's EMA, not the seed.
        assert_eq!(latest.short_ema, dec!(102));
        assert!(book.get("C").is_none());
        assert_eq!(book.snapshot().len(), 2);
    }
}
