//! # Pulse-Instrument
//! Instrument identity and classification primitives used by the
//! [`pulse-analytics`] engine and any presentation layer sitting on top of it.
//!
//! The surrounding system resolves raw feed packets into observations that
//! already carry a segment, an underlying symbol and a future/option flavour;
//! this crate turns those fields into the discrete grouping labels the
//! dashboard buckets instruments by.
//!
//! [`pulse-analytics`]: https://crates.io/crates/pulse-analytics

/// Exchange segment of an instrument.
pub mod segment;

/// Instrument and underlying grouping labels, plus the classification rules
/// that derive them from observation fields.
pub mod group;

pub use group::{Classification, DisplayBucket, InstrumentGroup, classify};
pub use segment::SegmentKind;
