//! # Pulse-Analytics
//! Streaming per-instrument analysis engine: every submitted market-data
//! observation yields a refreshed indicator set (session VWAP, dual-length
//! EMA, IV and volume anomaly readings) and one discrete trading-signal
//! label, keyed by instrument.
//!
//! ## Design
//! The engine is a pure, synchronous computation - no I/O, no awaits. Feed
//! tasks call [`AnalysisEngine::submit`] concurrently; updates for one
//! instrument are serialized in arrival order while distinct instruments
//! proceed in parallel. Each result is also fanned out on a broadcast
//! channel ([`AnalysisEngine::subscribe`]) for presentation layers.
//!
//! Per-instrument state is cumulative for the engine's lifetime: nothing is
//! evicted and the session VWAP runs from each instrument's first
//! observation, so a fresh trading session requires a fresh engine.

/// Result cache holding the latest analysis per instrument.
pub mod book;

/// Live-tunable analysis parameters.
pub mod config;

/// Errors surfaced when validating configuration updates.
pub mod error;

/// Engine facade - one observation in, one result out.
pub mod engine;

/// Input observations and output analysis results.
pub mod event;

/// Bounded drop-oldest sample history.
pub mod history;

/// Incremental indicator calculators and per-instrument state.
pub mod indicator;

/// Trading-signal rule table.
pub mod signal;

/// Keyed per-instrument state store with serialized per-key access.
pub mod store;

pub use book::ResultBook;
pub use config::AnalysisConfig;
pub use engine::AnalysisEngine;
pub use error::ConfigError;
pub use event::{AnalysisResult, Observation};
pub use signal::{IvSignal, TradingSignal, VolumeSignal};
