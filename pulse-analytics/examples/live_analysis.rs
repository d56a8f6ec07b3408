use chrono::Utc;
use pulse_analytics::{AnalysisEngine, Observation};
use pulse_instrument::SegmentKind;
use rust_decimal::Decimal;
use smol_str::SmolStr;

#[tokio::main]
async fn main() {
    // Initialise INFO Tracing log subscriber
    init_logging();

    let engine = AnalysisEngine::default();

    // Consume the engine's update stream the way a dashboard would
    let mut updates = engine.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(result) = updates.recv().await {
            println!(
                "[{}] {} | vwap {} | ema {}/{} | iv {} ({}) | vol {} ({}) | {}",
                result.time_received.format("%H:%M:%S%.3f"),
                result.symbol,
                result.vwap.round_dp(2),
                result.short_ema.round_dp(2),
                result.long_ema.round_dp(2),
                result.current_iv,
                result.iv_signal,
                result.current_volume,
                result.volume_signal,
                result.trading_signal,
            );
        }
    });

    // Synthetic tick tape: a drifting option series plus a cash stock
    let mut cumulative_volume = 0u64;
    for step in 0u32..20 {
        let drift = Decimal::from(step) * Decimal::new(5, 1);
        cumulative_volume += 250 + u64::from(step) * 40;

        engine.submit(Observation {
            instrument_id: SmolStr::new("43125"),
            display_name: "NIFTY 28 AUG 24500 CALL".to_string(),
            last_price: Decimal::from(182) + drift,
            avg_trade_price: Decimal::from(181) + drift,
            last_traded_quantity: 75,
            cumulative_volume,
            implied_volatility: Decimal::new(14, 2) + Decimal::from(step) * Decimal::new(2, 3),
            segment: SegmentKind::Derivative,
            is_future: false,
            underlying_symbol: "NIFTY".to_string(),
            time_received: Utc::now(),
        });

        engine.submit(Observation {
            instrument_id: SmolStr::new("1333"),
            display_name: "HDFCBANK".to_string(),
            last_price: Decimal::from(1645) - drift,
            avg_trade_price: Decimal::from(1646) - drift,
            last_traded_quantity: 120,
            cumulative_volume: cumulative_volume * 3,
            implied_volatility: Decimal::ZERO,
            segment: SegmentKind::Equity,
            is_future: false,
            underlying_symbol: String::new(),
            time_received: Utc::now(),
        });

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    drop(engine);
    let _ = printer.await;
}

// Initialise an INFO `Subscriber` for `Tracing` logs
fn init_logging() {
    tracing_subscriber::fmt()
        // Filter messages based on the INFO level
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        // Use colored output in debug mode
        .with_ansi(cfg!(debug_assertions))
        // Install this Tracing subscriber as global default
        .init()
}
