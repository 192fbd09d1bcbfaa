//! Example polling cycle: evaluate markets, gate on the kill-switch, record fills

use common::telemetry::init_logging;
use common::{Instant, Market, OrderSide, Temperature, Trade, TracingNotifier};
use portfolio_risk::{RiskConfig, RiskManager};
use signal_generation::{SignalConfig, SignalGenerator, SignalInput, SignalPipeline};
use std::sync::Arc;
use tracing::Level;

fn main() -> anyhow::Result<()> {
    init_logging(Level::INFO);
    println!("=== Weather Market Decision Cycle ===\n");

    let notifier = Arc::new(TracingNotifier);
    let pipeline = SignalPipeline::new(SignalGenerator::new(
        SignalConfig::default(),
        notifier.clone(),
    )?);
    let mut risk = RiskManager::with_sizing_budget(
        RiskConfig::default(),
        pipeline.generator().config().budget,
        notifier,
    )?;

    // Step 1: Markets handed over by discovery
    let now = Instant::from_local_time("2024-07-15T09:00:00", "America/Chicago")?;
    let deadline = Instant::from_local_time("2024-07-15T23:59:59", "America/Chicago")?;
    let markets = vec![
        Market::new(
            "chicago-high-33",
            "chicago-high-33-yes",
            "KORD",
            Some(Temperature::from_celsius(33.0)?),
            None,
            deadline,
        )?,
        Market::new(
            "chicago-high-30-31",
            "chicago-high-30-31-yes",
            "KORD",
            Some(Temperature::from_celsius(30.0)?),
            Some(Temperature::from_celsius(31.0)?),
            deadline,
        )?,
    ];
    println!("Deadline: {} ({} away)\n", deadline, deadline - now);

    // Step 2: Current reading from the feed client
    let reading = Temperature::from_celsius(31.4)?;
    let inputs: Vec<_> = markets
        .into_iter()
        .map(|market| SignalInput::with_placeholder_price(market, reading))
        .collect();

    // Step 3: Data quality and loss checks before trading
    if let Some(reason) = risk.check_data_quality(Some(reading.into()), None, "KORD", &now) {
        risk.activate(reason, &now);
    }
    let status = risk.enforce(&now);

    // Step 4: Evaluate and act
    let report = pipeline.process(&inputs, &now);
    println!(
        "Signals: {}  expired: {}  low EV: {}  failed: {}",
        report.signals.len(),
        report.filtered_expired,
        report.filtered_low_ev,
        report.failures.len()
    );

    if status.active {
        println!("✗ Kill switch active, no orders placed: {:?}", status.reason);
        return Ok(());
    }

    for signal in report.signals {
        println!(
            "  BUY {} @ {:.2} for ${:.2} (p={:.1}%, ev={:.1}%)",
            signal.market_id,
            signal.recommended_price,
            signal.recommended_size,
            signal.probability * 100.0,
            signal.ev * 100.0
        );
        risk.record_trade(Trade::new(
            signal.id.to_string(),
            signal.token_id,
            OrderSide::Buy,
            signal.recommended_price,
            signal.recommended_size,
            now,
        ));
    }

    let pnl = risk.rolling_pnl(&now);
    println!("\n24h P&L: ${:.2} realized, ${:.2} total", pnl.realized, pnl.total);

    Ok(())
}
