//! End-to-end bid session against a running PricePilot backend.
//!
//! Configure via env (PRICEPILOT_BASE_URL, PRICEPILOT_USERNAME, ...) or a
//! `pricepilot.toml` in the working directory.

use anyhow::Result;
use pricepilot_client::{BidEngine, Config, SessionGateway};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = if std::path::Path::new("pricepilot.toml").exists() {
        Config::load("pricepilot.toml")?
    } else {
        Config::from_env()
    };

    let gateway = SessionGateway::from_config(&config.gateway)?;
    let mut engine = BidEngine::new(gateway);

    match config.order_override() {
        Some(defaults) => engine.apply_order_override(defaults).await?,
        None => engine.refresh().await?,
    }

    let bounds = engine.bounds()?;
    println!(
        "axis: {:.0}..{:.0} step {:.0}, optimal bid {:.0}",
        bounds.min,
        bounds.max,
        bounds.step,
        engine.optimal_price()
    );

    let mut price = bounds.min;
    while price <= bounds.max {
        let estimate = engine.evaluate(price)?;
        println!(
            "  {:>6.0}  p={:5.2}%  ev={:7.2}  [{}]",
            price, estimate.probability, estimate.expected_value, estimate.zone
        );
        price += bounds.step * 4.0;
    }

    let chosen = engine.propose_price(engine.optimal_price()).await?;
    let sim = engine.simulate_acceptance(chosen)?;
    println!(
        "bid {:.0}: client {} (p={:.1}%, roll={:.1}%)",
        chosen,
        if sim.accepted { "ACCEPTED" } else { "rejected" },
        sim.estimate.probability,
        sim.roll * 100.0
    );

    Ok(())
}
