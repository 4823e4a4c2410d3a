use anyhow::Context;
use kraken_connect::core::config::ExchangeConfig;
use kraken_connect::exchanges::kraken::build_connector;
use kraken_connect::BalanceConnection;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

fn load_config() -> anyhow::Result<ExchangeConfig> {
    #[cfg(feature = "env-file")]
    let config = ExchangeConfig::from_env_file("KRAKEN");
    #[cfg(not(feature = "env-file"))]
    let config = ExchangeConfig::from_env("KRAKEN");

    config.context("loading Kraken credentials")
}

/// KRAKEN_DEADLINE_SECS bounds the whole status + balance round trip
fn parse_deadline(secs: &str, now: Instant) -> anyhow::Result<Instant> {
    let secs: u64 = secs
        .trim()
        .parse()
        .context("KRAKEN_DEADLINE_SECS must be a whole number of seconds")?;

    now.checked_add(Duration::from_secs(secs))
        .context("KRAKEN_DEADLINE_SECS is too large")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = load_config()?;

    let deadline = std::env::var("KRAKEN_DEADLINE_SECS")
        .ok()
        .map(|secs| parse_deadline(&secs, Instant::now()))
        .transpose()?;

    let connector = build_connector(config)?;
    let balances = connector.initiate(deadline).await?;

    println!("{}", serde_json::to_string_pretty(&balances)?);

    Ok(())
}
