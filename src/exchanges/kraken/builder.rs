use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{ReqwestRest, RestClientBuilder, RestClientConfig};
use crate::exchanges::kraken::connector::KrakenConnector;

pub const KRAKEN_BASE_URL: &str = "https://api.kraken.com";
pub const KRAKEN_USER_AGENT: &str = "LunchMoney Kraken Client";

/// Create a Kraken connector backed by reqwest
pub fn build_connector(config: ExchangeConfig) -> Result<KrakenConnector<ReqwestRest>, ExchangeError> {
    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| KRAKEN_BASE_URL.to_string());

    let rest_config = RestClientConfig::new(base_url, "kraken".to_string())
        .with_timeout(30)
        .with_user_agent(KRAKEN_USER_AGENT.to_string());

    let rest = RestClientBuilder::new(rest_config).build()?;

    KrakenConnector::new(rest, config)
}
