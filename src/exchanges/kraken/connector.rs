use crate::core::{
    config::ExchangeConfig,
    errors::ExchangeError,
    kernel::{with_deadline, RestClient},
    traits::{BalanceConnection, WarningSink},
    types::{ConnectionBalances, ProviderName},
};
use crate::exchanges::kraken::conversions::convert_kraken_balances;
use crate::exchanges::kraken::rest::KrakenRestClient;
use crate::exchanges::kraken::signer::{KrakenSigner, NonceProvider};
use crate::exchanges::kraken::types::StatusResponse;
use crate::exchanges::kraken::validation::Validated;
use async_trait::async_trait;
use secrecy::Secret;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{instrument, warn};

/// Kraken balance connection.
///
/// Kraken has no endpoint for inspecting API-key permissions, so a key
/// without query access only shows up as `EGeneral:Permission denied` once
/// balances are requested.
pub struct KrakenConnector<R: RestClient> {
    rest: KrakenRestClient<R>,
    otp: Option<Secret<String>>,
    warning_sink: Option<Arc<dyn WarningSink>>,
    memoize_initiate: bool,
    memo: Mutex<Option<ConnectionBalances>>,
}

impl<R: RestClient> KrakenConnector<R> {
    /// Create a connector over a caller-supplied REST client.
    ///
    /// The signing secret is checked here, so a malformed key fails before
    /// any request is made.
    pub fn new(rest: R, config: ExchangeConfig) -> Result<Self, ExchangeError> {
        let signer = KrakenSigner::new(config.api_key().to_string(), config.secret_key.clone())?;

        Ok(Self {
            rest: KrakenRestClient::new(rest).with_signer(Arc::new(signer)),
            otp: config.otp,
            warning_sink: None,
            memoize_initiate: false,
            memo: Mutex::new(None),
        })
    }

    /// Also hand exchange warnings to `sink` (they are always logged)
    pub fn with_warning_sink(mut self, sink: Arc<dyn WarningSink>) -> Self {
        self.warning_sink = Some(sink);
        self
    }

    /// Keep the balances fetched by `initiate` for the next `get_balances`
    /// call, which then returns them instead of fetching again. Used once.
    pub fn with_initiate_memo(mut self, enabled: bool) -> Self {
        self.memoize_initiate = enabled;
        self
    }

    pub fn with_nonce_provider(mut self, nonce: Arc<dyn NonceProvider>) -> Self {
        self.rest = self.rest.with_nonce_provider(nonce);
        self
    }

    pub async fn get_system_status(
        &self,
        deadline: Option<Instant>,
    ) -> Result<Validated<StatusResponse>, ExchangeError> {
        let status = with_deadline(deadline, self.rest.get_system_status()).await?;
        self.emit_warnings(&status.warnings);
        Ok(status)
    }

    async fn fetch_balances(
        &self,
        deadline: Option<Instant>,
    ) -> Result<ConnectionBalances, ExchangeError> {
        let validated = with_deadline(deadline, self.rest.get_balances(self.otp.as_ref())).await?;
        let balances = convert_kraken_balances(validated.value.0)?;
        self.emit_warnings(&validated.warnings);

        Ok(ConnectionBalances {
            provider_name: ProviderName::Kraken,
            balances,
        })
    }

    fn emit_warnings(&self, warnings: &[String]) {
        if warnings.is_empty() {
            return;
        }

        warn!(
            "Received following warnings from Kraken: {}",
            warnings.join(", ")
        );
        if let Some(sink) = &self.warning_sink {
            sink.warnings(ProviderName::Kraken.as_str(), warnings);
        }
    }

    fn take_memo(&self) -> Option<ConnectionBalances> {
        self.memo.lock().ok().and_then(|mut memo| memo.take())
    }

    fn store_memo(&self, balances: &ConnectionBalances) {
        if let Ok(mut memo) = self.memo.lock() {
            *memo = Some(balances.clone());
        }
    }
}

#[async_trait]
impl<R: RestClient> BalanceConnection for KrakenConnector<R> {
    /// Checks that Kraken reports itself `online`, then fetches balances
    #[instrument(skip(self), fields(exchange = "kraken"))]
    async fn initiate(
        &self,
        deadline: Option<Instant>,
    ) -> Result<ConnectionBalances, ExchangeError> {
        let status = self.get_system_status(deadline).await?;
        if !status.value.status.is_online() {
            return Err(ExchangeError::OperationalError(
                status.value.status.to_string(),
            ));
        }

        let balances = self.fetch_balances(deadline).await?;
        if self.memoize_initiate {
            self.store_memo(&balances);
        }

        Ok(balances)
    }

    #[instrument(skip(self), fields(exchange = "kraken"))]
    async fn get_balances(
        &self,
        deadline: Option<Instant>,
    ) -> Result<ConnectionBalances, ExchangeError> {
        if let Some(balances) = self.take_memo() {
            return Ok(balances);
        }

        self.fetch_balances(deadline).await
    }
}
