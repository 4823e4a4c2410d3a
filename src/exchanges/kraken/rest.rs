use crate::core::errors::ExchangeError;
use crate::core::kernel::{RestClient, Signer};
use crate::exchanges::kraken::signer::{encode_payload, FormPayload, IncreasingNonce, NonceProvider};
use crate::exchanges::kraken::types::{KrakenBalances, StatusResponse};
use crate::exchanges::kraken::validation::{validate_response, Validated};
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;
use tracing::instrument;

pub const SYSTEM_STATUS_PATH: &str = "/0/public/SystemStatus";
pub const BALANCE_PATH: &str = "/0/private/Balance";

/// Thin typed wrapper around `RestClient` for the Kraken endpoints we use
pub struct KrakenRestClient<R: RestClient> {
    client: R,
    signer: Option<Arc<dyn Signer>>,
    nonce: Arc<dyn NonceProvider>,
}

impl<R: RestClient> KrakenRestClient<R> {
    pub fn new(client: R) -> Self {
        Self {
            client,
            signer: None,
            nonce: Arc::new(IncreasingNonce::new()),
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_nonce_provider(mut self, nonce: Arc<dyn NonceProvider>) -> Self {
        self.nonce = nonce;
        self
    }

    /// Get the exchange operating mode
    #[instrument(skip(self), fields(exchange = "kraken"))]
    pub async fn get_system_status(&self) -> Result<Validated<StatusResponse>, ExchangeError> {
        let response = self.client.get(SYSTEM_STATUS_PATH, &[]).await?;
        validate_response(&response)
    }

    /// Get account balances
    ///
    /// The one-time password is only sent when one is configured for the key.
    #[instrument(skip(self, otp), fields(exchange = "kraken", with_otp = otp.is_some()))]
    pub async fn get_balances(
        &self,
        otp: Option<&Secret<String>>,
    ) -> Result<Validated<KrakenBalances>, ExchangeError> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            ExchangeError::ConfigurationError(
                "Authentication required but no signer provided".to_string(),
            )
        })?;

        let nonce = self.nonce.next_nonce();
        let mut payload = FormPayload::new();
        payload.push("nonce", nonce.to_string());
        if let Some(otp) = otp {
            payload.push("otp", otp.expose_secret().clone());
        }

        let headers = signer.sign_request(BALANCE_PATH, payload.fields(), nonce)?;
        let body = encode_payload(payload.fields())?;

        let response = self.client.post_form(BALANCE_PATH, body, &headers).await?;
        validate_response(&response)
    }
}
