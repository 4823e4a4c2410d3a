use crate::core::errors::{ExchangeError, TransportFailure};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{instrument, trace};

/// Raw outcome of an HTTP exchange, before any protocol interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    pub status: u16,
    pub body: String,
}

impl RestResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// REST client trait for making HTTP requests
///
/// Implementations only move bytes: status codes are returned as-is so the
/// exchange layer can decide what a non-200 response means. Connectors are
/// generic over this trait, which lets callers hand in a pre-built client
/// (or a scripted one in tests).
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Make a GET request
    ///
    /// # Arguments
    /// * `endpoint` - The API endpoint path, including any version prefix
    /// * `query_params` - Query parameters as key-value pairs
    async fn get(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> Result<RestResponse, ExchangeError>;

    /// Make a form-encoded POST request
    ///
    /// # Arguments
    /// * `endpoint` - The API endpoint path, including any version prefix
    /// * `form_body` - Already URL-form-encoded body
    /// * `headers` - Extra headers, typically authentication headers
    async fn post_form(
        &self,
        endpoint: &str,
        form_body: String,
        headers: &HashMap<String, String>,
    ) -> Result<RestResponse, ExchangeError>;
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Exchange name for logging and tracing
    pub exchange_name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string to include in requests
    pub user_agent: String,
}

impl RestClientConfig {
    /// Create a new configuration
    ///
    /// # Arguments
    /// * `base_url` - Base URL for the API
    /// * `exchange_name` - Name of the exchange
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url,
            exchange_name,
            timeout_seconds: 30,
            user_agent: "kraken-connect/0.1".to_string(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Builder for creating REST client instances
pub struct RestClientBuilder {
    config: RestClientConfig,
}

impl RestClientBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self { config }
    }

    /// Build the REST client
    pub fn build(self) -> Result<ReqwestRest, ExchangeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| {
                ExchangeError::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(ReqwestRest {
            client,
            config: self.config,
        })
    }
}

/// Implementation of `RestClient` using reqwest
#[derive(Clone, Debug)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
}

impl ReqwestRest {
    /// Build the full URL for an endpoint
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Send the request and capture status and body without judging either
    async fn execute(&self, request: RequestBuilder) -> Result<RestResponse, ExchangeError> {
        let response = request.send().await.map_err(TransportFailure::Request)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(TransportFailure::Request)?;

        trace!(status, "Response body: {}", body);

        Ok(RestResponse { status, body })
    }
}

#[async_trait]
impl RestClient for ReqwestRest {
    #[instrument(skip(self, query_params), fields(exchange = %self.config.exchange_name, endpoint = %endpoint, param_count = query_params.len()))]
    async fn get(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> Result<RestResponse, ExchangeError> {
        let request = self.client.get(self.build_url(endpoint)).query(query_params);
        self.execute(request).await
    }

    #[instrument(skip(self, form_body, headers), fields(exchange = %self.config.exchange_name, endpoint = %endpoint))]
    async fn post_form(
        &self,
        endpoint: &str,
        form_body: String,
        headers: &HashMap<String, String>,
    ) -> Result<RestResponse, ExchangeError> {
        let mut request = self
            .client
            .post(self.build_url(endpoint))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");

        for (key, value) in headers {
            request = request.header(key.as_str(), value.as_str());
        }

        self.execute(request.body(form_body)).await
    }
}

/// Run a request future under an optional deadline.
///
/// Expiry drops the future, which aborts the in-flight request.
pub async fn with_deadline<T, F>(deadline: Option<Instant>, request: F) -> Result<T, ExchangeError>
where
    F: Future<Output = Result<T, ExchangeError>>,
{
    match deadline {
        None => request.await,
        Some(deadline) => tokio::time::timeout_at(tokio::time::Instant::from_std(deadline), request)
            .await
            .map_err(|_| TransportFailure::DeadlineExceeded)?,
    }
}
