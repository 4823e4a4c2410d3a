use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    /// Local setup is unusable, e.g. the signing secret is not valid base64.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The round trip to the exchange produced no usable payload.
    #[error(transparent)]
    TransportError(#[from] TransportFailure),

    /// Fatal `E`-prefixed errors reported by the exchange, prefix stripped.
    #[error("Error receiving response from Kraken: {0}")]
    ProtocolError(String),

    /// The exchange is reachable but not accepting requests.
    #[error("Kraken API is not available while being in mode {0}.")]
    OperationalError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

/// Cause of an `ExchangeError::TransportError`
#[derive(Error, Debug)]
pub enum TransportFailure {
    /// Non-200 status or a body without a `result` payload.
    #[error("Received unknown response from Kraken: {status} {body}")]
    UnknownResponse { status: u16, body: String },

    /// Connection, TLS or body read failure.
    #[error("Request to Kraken failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request deadline exceeded")]
    DeadlineExceeded,
}

impl ExchangeError {
    pub fn unknown_response(status: u16, body: impl Into<String>) -> Self {
        Self::TransportError(TransportFailure::UnknownResponse {
            status,
            body: body.into(),
        })
    }
}
