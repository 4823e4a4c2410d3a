use crate::core::errors::ExchangeError;
use std::collections::HashMap;

/// Result type for signing operations: headers to attach to the request
pub type SignatureResult = Result<HashMap<String, String>, ExchangeError>;

/// Signer trait for request authentication
///
/// Implementations compute whatever headers an exchange needs to accept a
/// private request. The nonce is chosen by the caller so that it can also be
/// placed in the request body that gets signed.
pub trait Signer: Send + Sync {
    /// Sign a request and return the headers to include
    ///
    /// # Arguments
    /// * `endpoint` - API endpoint path exactly as it appears in the URL
    /// * `payload` - Ordered form fields of the request body
    /// * `nonce` - Request nonce, already present in `payload`
    fn sign_request(
        &self,
        endpoint: &str,
        payload: &[(&str, String)],
        nonce: u64,
    ) -> SignatureResult;
}
