use crate::core::errors::ExchangeError;
use crate::core::kernel::{SignatureResult, Signer};
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256, Sha512};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use zeroize::{Zeroize, Zeroizing};

type HmacSha512 = Hmac<Sha512>;

/// Everything needed to sign one private request. Borrowed for the duration
/// of the signing call only.
pub struct SigningContext<'a> {
    pub path: &'a str,
    pub payload: &'a [(&'a str, String)],
    pub secret: &'a Secret<String>,
    pub nonce: u64,
}

/// Ordered form fields of a private request.
///
/// Values are wiped on drop since they may carry the one-time password.
#[derive(Default)]
pub struct FormPayload(Vec<(&'static str, String)>);

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &'static str, value: String) {
        self.0.push((key, value));
    }

    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.0
    }

    fn wipe(&mut self) {
        for (_, value) in &mut self.0 {
            value.zeroize();
        }
    }
}

impl Drop for FormPayload {
    fn drop(&mut self) {
        self.wipe();
    }
}

/// URL-form-encode the payload in the order given
pub fn encode_payload(payload: &[(&str, String)]) -> Result<String, ExchangeError> {
    serde_urlencoded::to_string(payload).map_err(|e| {
        ExchangeError::DeserializationError(format!("Failed to encode request payload: {}", e))
    })
}

fn decode_secret(secret: &Secret<String>) -> Result<Zeroizing<Vec<u8>>, ExchangeError> {
    general_purpose::STANDARD
        .decode(secret.expose_secret().trim())
        .map(Zeroizing::new)
        .map_err(|e| {
            ExchangeError::ConfigurationError(format!("API secret is not valid base64: {}", e))
        })
}

/// Compute the `API-Sign` value:
/// `base64(HMAC-SHA512(base64decode(secret), path + SHA256(nonce + payload)))`
pub fn sign(ctx: &SigningContext<'_>) -> Result<String, ExchangeError> {
    let key = decode_secret(ctx.secret)?;
    let encoded = Zeroizing::new(encode_payload(ctx.payload)?);

    let mut hasher = Sha256::new();
    hasher.update(ctx.nonce.to_string().as_bytes());
    hasher.update(encoded.as_bytes());
    let digest = hasher.finalize();

    let mut mac = HmacSha512::new_from_slice(&key)
        .map_err(|e| ExchangeError::ConfigurationError(format!("Failed to create HMAC: {}", e)))?;
    mac.update(ctx.path.as_bytes());
    mac.update(&digest);

    Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

pub struct KrakenSigner {
    api_key: String,
    secret_key: Secret<String>,
}

impl fmt::Debug for KrakenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KrakenSigner").finish_non_exhaustive()
    }
}

impl KrakenSigner {
    /// Fails with a configuration error when the secret is not base64, so a
    /// bad key is reported before any request goes out.
    pub fn new(api_key: String, secret_key: Secret<String>) -> Result<Self, ExchangeError> {
        decode_secret(&secret_key)?;
        Ok(Self {
            api_key,
            secret_key,
        })
    }
}

impl Signer for KrakenSigner {
    fn sign_request(
        &self,
        endpoint: &str,
        payload: &[(&str, String)],
        nonce: u64,
    ) -> SignatureResult {
        let signature = sign(&SigningContext {
            path: endpoint,
            payload,
            secret: &self.secret_key,
            nonce,
        })?;

        let mut headers = HashMap::new();
        headers.insert("API-Key".to_string(), self.api_key.clone());
        headers.insert("API-Sign".to_string(), signature);

        Ok(headers)
    }
}

/// Source of request nonces
pub trait NonceProvider: Send + Sync {
    fn next_nonce(&self) -> u64;
}

/// Wall-clock nonce (milliseconds * 1000) that never repeats within a process.
///
/// Two calls in the same millisecond get `last + 1`, so the sequence is
/// strictly increasing even when the clock is coarse or steps backwards.
#[derive(Debug, Default)]
pub struct IncreasingNonce {
    last: AtomicU64,
}

impl IncreasingNonce {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NonceProvider for IncreasingNonce {
    fn next_nonce(&self) -> u64 {
        let now = wall_clock_nonce();
        let mut last = self.last.load(Ordering::Acquire);
        loop {
            let candidate = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}

fn wall_clock_nonce() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64 * 1000)
        .unwrap_or_default()
}
