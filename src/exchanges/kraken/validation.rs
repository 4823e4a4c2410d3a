use crate::core::errors::ExchangeError;
use crate::core::kernel::RestResponse;
use crate::exchanges::kraken::types::KrakenResponse;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

/// A successful response together with any advisories the exchange attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated<T> {
    pub value: T,
    pub warnings: Vec<String>,
}

/// Check status, envelope and error list of a Kraken response.
///
/// Kraken prefixes fatal errors with `E` and warnings with `W`, e.g.
/// `EAPI:Invalid signature` or `EGeneral:Permission denied`. Any `E` entry
/// fails the call even when warnings are present; `W` entries are handed
/// back with the result. The `result` payload is only deserialized into `T`
/// after the error list came back clean.
pub fn validate_response<T: DeserializeOwned>(
    response: &RestResponse,
) -> Result<Validated<T>, ExchangeError> {
    let unknown_response = || ExchangeError::unknown_response(response.status, &response.body);

    if response.status != 200 {
        return Err(unknown_response());
    }

    let envelope: KrakenResponse<Box<RawValue>> =
        serde_json::from_str(&response.body).map_err(|_| unknown_response())?;
    let Some(result) = envelope.result else {
        return Err(unknown_response());
    };

    let warnings = classify_errors(&envelope.error)?;

    let value = serde_json::from_str(result.get()).map_err(|e| {
        ExchangeError::DeserializationError(format!("Unexpected result payload: {}", e))
    })?;

    Ok(Validated { value, warnings })
}

/// Split the error list: fail on fatal entries, return the warnings.
fn classify_errors(errors: &[String]) -> Result<Vec<String>, ExchangeError> {
    let fatal: Vec<&str> = errors.iter().filter_map(|e| e.strip_prefix('E')).collect();
    if !fatal.is_empty() {
        return Err(ExchangeError::ProtocolError(fatal.join(", ")));
    }

    Ok(errors
        .iter()
        .filter_map(|e| e.strip_prefix('W'))
        .map(str::to_string)
        .collect())
}
