/// Kernel - exchange-agnostic transport layer
///
/// The kernel holds the HTTP plumbing and the authentication seam. It knows
/// nothing about a particular exchange's envelopes or asset codes.
///
/// ## Transport
/// - `RestClient`: transport interface connectors are generic over
/// - `ReqwestRest`: reqwest-backed implementation
/// - `with_deadline`: bounds a request by a caller-supplied deadline
///
/// ## Authentication
/// - `Signer`: pluggable request signing
///
/// # Example
/// ```rust,no_run
/// use kraken_connect::core::kernel::*;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let rest_config = RestClientConfig::new(
///     "https://api.kraken.com".to_string(),
///     "kraken".to_string(),
/// );
/// let rest = RestClientBuilder::new(rest_config).build()?;
///
/// let response = rest.get("/0/public/SystemStatus", &[]).await?;
/// println!("{} {}", response.status, response.body);
/// # Ok(())
/// # }
/// ```
pub mod rest;
pub mod signer;

pub use rest::{with_deadline, ReqwestRest, RestClient, RestClientBuilder, RestClientConfig, RestResponse};
pub use signer::{SignatureResult, Signer};
