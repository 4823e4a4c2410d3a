pub mod builder;
pub mod connector;
pub mod conversions;
pub mod rest;
pub mod signer;
pub mod types;
pub mod validation;

// Re-export main components
pub use builder::build_connector;
pub use connector::KrakenConnector;
pub use conversions::convert_kraken_balances;
pub use rest::KrakenRestClient;
pub use signer::{IncreasingNonce, KrakenSigner, NonceProvider, SigningContext};
pub use types::{KrakenBalances, KrakenResponse, KrakenSystemStatus, RawBalanceEntry, StatusResponse};
pub use validation::{validate_response, Validated};
