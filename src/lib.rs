pub mod core;
pub mod exchanges;

pub use crate::core::{
    errors::{ExchangeError, TransportFailure},
    traits::BalanceConnection,
    types::*,
};
pub use crate::exchanges::kraken::KrakenConnector;
