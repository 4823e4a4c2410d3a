use crate::core::{errors::ExchangeError, types::ConnectionBalances};
use async_trait::async_trait;
use std::time::Instant;

/// A balance connection as consumed by the aggregation platform.
///
/// `deadline` bounds every network call made on behalf of one invocation.
#[async_trait]
pub trait BalanceConnection {
    /// Verify the exchange is usable, then fetch balances
    async fn initiate(&self, deadline: Option<Instant>)
        -> Result<ConnectionBalances, ExchangeError>;

    /// Fetch and normalize the account balances
    async fn get_balances(
        &self,
        deadline: Option<Instant>,
    ) -> Result<ConnectionBalances, ExchangeError>;
}

/// Receives non-fatal advisories returned next to a successful response
pub trait WarningSink: Send + Sync {
    fn warnings(&self, provider: &str, warnings: &[String]);
}

impl<F> WarningSink for F
where
    F: Fn(&str, &[String]) + Send + Sync,
{
    fn warnings(&self, provider: &str, warnings: &[String]) {
        self(provider, warnings);
    }
}
