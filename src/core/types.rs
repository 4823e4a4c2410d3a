use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a canonical asset is fiat held on the exchange or a crypto asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Crypto,
    Cash,
}

impl AssetType {
    /// Cash wins when two classifications of the same asset disagree.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        if self == Self::Cash || other == Self::Cash {
            Self::Cash
        } else {
            Self::Crypto
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crypto => write!(f, "crypto"),
            Self::Cash => write!(f, "cash"),
        }
    }
}

/// One normalized balance line
///
/// `raw` keeps the first exchange code that produced this asset, `amount`
/// keeps the widest decimal precision seen across the merged lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalBalance {
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub raw: String,
    pub asset: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
}

/// Providers known to the aggregation platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderName {
    Coinbase,
    CoinbasePro,
    Kraken,
    Binance,
    WalletEthereum,
}

impl ProviderName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coinbase => "coinbase",
            Self::CoinbasePro => "coinbase_pro",
            Self::Kraken => "kraken",
            Self::Binance => "binance",
            Self::WalletEthereum => "wallet_ethereum",
        }
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result handed back to the platform by a connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionBalances {
    pub provider_name: ProviderName,
    pub balances: Vec<CanonicalBalance>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_asset_type_merge_prefers_cash() {
        assert_eq!(AssetType::Crypto.merge(AssetType::Crypto), AssetType::Crypto);
        assert_eq!(AssetType::Crypto.merge(AssetType::Cash), AssetType::Cash);
        assert_eq!(AssetType::Cash.merge(AssetType::Crypto), AssetType::Cash);
    }

    #[test]
    fn test_connection_balances_wire_format() {
        let balances = ConnectionBalances {
            provider_name: ProviderName::Kraken,
            balances: vec![CanonicalBalance {
                asset_type: AssetType::Cash,
                raw: "ZEUR".to_string(),
                asset: "EUR".to_string(),
                amount: Decimal::from_str("505705.0724").unwrap(),
            }],
        };

        let value = serde_json::to_value(&balances).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "providerName": "kraken",
                "balances": [{
                    "type": "cash",
                    "raw": "ZEUR",
                    "asset": "EUR",
                    "amount": "505705.0724"
                }]
            })
        );
    }

    #[test]
    fn test_amount_keeps_trailing_zeros() {
        let balance: CanonicalBalance = serde_json::from_str(
            r#"{"type":"crypto","raw":"USDT","asset":"USDT","amount":"0.00000000"}"#,
        )
        .unwrap();

        assert_eq!(balance.amount.to_string(), "0.00000000");
        assert_eq!(balance.asset_type, AssetType::Crypto);
    }
}
