use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Kraken response envelope. Both fields may be missing on malformed replies.
#[derive(Debug, Deserialize)]
pub struct KrakenResponse<T> {
    #[serde(default)]
    pub error: Vec<String>,
    pub result: Option<T>,
}

/// Exchange operating mode as reported by `public/SystemStatus`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KrakenSystemStatus {
    Online,
    Maintenance,
    CancelOnly,
    PostOnly,
    /// A mode this client does not know about, kept verbatim
    Unknown(String),
}

impl KrakenSystemStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Online => "online",
            Self::Maintenance => "maintenance",
            Self::CancelOnly => "cancel_only",
            Self::PostOnly => "post_only",
            Self::Unknown(status) => status,
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl From<&str> for KrakenSystemStatus {
    fn from(status: &str) -> Self {
        match status {
            "online" => Self::Online,
            "maintenance" => Self::Maintenance,
            "cancel_only" => Self::CancelOnly,
            "post_only" => Self::PostOnly,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for KrakenSystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for KrakenSystemStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let status = String::deserialize(deserializer)?;
        Ok(Self::from(status.as_str()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: KrakenSystemStatus,
    pub timestamp: String,
}

/// One line of the `private/Balance` result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBalanceEntry {
    pub code: String,
    pub amount: String,
}

impl RawBalanceEntry {
    pub fn new(code: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            amount: amount.into(),
        }
    }
}

/// `private/Balance` result in the order the exchange sent it.
///
/// Keys are collected as they appear, repeats included, so that the
/// normalizer can see and reject duplicated asset codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KrakenBalances(pub Vec<RawBalanceEntry>);

impl<'de> Deserialize<'de> for KrakenBalances {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BalancesVisitor;

        impl<'de> Visitor<'de> for BalancesVisitor {
            type Value = KrakenBalances;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of asset code to decimal string")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((code, amount)) = map.next_entry::<String, String>()? {
                    entries.push(RawBalanceEntry { code, amount });
                }
                Ok(KrakenBalances(entries))
            }
        }

        deserializer.deserialize_map(BalancesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_known_and_unknown() {
        let status: StatusResponse =
            serde_json::from_str(r#"{"status":"cancel_only","timestamp":"2021-03-22T17:18:03Z"}"#)
                .unwrap();
        assert_eq!(status.status, KrakenSystemStatus::CancelOnly);

        let status: KrakenSystemStatus = serde_json::from_str(r#""limit_only""#).unwrap();
        assert_eq!(status, KrakenSystemStatus::Unknown("limit_only".to_string()));
        assert_eq!(status.to_string(), "limit_only");
        assert!(!status.is_online());
    }

    #[test]
    fn test_balances_preserve_response_order() {
        let balances: KrakenBalances =
            serde_json::from_str(r#"{"ZEUR":"1.0","XXBT":"2.0","EUR.HOLD":"3.0","CRO":"4"}"#)
                .unwrap();

        let codes: Vec<&str> = balances.0.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["ZEUR", "XXBT", "EUR.HOLD", "CRO"]);
    }

    #[test]
    fn test_balances_keep_repeated_keys() {
        let balances: KrakenBalances =
            serde_json::from_str(r#"{"XXBT":"1.0","XXBT":"2.0"}"#).unwrap();
        assert_eq!(balances.0.len(), 2);
    }

    #[test]
    fn test_envelope_without_result() {
        let response: KrakenResponse<StatusResponse> =
            serde_json::from_str(r#"{"error":["EGeneral:Internal error"]}"#).unwrap();
        assert!(response.result.is_none());
        assert_eq!(response.error.len(), 1);
    }
}
