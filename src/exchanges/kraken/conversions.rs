use crate::core::{
    errors::ExchangeError,
    types::{AssetType, CanonicalBalance},
};
use crate::exchanges::kraken::types::RawBalanceEntry;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use tracing::debug;

/// Fiat currencies Kraken reports with a leading `Z` (`ZEUR`, `ZUSD`, ...)
const FIAT_CODES: &[&str] = &["USD", "EUR", "GBP", "JPY", "CAD", "AUD", "CHF"];

/// Root codes that look prefixed but are complete tickers. Checked before
/// prefix stripping, which would turn `XBT` into `BT` or `XAUT` into `AUT`.
const SPECIAL_CODES: &[(&str, &str)] = &[("XBT", "XBT"), ("XDG", "XDG"), ("XAUT", "XAUT")];

/// Kraken-internal tickers and the symbol the rest of the world uses.
/// See https://support.kraken.com/hc/en-us/articles/360001206766
const SYMBOL_ALIASES: &[(&str, &str)] = &[("XBT", "BTC"), ("XDG", "DOGE"), ("REPV2", "REP")];

fn lookup(table: &'static [(&'static str, &'static str)], code: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(from, _)| *from == code)
        .map(|(_, to)| *to)
}

/// Asset code with any sub-account suffix (`.HOLD`, `.S`, `.M`, ...) removed
pub fn root_code(code: &str) -> &str {
    code.split_once('.').map_or(code, |(root, _)| root)
}

fn is_cash_code(root: &str) -> bool {
    root.strip_prefix('Z')
        .is_some_and(|fiat| FIAT_CODES.contains(&fiat))
}

/// Legacy crypto codes are `X` followed by a three letter ticker (`XETH`, `XXBT`)
fn is_legacy_crypto_code(root: &str) -> bool {
    root.len() == 4 && root.starts_with('X')
}

pub fn classify(root: &str) -> AssetType {
    if is_cash_code(root) {
        AssetType::Cash
    } else {
        AssetType::Crypto
    }
}

/// Remove the Kraken `Z`/`X` prefix from a root code
pub fn strip_code(root: &str) -> &str {
    if let Some(code) = lookup(SPECIAL_CODES, root) {
        return code;
    }

    if is_cash_code(root) || is_legacy_crypto_code(root) {
        &root[1..]
    } else {
        root
    }
}

/// Public ticker for a root code
pub fn canonical_asset(root: &str) -> String {
    let stripped = strip_code(root);
    lookup(SYMBOL_ALIASES, stripped)
        .unwrap_or(stripped)
        .to_string()
}

/// Exact sum, carrying the wider of the two decimal precisions
pub fn merge_amounts(current: Decimal, addition: Decimal) -> Result<Decimal, ExchangeError> {
    let scale = current.scale().max(addition.scale());
    let mut sum = current.checked_add(addition).ok_or_else(|| {
        ExchangeError::DeserializationError(format!(
            "Balance overflow adding {} and {}",
            current, addition
        ))
    })?;
    sum.rescale(scale);
    Ok(sum)
}

fn parse_amount(entry: &RawBalanceEntry) -> Result<Decimal, ExchangeError> {
    Decimal::from_str(&entry.amount).map_err(|e| {
        ExchangeError::DeserializationError(format!(
            "Invalid amount '{}' for {}: {}",
            entry.amount, entry.code, e
        ))
    })
}

/// Collapse raw Kraken balance lines into one balance per public asset.
///
/// Sub-accounts (`EUR.HOLD`, `ETH2.S`) and legacy codes (`XXBT`, `XBT`) are
/// folded into the same asset. Output order is the order in which each asset
/// first appears; `raw` is the code of that first line.
pub fn convert_kraken_balances(
    entries: Vec<RawBalanceEntry>,
) -> Result<Vec<CanonicalBalance>, ExchangeError> {
    let mut balances: Vec<CanonicalBalance> = Vec::with_capacity(entries.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut seen_codes: HashSet<String> = HashSet::new();

    for entry in entries {
        if !seen_codes.insert(entry.code.clone()) {
            return Err(ExchangeError::ProtocolError(format!(
                "Duplicate asset code {} in balance response",
                entry.code
            )));
        }

        let amount = parse_amount(&entry)?;
        let root = root_code(&entry.code);
        let asset_type = classify(root);
        let asset = canonical_asset(root);

        if let Some(&position) = positions.get(&asset) {
            let balance = &mut balances[position];
            debug!(asset = %asset, code = %entry.code, "Merging balance line");
            balance.amount = merge_amounts(balance.amount, amount)?;
            balance.asset_type = balance.asset_type.merge(asset_type);
        } else {
            positions.insert(asset.clone(), balances.len());
            balances.push(CanonicalBalance {
                asset_type,
                raw: entry.code,
                asset,
                amount,
            });
        }
    }

    Ok(balances)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(raw: &[(&str, &str)]) -> Vec<RawBalanceEntry> {
        raw.iter()
            .map(|(code, amount)| RawBalanceEntry::new(*code, *amount))
            .collect()
    }

    fn summary(balances: &[CanonicalBalance]) -> Vec<(AssetType, String, String, String)> {
        balances
            .iter()
            .map(|b| {
                (
                    b.asset_type,
                    b.raw.clone(),
                    b.asset.clone(),
                    b.amount.to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn test_root_code() {
        assert_eq!(root_code("EUR.HOLD"), "EUR");
        assert_eq!(root_code("ETH2.S"), "ETH2");
        assert_eq!(root_code("A.B.C"), "A");
        assert_eq!(root_code("ZEUR"), "ZEUR");
    }

    #[test]
    fn test_classification() {
        assert_eq!(classify("ZEUR"), AssetType::Cash);
        assert_eq!(classify("ZUSD"), AssetType::Cash);
        assert_eq!(classify("EUR"), AssetType::Crypto);
        assert_eq!(classify("ZEC"), AssetType::Crypto);
        assert_eq!(classify("ZRX"), AssetType::Crypto);
        assert_eq!(classify("XXBT"), AssetType::Crypto);
    }

    #[test]
    fn test_special_codes_take_precedence_over_stripping() {
        assert_eq!(strip_code("XBT"), "XBT");
        assert_eq!(strip_code("XDG"), "XDG");
        assert_eq!(strip_code("XAUT"), "XAUT");
        assert_eq!(strip_code("XXBT"), "XBT");
        assert_eq!(strip_code("XETH"), "ETH");
        assert_eq!(strip_code("ZEUR"), "EUR");
        assert_eq!(strip_code("XTZ"), "XTZ");
        assert_eq!(strip_code("ETH2"), "ETH2");
    }

    #[test]
    fn test_aliases() {
        assert_eq!(canonical_asset("XXBT"), "BTC");
        assert_eq!(canonical_asset("XBT"), "BTC");
        assert_eq!(canonical_asset("XXDG"), "DOGE");
        assert_eq!(canonical_asset("XDG"), "DOGE");
        assert_eq!(canonical_asset("XXRP"), "XRP");
        assert_eq!(canonical_asset("XAUT"), "XAUT");
        assert_eq!(canonical_asset("DAI"), "DAI");
        assert_eq!(canonical_asset("REPV2"), "REP");
        assert_eq!(canonical_asset("XREP"), "REP");
    }

    #[test]
    fn test_repv2_merges_with_legacy_rep() {
        let balances =
            convert_kraken_balances(entries(&[("XREP", "1.0"), ("REPV2", "2.0")])).unwrap();

        assert_eq!(
            summary(&balances),
            vec![(
                AssetType::Crypto,
                "XREP".to_string(),
                "REP".to_string(),
                "3.0".to_string()
            )]
        );
    }

    #[test]
    fn test_normalizing_same_code_twice_agrees() {
        for code in ["ZEUR", "XXBT", "EUR.HOLD", "ETH2.S", "XDG", "CRO"] {
            let first = convert_kraken_balances(entries(&[(code, "1.0")])).unwrap();
            let second = convert_kraken_balances(entries(&[(code, "1.0")])).unwrap();
            assert_eq!(first, second, "code {}", code);
        }
    }

    #[test]
    fn test_merge_keeps_widest_precision() {
        let merged = merge_amounts(
            Decimal::from_str("0.0001").unwrap(),
            Decimal::from_str("504861.8946").unwrap(),
        )
        .unwrap();
        assert_eq!(merged.to_string(), "504861.8947");

        let merged = merge_amounts(
            Decimal::from_str("1011.1908877900").unwrap(),
            Decimal::from_str("0.00006").unwrap(),
        )
        .unwrap();
        assert_eq!(merged.to_string(), "1011.1909477900");

        let merged = merge_amounts(
            Decimal::from_str("2").unwrap(),
            Decimal::from_str("0.50").unwrap(),
        )
        .unwrap();
        assert_eq!(merged.to_string(), "2.50");
    }

    #[test]
    fn test_full_account() {
        let balances = convert_kraken_balances(entries(&[
            ("ZEUR", "504861.8946"),
            ("XXBT", "1011.1908877900"),
            ("EUR.HOLD", "500.4838"),
            ("EUR.M", "342.6940"),
            ("ETH2.S", "0.1908877900"),
            ("ETH2", "0.1908877900"),
        ]))
        .unwrap();

        assert_eq!(
            summary(&balances),
            vec![
                (
                    AssetType::Cash,
                    "ZEUR".to_string(),
                    "EUR".to_string(),
                    "505705.0724".to_string()
                ),
                (
                    AssetType::Crypto,
                    "XXBT".to_string(),
                    "BTC".to_string(),
                    "1011.1908877900".to_string()
                ),
                (
                    AssetType::Crypto,
                    "ETH2.S".to_string(),
                    "ETH2".to_string(),
                    "0.3817755800".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_cash_wins_when_sub_account_comes_first() {
        let balances = convert_kraken_balances(entries(&[
            ("EUR.F", "200.0177"),
            ("ZEUR", "0.0000"),
        ]))
        .unwrap();

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].asset, "EUR");
        assert_eq!(balances[0].raw, "EUR.F");
        assert_eq!(balances[0].asset_type, AssetType::Cash);
        assert_eq!(balances[0].amount.to_string(), "200.0177");
    }

    #[test]
    fn test_plain_codes_pass_through() {
        let balances =
            convert_kraken_balances(entries(&[("CRO", "0.0000"), ("USDT", "0.00000000")]))
                .unwrap();

        assert_eq!(
            summary(&balances),
            vec![
                (
                    AssetType::Crypto,
                    "CRO".to_string(),
                    "CRO".to_string(),
                    "0.0000".to_string()
                ),
                (
                    AssetType::Crypto,
                    "USDT".to_string(),
                    "USDT".to_string(),
                    "0.00000000".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(convert_kraken_balances(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_raw_code_is_rejected() {
        let err = convert_kraken_balances(entries(&[("XXBT", "1.0"), ("XXBT", "2.0")]))
            .unwrap_err();
        assert!(matches!(err, ExchangeError::ProtocolError(_)));
        assert!(err.to_string().contains("XXBT"));
    }

    #[test]
    fn test_invalid_amount() {
        let err = convert_kraken_balances(entries(&[("XXBT", "lots")])).unwrap_err();
        assert!(matches!(err, ExchangeError::DeserializationError(_)));
    }
}
