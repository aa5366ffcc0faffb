//! Ticker symbol normalization
//!
//! Artifacts are keyed by the bare ticker (`BBCA`), while the price-history
//! provider expects an exchange-qualified symbol (`BBCA.JK`).

use crate::constants::{DEFAULT_MARKET_SUFFIX, KNOWN_EXCHANGE_SUFFIXES};

/// Normalize a ticker into the artifact lookup key.
///
/// Upper-cases and strips the default market suffix, so `bbca.jk`,
/// `BBCA.JK` and `BBCA` all map to `BBCA`.
pub fn normalize_ticker(ticker: &str) -> String {
    let upper = ticker.trim().to_uppercase();
    match upper.strip_suffix(DEFAULT_MARKET_SUFFIX) {
        Some(bare) => bare.to_string(),
        None => upper,
    }
}

/// Symbol to request from the price-history provider.
///
/// Tickers that already carry a known exchange suffix are used as-is;
/// anything else defaults to the Jakarta market.
pub fn provider_symbol(ticker: &str) -> String {
    let upper = ticker.trim().to_uppercase();
    if has_exchange_suffix(&upper) {
        upper
    } else {
        format!("{}{}", upper, DEFAULT_MARKET_SUFFIX)
    }
}

fn has_exchange_suffix(upper: &str) -> bool {
    KNOWN_EXCHANGE_SUFFIXES
        .iter()
        .any(|suffix| upper.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ticker() {
        assert_eq!(normalize_ticker("BBCA.JK"), "BBCA");
        assert_eq!(normalize_ticker("BBCA"), "BBCA");
        assert_eq!(normalize_ticker("bbca.jk"), "BBCA");
        assert_eq!(normalize_ticker(" tlkm "), "TLKM");
        // Only the default market suffix is stripped
        assert_eq!(normalize_ticker("RELIANCE.NS"), "RELIANCE.NS");
    }

    #[test]
    fn test_provider_symbol() {
        assert_eq!(provider_symbol("BBCA"), "BBCA.JK");
        assert_eq!(provider_symbol("bbca"), "BBCA.JK");
        assert_eq!(provider_symbol("BBCA.JK"), "BBCA.JK");
        assert_eq!(provider_symbol("RELIANCE.NS"), "RELIANCE.NS");
        assert_eq!(provider_symbol("SHOP.TO"), "SHOP.TO");
        assert_eq!(provider_symbol("7203.T"), "7203.T");
    }
}
