//! Exchange metadata snapshot (cold path)
//!
//! Fetches tradable symbol metadata from the Binance REST API. Called once
//! at client construction - never on the streaming path.

use crate::core::TradeSymbol;
use crate::infrastructure::config::RestConfig;
use crate::{Result, StreamError};
use serde::Deserialize;
use std::time::Duration;

/// One-shot exchangeInfo client
pub struct ExchangeInfoClient {
    client: reqwest::Client,
    base_url: String,
}

impl ExchangeInfoClient {
    /// Create the snapshot client from REST settings
    pub fn new(config: &RestConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .user_agent("binance-stream/0.1")
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: config.base_url.clone(),
        }
    }

    /// Fetch tradable symbols, optionally filtered by quote asset
    ///
    /// API: GET {base}/api/v3/exchangeInfo
    /// Symbols not in TRADING status are excluded.
    pub async fn trade_symbols(&self, quote_filter: Option<&str>) -> Result<Vec<TradeSymbol>> {
        let url = format!("{}/api/v3/exchangeInfo", self.base_url);

        tracing::info!("Fetching exchange info from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StreamError::Rest(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StreamError::Rest(format!(
                "exchangeInfo returned HTTP {}",
                response.status().as_u16()
            )));
        }

        let info: ExchangeInfo = response
            .json()
            .await
            .map_err(|e| StreamError::Rest(e.to_string()))?;

        let symbols: Vec<TradeSymbol> = info
            .symbols
            .into_iter()
            .filter(|s| s.status == "TRADING")
            .filter(|s| quote_filter.map_or(true, |q| s.symbol.quote_asset == q))
            .map(|s| s.symbol)
            .collect();

        tracing::info!("Snapshot holds {} tradable symbols", symbols.len());

        Ok(symbols)
    }
}

/// exchangeInfo response envelope
#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    status: String,
    #[serde(flatten)]
    symbol: TradeSymbol,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXCHANGE_INFO: &str = r#"{
        "timezone": "UTC",
        "symbols": [
            {"symbol":"LTCBTC","status":"TRADING","baseAsset":"LTC","quoteAsset":"BTC"},
            {"symbol":"ETHUSDT","status":"TRADING","baseAsset":"ETH","quoteAsset":"USDT"},
            {"symbol":"OLDBTC","status":"BREAK","baseAsset":"OLD","quoteAsset":"BTC"}
        ]
    }"#;

    #[test]
    fn test_exchange_info_deserialize() {
        let info: ExchangeInfo = serde_json::from_str(EXCHANGE_INFO).unwrap();
        assert_eq!(info.symbols.len(), 3);
        assert_eq!(info.symbols[0].symbol.symbol, "LTCBTC");
        assert_eq!(info.symbols[0].status, "TRADING");
        assert_eq!(info.symbols[2].status, "BREAK");
    }

    #[test]
    fn test_trading_filter() {
        let info: ExchangeInfo = serde_json::from_str(EXCHANGE_INFO).unwrap();
        let trading: Vec<_> = info
            .symbols
            .into_iter()
            .filter(|s| s.status == "TRADING")
            .collect();
        assert_eq!(trading.len(), 2);
    }
}
