//! Immutable symbol table
//!
//! Maps raw exchange symbols (`LTCBTC`) to normalized currency pairs. Built
//! once from the REST snapshot at construction; never mutated afterwards, so
//! concurrent reads need no locking. Lookup is a linear scan - the list is
//! small and read-heavy.

use crate::core::CurrencyPair;
use crate::{Result, StreamError};
use serde::Deserialize;

/// One tradable symbol from the exchange metadata snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct TradeSymbol {
    pub symbol: String,
    #[serde(rename = "baseAsset")]
    pub base_asset: String,
    #[serde(rename = "quoteAsset")]
    pub quote_asset: String,
}

/// Immutable exchange-symbol -> pair mapping
#[derive(Debug)]
pub struct SymbolTable {
    entries: Vec<TradeSymbol>,
}

impl SymbolTable {
    /// Build the table; an empty snapshot is a construction failure since
    /// the client cannot resolve any message without it
    pub fn new(entries: Vec<TradeSymbol>) -> Result<Self> {
        if entries.is_empty() {
            return Err(StreamError::Initialization(
                "trade symbol snapshot is empty".to_string(),
            ));
        }
        Ok(Self { entries })
    }

    /// Resolve an exchange symbol to its normalized pair
    pub fn resolve(&self, exchange_symbol: &str) -> Option<CurrencyPair> {
        self.entries
            .iter()
            .find(|s| s.symbol == exchange_symbol)
            .map(|s| CurrencyPair::new(&s.base_asset, &s.quote_asset))
    }

    /// Number of known symbols
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
