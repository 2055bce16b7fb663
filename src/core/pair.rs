//! Currency pair value type
//!
//! Immutable base/quote asset pair. The exchange-facing symbol is the bare
//! concatenation (`LTCBTC`); stream endpoints want it lowercased.

use std::fmt;

/// Normalized base/quote currency pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    base: String,
    quote: String,
}

impl CurrencyPair {
    /// Create a pair; asset identifiers are stored uppercase
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.to_uppercase(),
            quote: quote.to_uppercase(),
        }
    }

    /// Base asset identifier
    #[inline]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Quote asset identifier
    #[inline]
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Exchange symbol form, e.g. `LTCBTC`
    pub fn symbol(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }

    /// Lowercased symbol form used in stream names, e.g. `ltcbtc`
    pub fn stream_symbol(&self) -> String {
        self.symbol().to_lowercase()
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.base, self.quote)
    }
}
