//! Message router and per-kind parsers
//!
//! One decompressed frame in, one handler invocation out. Frames are decoded
//! into a generic JSON document, classified by the `"e"` discriminator field
//! and parsed into the matching domain record. Every error here is scoped to
//! the single frame - the caller logs it and moves to the next one.
//!
//! Numeric fields may arrive as native JSON numbers or as numeric strings;
//! the coercion helpers accept both.

use std::sync::Arc;

use serde_json::Value;

use crate::callbacks::Callbacks;
use crate::core::{
    CurrencyPair, Depth, DepthLevel, Kline, KlinePeriod, SymbolTable, Ticker, Trade, TradeSide,
};
use crate::{Result, StreamError};

/// Classifies inbound frames and dispatches typed events
pub struct MessageRouter {
    symbols: Arc<SymbolTable>,
}

impl MessageRouter {
    pub fn new(symbols: Arc<SymbolTable>) -> Self {
        Self { symbols }
    }

    /// Decode, classify and dispatch a single frame
    ///
    /// Errors are per-frame: the frame is dropped and the stream continues.
    pub fn dispatch(&self, frame: &[u8], callbacks: &Callbacks) -> Result<()> {
        let doc: Value =
            serde_json::from_slice(frame).map_err(|e| StreamError::Decode(e.to_string()))?;

        let kind = doc
            .get("e")
            .and_then(Value::as_str)
            .ok_or_else(|| StreamError::Decode("missing discriminator field \"e\"".to_string()))?;

        match kind {
            "24hrTicker" => self.dispatch_ticker(&doc, callbacks),
            "kline" => self.dispatch_kline(&doc, callbacks),
            "trade" => self.dispatch_trade(&doc, callbacks),
            other => Err(StreamError::UnsupportedMessage(other.to_string())),
        }
    }

    fn dispatch_ticker(&self, doc: &Value, callbacks: &Callbacks) -> Result<()> {
        let pair = self.resolve_pair(doc)?;
        let ticker = Ticker {
            pair,
            last: field_f64(doc, "c")?,
            vol: field_f64(doc, "v")?,
            low: field_f64(doc, "l")?,
            high: field_f64(doc, "h")?,
            buy: field_f64(doc, "b")?,
            sell: field_f64(doc, "a")?,
            date: field_u64(doc, "E")?,
        };

        if let Some(callback) = &callbacks.ticker {
            callback(ticker);
        }
        Ok(())
    }

    fn dispatch_kline(&self, doc: &Value, callbacks: &Callbacks) -> Result<()> {
        let pair = self.resolve_pair(doc)?;

        let k = doc
            .get("k")
            .filter(|v| v.is_object())
            .ok_or_else(|| StreamError::Decode("kline frame without \"k\" object".to_string()))?;

        let code = k
            .get("i")
            .and_then(Value::as_str)
            .ok_or_else(|| StreamError::Decode("kline frame without period code".to_string()))?;
        let period = KlinePeriod::from_code(code)
            .ok_or_else(|| StreamError::Decode(format!("unknown kline period code: {}", code)))?;

        let kline = Kline {
            pair,
            timestamp: field_u64(k, "t")?,
            open: field_f64(k, "o")?,
            high: field_f64(k, "h")?,
            low: field_f64(k, "l")?,
            close: field_f64(k, "c")?,
            vol: field_f64(k, "v")?,
        };

        if let Some(callback) = &callbacks.kline {
            callback(kline, period);
        }
        Ok(())
    }

    fn dispatch_trade(&self, doc: &Value, callbacks: &Callbacks) -> Result<()> {
        let pair = self.resolve_pair(doc)?;

        let is_buyer_maker = doc
            .get("m")
            .and_then(Value::as_bool)
            .ok_or_else(|| StreamError::Decode("trade frame without maker flag".to_string()))?;
        // m=false: taker-initiated, classified as a sell
        let side = if is_buyer_maker {
            TradeSide::Buy
        } else {
            TradeSide::Sell
        };

        let trade = Trade {
            pair,
            tid: field_u64(doc, "t")?,
            side,
            amount: field_f64(doc, "q")?,
            price: field_f64(doc, "p")?,
            date: field_u64(doc, "E")?,
        };

        if let Some(callback) = &callbacks.trade {
            callback(trade);
        }
        Ok(())
    }

    /// Parse a depth payload into an order book snapshot
    ///
    /// Not reachable from `dispatch`: the depth channel can be subscribed
    /// but its frames are not classified yet.
    /// TODO: wire into dispatch once the partial-depth frame shape
    /// (depthUpdate vs. levels snapshot) is settled.
    pub fn parse_depth(&self, doc: &Value) -> Result<Depth> {
        let pair = doc
            .get("s")
            .and_then(Value::as_str)
            .and_then(|s| self.symbols.resolve(s));

        Ok(Depth {
            pair,
            ts: doc.get("E").and_then(coerce_u64).unwrap_or(0),
            bids: parse_levels(doc.get("bids"))?,
            asks: parse_levels(doc.get("asks"))?,
        })
    }

    fn resolve_pair(&self, doc: &Value) -> Result<CurrencyPair> {
        let symbol = doc
            .get("s")
            .and_then(Value::as_str)
            .ok_or_else(|| StreamError::Decode("missing symbol field \"s\"".to_string()))?;

        self.symbols
            .resolve(symbol)
            .ok_or_else(|| StreamError::UnresolvedSymbol(symbol.to_string()))
    }
}

/// Parse a `[["price","qty"], ...]` level array
fn parse_levels(value: Option<&Value>) -> Result<Vec<DepthLevel>> {
    let Some(levels) = value.and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    levels
        .iter()
        .map(|level| {
            let entry = level
                .as_array()
                .filter(|e| e.len() >= 2)
                .ok_or_else(|| StreamError::Decode("malformed depth level".to_string()))?;
            let price = coerce_f64(&entry[0])
                .ok_or_else(|| StreamError::Decode("non-numeric depth price".to_string()))?;
            let amount = coerce_f64(&entry[1])
                .ok_or_else(|| StreamError::Decode("non-numeric depth amount".to_string()))?;
            Ok(DepthLevel { price, amount })
        })
        .collect()
}

/// Coerce a JSON number or numeric string to f64
fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Coerce a JSON number or numeric string to u64
fn coerce_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Value::String(s) => s
            .parse::<u64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().map(|f| f as u64)),
        _ => None,
    }
}

fn field_f64(doc: &Value, key: &str) -> Result<f64> {
    doc.get(key).and_then(coerce_f64).ok_or_else(|| {
        StreamError::Decode(format!("missing or non-numeric field \"{}\"", key))
    })
}

fn field_u64(doc: &Value, key: &str) -> Result<u64> {
    doc.get(key).and_then(coerce_u64).ok_or_else(|| {
        StreamError::Decode(format!("missing or non-numeric field \"{}\"", key))
    })
}
