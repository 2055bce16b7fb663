//! Market data event records
//!
//! One record per inbound stream message, handed to the caller's handler and
//! not retained by the client. Prices and volumes are f64; timestamps are
//! epoch milliseconds.

use super::CurrencyPair;

/// Taker side of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// 24h rolling ticker event
#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    pub pair: CurrencyPair,
    /// Last traded price
    pub last: f64,
    /// Best bid price
    pub buy: f64,
    /// Best ask price
    pub sell: f64,
    pub high: f64,
    pub low: f64,
    /// 24h base asset volume
    pub vol: f64,
    /// Event time, epoch ms
    pub date: u64,
}

/// Candlestick event
#[derive(Debug, Clone, PartialEq)]
pub struct Kline {
    pub pair: CurrencyPair,
    /// Candle open time, epoch ms
    pub timestamp: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub vol: f64,
}

/// Single trade event
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub pair: CurrencyPair,
    pub tid: u64,
    pub side: TradeSide,
    pub amount: f64,
    pub price: f64,
    /// Event time, epoch ms
    pub date: u64,
}

/// One price level of an order book
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthLevel {
    pub price: f64,
    pub amount: f64,
}

/// Order book snapshot event
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Depth {
    pub pair: Option<CurrencyPair>,
    /// Update time, epoch ms
    pub ts: u64,
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}
