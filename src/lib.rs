//! Streaming market-data client for the Binance public WebSocket feed
//!
//! Normalizes ticker, kline and trade stream messages into typed domain
//! events and delivers them to caller-registered handlers over a single
//! lazily-dialed, multiplexed, periodically-refreshed connection.

pub mod callbacks;
pub mod client;
pub mod core;
pub mod infrastructure;
pub mod rest;
pub mod ws;

pub use client::BinanceWs;
pub use infrastructure::config::Config;

use thiserror::Error;

/// Main error type for the streaming client
#[derive(Error, Debug)]
pub enum StreamError {
    /// Invalid subscribe parameter or missing handler; no network action taken
    #[error("configuration error: {0}")]
    Config(String),

    /// Construction-time failure (symbol snapshot unavailable or empty)
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// Frame could not be decoded into a message document
    #[error("failed to decode frame: {0}")]
    Decode(String),

    /// Frame carried a discriminator outside the known kinds
    #[error("unsupported message kind: {0}")]
    UnsupportedMessage(String),

    /// Message referenced a symbol absent from the snapshot table
    #[error("unresolved symbol: {0}")]
    UnresolvedSymbol(String),

    /// WebSocket-level failure
    #[error("connection error: {0}")]
    Connection(String),

    /// REST API error
    #[error("REST API error: {0}")]
    Rest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, StreamError>;
