//! Core domain types: currency pairs, kline periods, market data records
//! and the immutable symbol table.

pub mod market_data;
pub mod pair;
pub mod period;
pub mod symbols;

pub use market_data::{Depth, DepthLevel, Kline, Ticker, Trade, TradeSide};
pub use pair::CurrencyPair;
pub use period::KlinePeriod;
pub use symbols::{SymbolTable, TradeSymbol};
