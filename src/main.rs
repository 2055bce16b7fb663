//! Demo binary: stream public market data to the log
//!
//! Loads config.toml (or defaults), builds the client and subscribes to
//! ticker, trade and 1m kline streams for BTC_USDT until Ctrl-C.

use binance_stream::core::{CurrencyPair, KlinePeriod};
use binance_stream::infrastructure::init_logging;
use binance_stream::{BinanceWs, Config, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_logging();

    let config = Config::load().unwrap_or_default();
    let client = BinanceWs::connect(config).await?;
    tracing::info!("symbol snapshot loaded: {} symbols", client.symbols().len());

    client.on_ticker(|t| {
        tracing::info!("ticker {} last={} bid={} ask={} vol={}", t.pair, t.last, t.buy, t.sell, t.vol);
    });
    client.on_trade(|t| {
        tracing::info!("trade {} {:?} {} @ {}", t.pair, t.side, t.amount, t.price);
    });
    client.on_kline(|k, period| {
        tracing::info!("kline {} {:?} o={} h={} l={} c={}", k.pair, period, k.open, k.high, k.low, k.close);
    });

    let pair = CurrencyPair::new("BTC", "USDT");
    client.subscribe_ticker(&pair).await?;
    client.subscribe_trade(&pair).await?;
    client.subscribe_kline(&pair, KlinePeriod::Min1).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    client.close().await;

    Ok(())
}
