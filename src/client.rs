//! Public client surface
//!
//! `BinanceWs` resolves the symbol snapshot at construction, then lazily
//! dials the stream socket on the first subscribe call. The dial happens at
//! most once per client instance: concurrent first subscribes are serialized
//! through a `OnceCell` gate, so every caller ends up talking to the same
//! background worker.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{mpsc, OnceCell};

use crate::callbacks::Callbacks;
use crate::core::{CurrencyPair, Depth, Kline, KlinePeriod, SymbolTable, Ticker, Trade, TradeSymbol};
use crate::infrastructure::config::Config;
use crate::rest::ExchangeInfoClient;
use crate::ws::connection::WebSocketConnection;
use crate::ws::router::MessageRouter;
use crate::ws::stream::{Command, StreamWorker};
use crate::ws::subscription::{build_endpoint, Channel};
use crate::{Result, StreamError};

/// Streaming market-data client
pub struct BinanceWs {
    config: Config,
    symbols: Arc<SymbolTable>,
    callbacks: Arc<RwLock<Callbacks>>,
    worker: OnceCell<WorkerHandle>,
}

struct WorkerHandle {
    commands: mpsc::Sender<Command>,
    _task: tokio::task::JoinHandle<()>,
}

impl BinanceWs {
    /// Construct the client, fetching the symbol snapshot over REST
    ///
    /// The snapshot is fetched exactly once; an unreachable API or an empty
    /// result is fatal since no inbound message could ever resolve.
    pub async fn connect(config: Config) -> Result<Self> {
        let rest = ExchangeInfoClient::new(&config.rest);
        let records = rest
            .trade_symbols(config.rest.quote_filter.as_deref())
            .await
            .map_err(|e| StreamError::Initialization(e.to_string()))?;
        Self::with_symbols(config, records)
    }

    /// Construct from a caller-supplied snapshot (tests, cached metadata)
    pub fn with_symbols(config: Config, records: Vec<TradeSymbol>) -> Result<Self> {
        let symbols = Arc::new(SymbolTable::new(records)?);
        Ok(Self {
            config,
            symbols,
            callbacks: Arc::new(RwLock::new(Callbacks::default())),
            worker: OnceCell::new(),
        })
    }

    /// Register the ticker handler
    ///
    /// Handlers must be registered before subscribing; replacing a handler
    /// while the stream is live is a precondition violation.
    pub fn on_ticker(&self, handler: impl Fn(Ticker) + Send + Sync + 'static) {
        self.callbacks.write().ticker = Some(Box::new(handler));
    }

    /// Register the depth handler
    pub fn on_depth(&self, handler: impl Fn(Depth) + Send + Sync + 'static) {
        self.callbacks.write().depth = Some(Box::new(handler));
    }

    /// Register the trade handler
    pub fn on_trade(&self, handler: impl Fn(Trade) + Send + Sync + 'static) {
        self.callbacks.write().trade = Some(Box::new(handler));
    }

    /// Register the kline handler
    pub fn on_kline(&self, handler: impl Fn(Kline, KlinePeriod) + Send + Sync + 'static) {
        self.callbacks.write().kline = Some(Box::new(handler));
    }

    /// Subscribe to the 24h ticker stream for a pair
    pub async fn subscribe_ticker(&self, pair: &CurrencyPair) -> Result<()> {
        self.subscribe(pair, Channel::Ticker).await
    }

    /// Subscribe to the trade stream for a pair
    pub async fn subscribe_trade(&self, pair: &CurrencyPair) -> Result<()> {
        self.subscribe(pair, Channel::Trade).await
    }

    /// Subscribe to the kline stream for a pair and period
    pub async fn subscribe_kline(&self, pair: &CurrencyPair, period: KlinePeriod) -> Result<()> {
        self.subscribe(pair, Channel::Kline(period)).await
    }

    /// Subscribe to the partial depth stream for a pair
    ///
    /// `size` must be 5, 10 or 20.
    pub async fn subscribe_depth(&self, pair: &CurrencyPair, size: u32) -> Result<()> {
        self.subscribe(pair, Channel::Depth(size)).await
    }

    async fn subscribe(&self, pair: &CurrencyPair, channel: Channel) -> Result<()> {
        // validate before any network action
        let kind = channel.kind();
        if !self.callbacks.read().has(kind) {
            return Err(StreamError::Config(format!(
                "{} callback not set",
                kind.name()
            )));
        }
        let endpoint = build_endpoint(&self.config.ws.base_url, pair, &channel)?;

        let worker = self.worker.get_or_try_init(|| self.start_worker()).await?;
        worker
            .commands
            .send(Command::Subscribe(endpoint.stream))
            .await
            .map_err(|_| StreamError::Connection("stream worker is gone".to_string()))?;
        Ok(())
    }

    /// Dial the socket and spawn the receive loop; runs at most once
    async fn start_worker(&self) -> Result<WorkerHandle> {
        let ws = &self.config.ws;
        let conn = WebSocketConnection::connect(
            &ws.base_url,
            Duration::from_secs(ws.dial_timeout_secs),
        )
        .await
        .map_err(|e| StreamError::Connection(e.to_string()))?;

        tracing::info!("connected to {}", ws.base_url);

        let (commands, rx) = mpsc::channel(64);
        let worker = StreamWorker::new(
            ws,
            MessageRouter::new(self.symbols.clone()),
            self.callbacks.clone(),
            rx,
        );
        let task = tokio::spawn(worker.run(conn));

        Ok(WorkerHandle {
            commands,
            _task: task,
        })
    }

    /// Stop the receive loop and release the socket
    ///
    /// A handler already running completes before the loop stops. Dropping
    /// the client has the same effect through the closed command channel.
    pub async fn close(&self) {
        if let Some(worker) = self.worker.get() {
            let _ = worker.commands.send(Command::Shutdown).await;
        }
    }

    /// The immutable symbol table built at construction
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_tungstenite::tungstenite::protocol::Message;

    fn snapshot() -> Vec<TradeSymbol> {
        vec![TradeSymbol {
            symbol: "LTCBTC".to_string(),
            base_asset: "LTC".to_string(),
            quote_asset: "BTC".to_string(),
        }]
    }

    fn config_for(url: &str) -> Config {
        let mut config = Config::default();
        config.ws.base_url = format!("{}/ws", url);
        config.ws.dial_timeout_secs = 5;
        config
    }

    /// Local WebSocket server counting connections. When `push` is set, the
    /// server sends it as a text frame after the first inbound message (the
    /// SUBSCRIBE directive).
    async fn spawn_server(connections: Arc<AtomicUsize>, push: Option<String>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                connections.fetch_add(1, Ordering::SeqCst);
                let push = push.clone();
                tokio::spawn(async move {
                    let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                    if let Some(frame) = push {
                        let _ = ws.next().await;
                        let _ = ws.send(Message::text(frame)).await;
                    }
                    while let Some(Ok(_)) = ws.next().await {}
                });
            }
        });

        format!("ws://{}", addr)
    }

    #[tokio::test]
    async fn test_subscribe_without_callback_takes_no_network_action() {
        let connections = Arc::new(AtomicUsize::new(0));
        let url = spawn_server(connections.clone(), None).await;
        let client = BinanceWs::with_symbols(config_for(&url), snapshot()).unwrap();

        let err = client
            .subscribe_ticker(&CurrencyPair::new("LTC", "BTC"))
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::Config(_)));
        assert!(err.to_string().contains("ticker callback not set"));
        assert_eq!(connections.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_depth_size_takes_no_network_action() {
        let connections = Arc::new(AtomicUsize::new(0));
        let url = spawn_server(connections.clone(), None).await;
        let client = BinanceWs::with_symbols(config_for(&url), snapshot()).unwrap();
        client.on_depth(|_| {});

        let err = client
            .subscribe_depth(&CurrencyPair::new("LTC", "BTC"), 7)
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::Config(_)));
        assert_eq!(connections.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_first_subscribes_dial_once() {
        let connections = Arc::new(AtomicUsize::new(0));
        let url = spawn_server(connections.clone(), None).await;
        let client = Arc::new(BinanceWs::with_symbols(config_for(&url), snapshot()).unwrap());
        client.on_ticker(|_| {});

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let client = client.clone();
            tasks.push(tokio::spawn(async move {
                client.subscribe_ticker(&CurrencyPair::new("LTC", "BTC")).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        // give any stray dial a moment to land
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(connections.load(Ordering::SeqCst), 1);

        client.close().await;
    }

    #[tokio::test]
    async fn test_ticker_delivered_to_handler() {
        let frame = r#"{
            "e": "24hrTicker", "E": 1620000000000, "s": "LTCBTC",
            "c": "50.5", "v": "100", "l": "49", "h": "52", "b": "50.1", "a": "50.9"
        }"#;
        let connections = Arc::new(AtomicUsize::new(0));
        let url = spawn_server(connections.clone(), Some(frame.to_string())).await;
        let client = BinanceWs::with_symbols(config_for(&url), snapshot()).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        client.on_ticker(move |ticker| {
            let _ = tx.send(ticker);
        });

        client
            .subscribe_ticker(&CurrencyPair::new("LTC", "BTC"))
            .await
            .unwrap();

        let ticker = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no ticker within timeout")
            .unwrap();
        assert_eq!(ticker.pair, CurrencyPair::new("LTC", "BTC"));
        assert_eq!(ticker.last, 50.5);
        assert_eq!(ticker.date, 1_620_000_000_000);

        client.close().await;
    }

    #[tokio::test]
    async fn test_scheduled_refresh_redials_and_resubmits() {
        // record every inbound text frame tagged with its connection ordinal
        let frames: Arc<Mutex<Vec<(usize, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        {
            let frames = frames.clone();
            tokio::spawn(async move {
                let mut ordinal = 0usize;
                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        break;
                    };
                    let conn_id = ordinal;
                    ordinal += 1;
                    let frames = frames.clone();
                    tokio::spawn(async move {
                        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                        while let Some(Ok(msg)) = ws.next().await {
                            if let Message::Text(text) = msg {
                                frames.lock().push((conn_id, text.to_string()));
                            }
                        }
                    });
                }
            });
        }

        let mut config = config_for(&format!("ws://{}", addr));
        config.ws.refresh_secs = 1;
        let client = BinanceWs::with_symbols(config, snapshot()).unwrap();
        client.on_trade(|_| {});

        client
            .subscribe_trade(&CurrencyPair::new("LTC", "BTC"))
            .await
            .unwrap();

        // the 1s refresh interval must tear down, re-dial and resubmit the
        // active stream on the fresh connection
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        let recorded = frames.lock().clone();
        let resubscribed: std::collections::HashSet<usize> = recorded
            .iter()
            .filter(|(_, frame)| frame.contains("SUBSCRIBE") && frame.contains("ltcbtc@trade"))
            .map(|(conn_id, _)| *conn_id)
            .collect();
        assert!(
            resubscribed.len() >= 2,
            "expected the subscription on at least two connections, got {:?}",
            recorded
        );

        client.close().await;
    }

    #[tokio::test]
    async fn test_close_stops_worker_while_endpoint_is_down() {
        // the first connection completes the handshake then drops, pushing
        // the worker into its retry loop; later dials are accepted at the
        // TCP level but never answered, so every redial attempt times out
        let dials = Arc::new(AtomicUsize::new(0));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        {
            let dials = dials.clone();
            tokio::spawn(async move {
                let (stream, _) = listener.accept().await.unwrap();
                dials.fetch_add(1, Ordering::SeqCst);
                let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                let _ = ws.next().await; // the SUBSCRIBE directive
                drop(ws);
                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        break;
                    };
                    dials.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(async move {
                        let _held = stream;
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    });
                }
            });
        }

        let mut config = config_for(&format!("ws://{}", addr));
        config.ws.dial_timeout_secs = 1;
        let client = BinanceWs::with_symbols(config, snapshot()).unwrap();
        client.on_trade(|_| {});
        client
            .subscribe_trade(&CurrencyPair::new("LTC", "BTC"))
            .await
            .unwrap();

        // let the worker enter the retry loop, then stop it
        tokio::time::sleep(Duration::from_millis(500)).await;
        client.close().await;

        // absorb any dial already in flight when the shutdown landed
        tokio::time::sleep(Duration::from_millis(500)).await;
        let settled = dials.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(dials.load(Ordering::SeqCst), settled);
    }

    #[test]
    fn test_empty_snapshot_is_fatal() {
        let result = BinanceWs::with_symbols(Config::default(), Vec::new());
        assert!(matches!(result, Err(StreamError::Initialization(_))));
    }
}
