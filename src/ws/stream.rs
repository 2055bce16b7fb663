//! Background stream loop
//!
//! One worker task per client owns the socket. It multiplexes subscribe
//! directives from the client over the shared connection, inflates and
//! routes inbound frames strictly sequentially, refreshes the connection on
//! a fixed schedule and absorbs I/O failures with backoff reconnects.
//! Handlers run inline on this loop.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::protocol::Message;

use crate::callbacks::Callbacks;
use crate::infrastructure::config::WsConfig;
use crate::ws::connection::{self, WebSocketConnection};
use crate::ws::router::MessageRouter;
use crate::StreamError;

/// Directives from the client to its worker
#[derive(Debug)]
pub(crate) enum Command {
    /// Add a stream to the shared socket
    Subscribe(String),
    /// Close the socket and stop the loop
    Shutdown,
}

/// Owns the socket and runs the receive loop
pub(crate) struct StreamWorker {
    url: String,
    router: MessageRouter,
    callbacks: Arc<RwLock<Callbacks>>,
    refresh_interval: Duration,
    dial_timeout: Duration,
    reconnect_delay: Duration,
    max_reconnect_delay: Duration,
    /// Streams to resubmit after every reconnect
    streams: Vec<String>,
    next_request_id: u64,
    commands: mpsc::Receiver<Command>,
}

impl StreamWorker {
    pub(crate) fn new(
        config: &WsConfig,
        router: MessageRouter,
        callbacks: Arc<RwLock<Callbacks>>,
        commands: mpsc::Receiver<Command>,
    ) -> Self {
        Self {
            url: config.base_url.clone(),
            router,
            callbacks,
            // interval_at rejects a zero period
            refresh_interval: Duration::from_secs(config.refresh_secs.max(1)),
            dial_timeout: Duration::from_secs(config.dial_timeout_secs),
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
            max_reconnect_delay: Duration::from_secs(config.max_reconnect_delay_secs),
            streams: Vec::new(),
            next_request_id: 0,
            commands,
        }
    }

    /// Run until the client shuts down or drops its command channel
    pub(crate) async fn run(mut self, mut conn: WebSocketConnection) {
        let mut refresh = interval_at(
            Instant::now() + self.refresh_interval,
            self.refresh_interval,
        );
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Subscribe(stream)) => {
                        if !self.streams.contains(&stream) {
                            self.streams.push(stream.clone());
                        }
                        if let Err(e) = self.send_subscribe(&mut conn, std::slice::from_ref(&stream)).await {
                            tracing::warn!("subscribe send failed: {}", e);
                            if !self.reconnect(&mut conn).await {
                                break;
                            }
                        }
                    }
                    Some(Command::Shutdown) | None => {
                        let _ = conn.close().await;
                        break;
                    }
                },
                _ = refresh.tick() => {
                    tracing::info!("scheduled connection refresh");
                    if !self.reconnect(&mut conn).await {
                        break;
                    }
                }
                msg = conn.recv() => match msg {
                    Ok(Some(Message::Text(text))) => self.route(text.as_bytes()),
                    Ok(Some(Message::Binary(data))) => match connection::inflate(&data) {
                        Ok(frame) => self.route(&frame),
                        Err(e) => tracing::warn!("dropping frame that failed to inflate: {}", e),
                    },
                    Ok(Some(Message::Ping(payload))) => {
                        if conn.send(Message::Pong(payload)).await.is_err()
                            && !self.reconnect(&mut conn).await
                        {
                            break;
                        }
                    }
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        tracing::warn!("connection closed by server");
                        if !self.reconnect(&mut conn).await {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("receive failed: {}", e);
                        if !self.reconnect(&mut conn).await {
                            break;
                        }
                    }
                },
            }
        }

        tracing::info!("stream worker stopped");
    }

    /// Route one decompressed frame; all errors stay scoped to the frame
    fn route(&self, frame: &[u8]) {
        let callbacks = self.callbacks.read();
        match self.router.dispatch(frame, &callbacks) {
            Ok(()) => {}
            Err(StreamError::UnsupportedMessage(kind)) => {
                tracing::debug!("dropping unsupported message kind: {}", kind);
            }
            Err(e) => tracing::warn!("dropping frame: {}", e),
        }
    }

    async fn send_subscribe(
        &mut self,
        conn: &mut WebSocketConnection,
        streams: &[String],
    ) -> connection::Result<()> {
        self.next_request_id += 1;
        conn.send_text(&subscribe_frame(streams, self.next_request_id))
            .await
    }

    /// Tear down and re-dial, resubmitting all active streams
    ///
    /// Retries with exponential backoff until a connection carrying the
    /// subscriptions is live again; transient failures never surface to the
    /// caller. The command channel stays live throughout: a shutdown (or the
    /// client dropping its sender) ends the retry loop immediately, and new
    /// subscribe directives are queued for the next successful dial. Returns
    /// false when the worker must stop.
    async fn reconnect(&mut self, conn: &mut WebSocketConnection) -> bool {
        let _ = conn.close().await;

        let mut delay = self.reconnect_delay;
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Subscribe(stream)) => {
                        if !self.streams.contains(&stream) {
                            self.streams.push(stream);
                        }
                        continue;
                    }
                    Some(Command::Shutdown) | None => return false,
                },
                dialed = WebSocketConnection::connect(&self.url, self.dial_timeout) => match dialed {
                    Ok(new_conn) => {
                        *conn = new_conn;
                        let streams = self.streams.clone();
                        if streams.is_empty() {
                            return true;
                        }
                        match self.send_subscribe(conn, &streams).await {
                            Ok(()) => {
                                tracing::info!(
                                    streams = streams.len(),
                                    "reconnected and resubmitted subscriptions"
                                );
                                return true;
                            }
                            Err(e) => {
                                tracing::warn!("resubscribe failed: {}", e);
                                let _ = conn.close().await;
                            }
                        }
                    }
                    Err(e) => tracing::warn!("reconnect attempt failed: {}", e),
                },
            }

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Subscribe(stream)) => {
                        if !self.streams.contains(&stream) {
                            self.streams.push(stream);
                        }
                    }
                    Some(Command::Shutdown) | None => return false,
                },
                _ = sleep(delay) => {}
            }
            delay = std::cmp::min(delay * 2, self.max_reconnect_delay);
        }
    }
}

/// Multiplexed subscribe directive for the shared socket
fn subscribe_frame(streams: &[String], id: u64) -> String {
    serde_json::json!({
        "method": "SUBSCRIBE",
        "params": streams,
        "id": id,
    })
    .to_string()
}
