//! WebSocket connection
//!
//! Thin wrapper over tokio-tungstenite: dial with timeout, send, receive,
//! close, plus raw-deflate inflation for compressed inbound frames.

use std::io::Read;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};

use futures_util::{SinkExt, StreamExt};

/// A single WebSocket connection
pub struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    state: ConnectionState,
    url: String,
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// Errors that can occur with WebSocket connections
#[derive(Debug, thiserror::Error)]
pub enum WsError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Send failed: {0}")]
    SendFailed(String),
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),
    #[error("Dial timed out")]
    Timeout,
    #[error("Not connected")]
    NotConnected,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, WsError>;

impl WebSocketConnection {
    /// Dial a WebSocket endpoint
    ///
    /// The timeout covers only the dial; once established, stream liveness
    /// is the caller's concern (periodic refresh, not a read timeout).
    pub async fn connect(url: &str, dial_timeout: Duration) -> Result<Self> {
        let (ws_stream, _) = timeout(dial_timeout, connect_async(url))
            .await
            .map_err(|_| WsError::Timeout)?
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        if let MaybeTlsStream::Plain(ref tcp) = ws_stream.get_ref() {
            tcp.set_nodelay(true)
                .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;
        }

        Ok(Self {
            stream: ws_stream,
            state: ConnectionState::Connected,
            url: url.to_string(),
        })
    }

    /// Send a message
    pub async fn send(&mut self, msg: Message) -> Result<()> {
        if self.state != ConnectionState::Connected {
            return Err(WsError::NotConnected);
        }

        self.stream
            .send(msg)
            .await
            .map_err(|e| WsError::SendFailed(e.to_string()))
    }

    /// Send a text message
    #[inline]
    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.send(Message::text(text)).await
    }

    /// Receive the next message; `None` on graceful close
    pub async fn recv(&mut self) -> Result<Option<Message>> {
        if self.state != ConnectionState::Connected {
            return Err(WsError::NotConnected);
        }

        match self.stream.next().await {
            Some(Ok(msg)) => {
                if let Message::Close(_) = msg {
                    self.state = ConnectionState::Disconnected;
                }
                Ok(Some(msg))
            }
            Some(Err(e)) => {
                self.state = ConnectionState::Disconnected;
                Err(WsError::ReceiveFailed(e.to_string()))
            }
            None => {
                self.state = ConnectionState::Disconnected;
                Ok(None)
            }
        }
    }

    /// Current connection state
    #[inline(always)]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Check if connected
    #[inline(always)]
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Close the connection gracefully
    pub async fn close(&mut self) -> Result<()> {
        if self.state == ConnectionState::Connected {
            let _ = self.stream.close(None).await;
            self.state = ConnectionState::Disconnected;
        }
        Ok(())
    }

    /// Connection URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Inflate a raw-deflate compressed frame
pub fn inflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = flate2::read::DeflateDecoder::new(data);
    let mut out = Vec::with_capacity(data.len() * 4);
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_inflate_round_trip() {
        let payload = br#"{"e":"24hrTicker","s":"LTCBTC"}"#;
        let mut encoder =
            flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(payload).unwrap();
        let compressed = encoder.finish().unwrap();

        let inflated = inflate(&compressed).unwrap();
        assert_eq!(inflated, payload);
    }

    #[test]
    fn test_inflate_garbage_fails() {
        assert!(inflate(&[0xff, 0x00, 0xab]).is_err());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(WsError::NotConnected.to_string(), "Not connected");
        assert_eq!(WsError::Timeout.to_string(), "Dial timed out");
    }
}
