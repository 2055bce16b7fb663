//! WebSocket plumbing: connection, subscription endpoints, message routing
//! and the background stream loop.

pub mod connection;
pub mod router;
pub mod stream;
pub mod subscription;

pub use connection::WebSocketConnection;
pub use router::MessageRouter;
pub use subscription::{build_endpoint, Channel, ChannelKind, StreamEndpoint};
