//! Stream subscription endpoints
//!
//! Builds validated channel endpoint strings of the form
//! `{base}/{lowercased-pair-symbol}@{channel}[parameter]` and the stream
//! names multiplexed over the shared socket.

use crate::core::{CurrencyPair, KlinePeriod};
use crate::{Result, StreamError};

/// Depth sizes the exchange accepts
pub const DEPTH_SIZES: [u32; 3] = [5, 10, 20];

/// A subscription channel for one currency pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Ticker,
    Trade,
    Kline(KlinePeriod),
    Depth(u32),
}

/// Channel kind without parameters, for handler-slot lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Ticker,
    Trade,
    Kline,
    Depth,
}

impl ChannelKind {
    /// Lowercase channel name, used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            ChannelKind::Ticker => "ticker",
            ChannelKind::Trade => "trade",
            ChannelKind::Kline => "kline",
            ChannelKind::Depth => "depth",
        }
    }
}

impl Channel {
    /// Parameterless kind of this channel
    pub fn kind(&self) -> ChannelKind {
        match self {
            Channel::Ticker => ChannelKind::Ticker,
            Channel::Trade => ChannelKind::Trade,
            Channel::Kline(_) => ChannelKind::Kline,
            Channel::Depth(_) => ChannelKind::Depth,
        }
    }

    /// Stream name suffix, e.g. `ticker` or `kline_5m`
    fn suffix(&self) -> String {
        match self {
            Channel::Ticker => "ticker".to_string(),
            Channel::Trade => "trade".to_string(),
            Channel::Kline(period) => format!("kline_{}", period.code()),
            Channel::Depth(size) => format!("depth{}", size),
        }
    }
}

/// A validated stream endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEndpoint {
    /// Stream name, e.g. `ltcbtc@ticker`
    pub stream: String,
    /// Full endpoint URL, e.g. `wss://.../ws/ltcbtc@ticker`
    pub url: String,
}

/// Build the endpoint for a channel subscription
///
/// Validates the channel parameters; no network action is taken here.
pub fn build_endpoint(
    base: &str,
    pair: &CurrencyPair,
    channel: &Channel,
) -> Result<StreamEndpoint> {
    if let Channel::Depth(size) = channel {
        if !DEPTH_SIZES.contains(size) {
            return Err(StreamError::Config(format!(
                "depth size must be one of 5 / 10 / 20, got {}",
                size
            )));
        }
    }

    let stream = format!("{}@{}", pair.stream_symbol(), channel.suffix());
    let url = format!("{}/{}", base, stream);

    Ok(StreamEndpoint { stream, url })
}

/// Build a combined-stream URL for several stream names
pub fn combined_endpoint(combined_base: &str, streams: &[String]) -> String {
    format!("{}{}", combined_base, streams.join("/"))
}
