//! Per-channel event handlers
//!
//! One optional handler slot per event kind, registered before subscribing
//! and validated at subscribe time. Handlers run synchronously on the
//! receive loop: a blocking handler stalls all subsequent delivery for that
//! client. Reconfiguring handlers while the stream is live is a documented
//! precondition violation, not runtime enforced.

use crate::core::{Depth, Kline, KlinePeriod, Ticker, Trade};
use crate::ws::subscription::ChannelKind;

pub type TickerCallback = Box<dyn Fn(Ticker) + Send + Sync + 'static>;
pub type DepthCallback = Box<dyn Fn(Depth) + Send + Sync + 'static>;
pub type TradeCallback = Box<dyn Fn(Trade) + Send + Sync + 'static>;
pub type KlineCallback = Box<dyn Fn(Kline, KlinePeriod) + Send + Sync + 'static>;

/// Handler slots, one per event kind
#[derive(Default)]
pub struct Callbacks {
    pub(crate) ticker: Option<TickerCallback>,
    pub(crate) depth: Option<DepthCallback>,
    pub(crate) trade: Option<TradeCallback>,
    pub(crate) kline: Option<KlineCallback>,
}

impl Callbacks {
    /// Whether a handler is registered for the given channel kind
    pub fn has(&self, kind: ChannelKind) -> bool {
        match kind {
            ChannelKind::Ticker => self.ticker.is_some(),
            ChannelKind::Trade => self.trade.is_some(),
            ChannelKind::Kline => self.kline.is_some(),
            ChannelKind::Depth => self.depth.is_some(),
        }
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("ticker", &self.ticker.is_some())
            .field("depth", &self.depth.is_some())
            .field("trade", &self.trade.is_some())
            .field("kline", &self.kline.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_none() {
        let callbacks = Callbacks::default();
        assert!(!callbacks.has(ChannelKind::Ticker));
        assert!(!callbacks.has(ChannelKind::Trade));
        assert!(!callbacks.has(ChannelKind::Kline));
        assert!(!callbacks.has(ChannelKind::Depth));
    }

    #[test]
    fn test_has_registered() {
        let mut callbacks = Callbacks::default();
        callbacks.ticker = Some(Box::new(|_| {}));
        assert!(callbacks.has(ChannelKind::Ticker));
        assert!(!callbacks.has(ChannelKind::Trade));
    }
}
