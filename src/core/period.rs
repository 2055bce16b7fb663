//! Kline period enumeration
//!
//! The 15 candle intervals Binance streams, with a bijective mapping to the
//! exchange's textual codes (`1m` … `1M`).

/// Candle interval for kline streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KlinePeriod {
    Min1,
    Min3,
    Min5,
    Min15,
    Min30,
    Hour1,
    Hour2,
    Hour4,
    Hour6,
    Hour8,
    Hour12,
    Day1,
    Day3,
    Week1,
    Month1,
}

impl KlinePeriod {
    /// All periods, in ascending order
    pub const ALL: [KlinePeriod; 15] = [
        KlinePeriod::Min1,
        KlinePeriod::Min3,
        KlinePeriod::Min5,
        KlinePeriod::Min15,
        KlinePeriod::Min30,
        KlinePeriod::Hour1,
        KlinePeriod::Hour2,
        KlinePeriod::Hour4,
        KlinePeriod::Hour6,
        KlinePeriod::Hour8,
        KlinePeriod::Hour12,
        KlinePeriod::Day1,
        KlinePeriod::Day3,
        KlinePeriod::Week1,
        KlinePeriod::Month1,
    ];

    /// Exchange code for this period
    pub const fn code(self) -> &'static str {
        match self {
            KlinePeriod::Min1 => "1m",
            KlinePeriod::Min3 => "3m",
            KlinePeriod::Min5 => "5m",
            KlinePeriod::Min15 => "15m",
            KlinePeriod::Min30 => "30m",
            KlinePeriod::Hour1 => "1h",
            KlinePeriod::Hour2 => "2h",
            KlinePeriod::Hour4 => "4h",
            KlinePeriod::Hour6 => "6h",
            KlinePeriod::Hour8 => "8h",
            KlinePeriod::Hour12 => "12h",
            KlinePeriod::Day1 => "1d",
            KlinePeriod::Day3 => "3d",
            KlinePeriod::Week1 => "1w",
            KlinePeriod::Month1 => "1M",
        }
    }

    /// Reverse-map an exchange code; unknown codes yield `None`
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1m" => Some(KlinePeriod::Min1),
            "3m" => Some(KlinePeriod::Min3),
            "5m" => Some(KlinePeriod::Min5),
            "15m" => Some(KlinePeriod::Min15),
            "30m" => Some(KlinePeriod::Min30),
            "1h" => Some(KlinePeriod::Hour1),
            "2h" => Some(KlinePeriod::Hour2),
            "4h" => Some(KlinePeriod::Hour4),
            "6h" => Some(KlinePeriod::Hour6),
            "8h" => Some(KlinePeriod::Hour8),
            "12h" => Some(KlinePeriod::Hour12),
            "1d" => Some(KlinePeriod::Day1),
            "3d" => Some(KlinePeriod::Day3),
            "1w" => Some(KlinePeriod::Week1),
            "1M" => Some(KlinePeriod::Month1),
            _ => None,
        }
    }

    /// Period length in seconds (1M counted as 30 days)
    pub const fn seconds(self) -> u64 {
        match self {
            KlinePeriod::Min1 => 60,
            KlinePeriod::Min3 => 180,
            KlinePeriod::Min5 => 300,
            KlinePeriod::Min15 => 900,
            KlinePeriod::Min30 => 1_800,
            KlinePeriod::Hour1 => 3_600,
            KlinePeriod::Hour2 => 7_200,
            KlinePeriod::Hour4 => 14_400,
            KlinePeriod::Hour6 => 21_600,
            KlinePeriod::Hour8 => 28_800,
            KlinePeriod::Hour12 => 43_200,
            KlinePeriod::Day1 => 86_400,
            KlinePeriod::Day3 => 259_200,
            KlinePeriod::Week1 => 604_800,
            KlinePeriod::Month1 => 2_592_000,
        }
    }
}
