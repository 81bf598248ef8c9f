//! OHLC candle representation and the timestamp-ordered candle store.

use rust_decimal::Decimal;

use super::decimal::parse_decimal;
use super::error::CandlesimError;

/// One OHLC price bar. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candle {
    pub timestamp: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl Candle {
    /// Build a candle from decimal strings, as read from a CSV row or a
    /// snapshot record. Fails with a conversion error on unparseable input.
    pub fn from_strs(
        timestamp: i64,
        open: &str,
        high: &str,
        low: &str,
        close: &str,
    ) -> Result<Self, CandlesimError> {
        Ok(Candle {
            timestamp,
            open: parse_decimal("open", open)?,
            high: parse_decimal("high", high)?,
            low: parse_decimal("low", low)?,
            close: parse_decimal("close", close)?,
        })
    }
}

/// Immutable, timestamp-ordered sequence of candles.
///
/// Construction rejects candles whose timestamps are not strictly increasing,
/// so every range the execution engine walks is known-ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleStore {
    candles: Vec<Candle>,
}

impl CandleStore {
    pub fn new(candles: Vec<Candle>) -> Result<Self, CandlesimError> {
        for pair in candles.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(CandlesimError::OutOfOrderCandles {
                    prev: pair[0].timestamp,
                    next: pair[1].timestamp,
                });
            }
        }
        Ok(CandleStore { candles })
    }

    pub fn empty() -> Self {
        CandleStore {
            candles: Vec::new(),
        }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<i64> {
        self.candles.first().map(|c| c.timestamp)
    }

    /// Close price of the candle at exactly `timestamp`, or zero when none
    /// matches. The zero sentinel is deliberate: "current price before any
    /// data" is a legitimate query, not an error.
    pub fn price_at(&self, timestamp: i64) -> Decimal {
        self.candles
            .binary_search_by_key(&timestamp, |c| c.timestamp)
            .map(|idx| self.candles[idx].close)
            .unwrap_or(Decimal::ZERO)
    }

    /// Earliest candle strictly after `timestamp`, if any.
    pub fn next_after(&self, timestamp: i64) -> Option<&Candle> {
        let idx = self.candles.partition_point(|c| c.timestamp <= timestamp);
        self.candles.get(idx)
    }

    /// All candles with `last_timestamp < t <= target_timestamp`, ascending.
    /// Empty when the window contains no candles or is inverted.
    pub fn range_after_through(&self, last_timestamp: i64, target_timestamp: i64) -> &[Candle] {
        let start = self
            .candles
            .partition_point(|c| c.timestamp <= last_timestamp);
        let end = self
            .candles
            .partition_point(|c| c.timestamp <= target_timestamp);
        if end <= start {
            &[]
        } else {
            &self.candles[start..end]
        }
    }
}
