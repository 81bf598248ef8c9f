//! Snapshot wire format: export/import of engine state as JSON text.
//!
//! Decimal fields travel as exact decimal strings — the string is the wire
//! representation, so a round trip must reproduce it byte-for-byte, not just
//! numerically. The running balance is intentionally absent from the schema;
//! see [`Simulator::recompute_balance`](super::simulator::Simulator::recompute_balance).

use serde::{Deserialize, Serialize};

use super::candle::{Candle, CandleStore};
use super::decimal::parse_decimal;
use super::error::CandlesimError;
use super::ledger::OrderLedger;
use super::order::{Order, OrderStatus, OrderType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandleRecord {
    pub timestamp: i64,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: u64,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub amount: String,
    pub price: Option<String>,
    pub timestamp: i64,
    pub status: OrderStatus,
    #[serde(rename = "executionPrice")]
    pub execution_price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub candles: Vec<CandleRecord>,
    pub orders: Vec<OrderRecord>,
    pub cursor: i64,
}

impl From<&Candle> for CandleRecord {
    fn from(candle: &Candle) -> Self {
        CandleRecord {
            timestamp: candle.timestamp,
            open: candle.open.to_string(),
            high: candle.high.to_string(),
            low: candle.low.to_string(),
            close: candle.close.to_string(),
        }
    }
}

impl From<&Order> for OrderRecord {
    fn from(order: &Order) -> Self {
        OrderRecord {
            id: order.id,
            order_type: order.order_type,
            amount: order.amount.to_string(),
            price: order.price.map(|p| p.to_string()),
            timestamp: order.timestamp,
            status: order.status,
            execution_price: order.execution_price.map(|p| p.to_string()),
        }
    }
}

impl CandleRecord {
    fn restore(&self, index: usize) -> Result<Candle, CandlesimError> {
        Candle::from_strs(self.timestamp, &self.open, &self.high, &self.low, &self.close).map_err(
            |err| CandlesimError::Snapshot {
                reason: format!("candles[{index}]: {err}"),
            },
        )
    }
}

impl OrderRecord {
    fn restore(&self, index: usize) -> Result<Order, CandlesimError> {
        let invalid = |reason: String| CandlesimError::Snapshot {
            reason: format!("orders[{index}] (id {id}): {reason}", id = self.id),
        };

        let amount = parse_decimal("amount", &self.amount)
            .map_err(|err| invalid(err.to_string()))?;
        if amount.is_zero() {
            return Err(invalid("amount must not be zero".into()));
        }

        let price = match &self.price {
            Some(text) => {
                Some(parse_decimal("price", text).map_err(|err| invalid(err.to_string()))?)
            }
            None => None,
        };
        if self.order_type == OrderType::Limit && price.is_none() {
            return Err(invalid("limit order requires a price".into()));
        }

        let execution_price = match &self.execution_price {
            Some(text) => Some(
                parse_decimal("executionPrice", text).map_err(|err| invalid(err.to_string()))?,
            ),
            None => None,
        };
        match self.status {
            OrderStatus::Executed if execution_price.is_none() => {
                return Err(invalid("executed order requires an executionPrice".into()));
            }
            OrderStatus::Pending if execution_price.is_some() => {
                return Err(invalid("pending order must not have an executionPrice".into()));
            }
            _ => {}
        }

        Ok(Order {
            id: self.id,
            order_type: self.order_type,
            amount,
            price,
            timestamp: self.timestamp,
            status: self.status,
            execution_price,
        })
    }
}

impl Snapshot {
    /// Snapshot the full engine state (minus the balance).
    pub fn capture(store: &CandleStore, ledger: &OrderLedger, cursor: i64) -> Self {
        Snapshot {
            candles: store.candles().iter().map(CandleRecord::from).collect(),
            orders: ledger.orders.iter().map(OrderRecord::from).collect(),
            cursor,
        }
    }

    pub fn to_json(&self) -> Result<String, CandlesimError> {
        serde_json::to_string(self).map_err(|err| CandlesimError::Snapshot {
            reason: format!("serialization failed: {err}"),
        })
    }

    /// Parse snapshot JSON, reporting malformed input as a structured
    /// snapshot error rather than a raw serde error.
    pub fn from_json(json: &str) -> Result<Self, CandlesimError> {
        serde_json::from_str(json).map_err(|err| CandlesimError::Snapshot {
            reason: err.to_string(),
        })
    }

    /// Validate the records and rebuild the candle store and ledger.
    pub fn restore(&self) -> Result<(CandleStore, OrderLedger), CandlesimError> {
        let candles = self
            .candles
            .iter()
            .enumerate()
            .map(|(i, record)| record.restore(i))
            .collect::<Result<Vec<_>, _>>()?;
        let store = CandleStore::new(candles)?;

        let orders = self
            .orders
            .iter()
            .enumerate()
            .map(|(i, record)| record.restore(i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((store, OrderLedger { orders }))
    }
}
