//! Append-only order ledger.

use rust_decimal::Decimal;

use super::error::CandlesimError;
use super::order::{Order, OrderStatus, OrderType};

/// Id-sequenced collection of orders.
///
/// Orders are appended by [`place`](OrderLedger::place) and only ever mutated
/// by the execution engine (status + execution price). Ids are 1-based and
/// never reused or reordered, even when later orders carry earlier
/// timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderLedger {
    pub orders: Vec<Order>,
}

impl OrderLedger {
    pub fn new() -> Self {
        OrderLedger::default()
    }

    /// Construct a Pending order with the next sequential id and append it.
    ///
    /// Rejects a zero amount and a Limit order without a price; on rejection
    /// the ledger is unchanged.
    pub fn place(
        &mut self,
        order_type: OrderType,
        amount: Decimal,
        price: Option<Decimal>,
        timestamp: i64,
    ) -> Result<u64, CandlesimError> {
        if amount.is_zero() {
            return Err(CandlesimError::OrderValidation {
                reason: "amount must not be zero".into(),
            });
        }
        if order_type == OrderType::Limit && price.is_none() {
            return Err(CandlesimError::OrderValidation {
                reason: "limit order requires a price".into(),
            });
        }

        let id = self.orders.len() as u64 + 1;
        self.orders.push(Order {
            id,
            order_type,
            amount,
            price,
            timestamp,
            status: OrderStatus::Pending,
            execution_price: None,
        });
        Ok(id)
    }

    pub fn pending_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.is_pending())
    }

    pub fn executed_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.is_executed())
    }

    /// Signed sum of executed order amounts. Recomputed on every call;
    /// ledgers stay small and the full scan keeps the value trivially
    /// consistent with the order list.
    pub fn net_position(&self) -> Decimal {
        self.executed_orders().map(|o| o.amount).sum()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
