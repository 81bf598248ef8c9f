//! Orders and their lifecycle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "market"),
            OrderType::Limit => write!(f, "limit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Executed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Executed => write!(f, "executed"),
        }
    }
}

/// A single order in the ledger.
///
/// `amount` is signed: the sign is the direction, the magnitude the size.
/// `execution_price` is `Some` exactly when `status` is `Executed`; the
/// Pending→Executed transition happens once, inside the execution engine,
/// and is never reversed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: u64,
    pub order_type: OrderType,
    pub amount: Decimal,
    pub price: Option<Decimal>,
    pub timestamp: i64,
    pub status: OrderStatus,
    pub execution_price: Option<Decimal>,
}

impl Order {
    pub fn is_buy(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_sell(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    pub fn is_executed(&self) -> bool {
        self.status == OrderStatus::Executed
    }

    /// Mark the order executed at `price`. Engine-internal: this is the only
    /// way an order leaves the Pending state.
    pub(crate) fn fill(&mut self, price: Decimal) {
        self.status = OrderStatus::Executed;
        self.execution_price = Some(price);
    }
}

/// An order as requested but not yet placed, e.g. one row of an order
/// script file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub order_type: OrderType,
    pub amount: Decimal,
    pub price: Option<Decimal>,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_order() -> Order {
        Order {
            id: 1,
            order_type: OrderType::Market,
            amount: dec!(10),
            price: Some(dec!(100)),
            timestamp: 1234567890,
            status: OrderStatus::Pending,
            execution_price: None,
        }
    }

    #[test]
    fn new_order_is_pending() {
        let order = sample_order();
        assert!(order.is_pending());
        assert!(!order.is_executed());
        assert_eq!(order.execution_price, None);
    }

    #[test]
    fn direction_predicates() {
        let buy = sample_order();
        assert!(buy.is_buy());
        assert!(!buy.is_sell());

        let sell = Order {
            amount: dec!(-3),
            ..sample_order()
        };
        assert!(sell.is_sell());
        assert!(!sell.is_buy());
    }

    #[test]
    fn fill_sets_status_and_price() {
        let mut order = sample_order();
        order.fill(dec!(102));
        assert!(order.is_executed());
        assert_eq!(order.execution_price, Some(dec!(102)));
    }

    #[test]
    fn display_tags() {
        assert_eq!(OrderType::Market.to_string(), "market");
        assert_eq!(OrderType::Limit.to_string(), "limit");
        assert_eq!(OrderStatus::Pending.to_string(), "pending");
        assert_eq!(OrderStatus::Executed.to_string(), "executed");
    }

    #[test]
    fn serde_tags_are_lowercase() {
        assert_eq!(serde_json::to_string(&OrderType::Limit).unwrap(), "\"limit\"");
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"executed\"").unwrap(),
            OrderStatus::Executed
        );
    }
}
