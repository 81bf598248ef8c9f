//! Balance accounting and profit-and-loss.

use rust_decimal::Decimal;

use super::order::Order;

/// Running foreign-currency balance, updated on every fill.
///
/// The balance is clamped to `[-1, 1]`: buys floor it at −1, sells cap it at
/// +1. The clamp bounds the accounting value that feeds unrealized-PnL; it is
/// not a position-size cap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceTracker {
    balance: Decimal,
}

impl BalanceTracker {
    pub fn new() -> Self {
        BalanceTracker::default()
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Apply one fill: `transaction_value = price × amount`. Buys subtract
    /// the transaction value (floored at −1), sells add its absolute value
    /// (capped at +1).
    pub fn on_fill(&mut self, amount: Decimal, price: Decimal) {
        let transaction_value = price * amount;
        if amount > Decimal::ZERO {
            self.balance = (self.balance - transaction_value).max(-Decimal::ONE);
        } else {
            self.balance = (self.balance + transaction_value.abs()).min(Decimal::ONE);
        }
    }

    /// Reset to zero and re-apply every executed order's fill in ledger
    /// order.
    ///
    /// Snapshots do not carry the balance, so a simulator restored via
    /// `import_state` keeps its previous balance; this is the explicit
    /// recompute path for callers that need balance continuity.
    pub fn replay(&mut self, orders: &[Order]) {
        self.balance = Decimal::ZERO;
        for order in orders.iter().filter(|o| o.is_executed()) {
            if let Some(price) = order.execution_price {
                self.on_fill(order.amount, price);
            }
        }
    }
}

/// Cash-flow realized PnL over executed orders: buys are outflows, sells are
/// inflows, each valued at `execution_price × |amount|`.
pub fn realized_pnl(orders: &[Order]) -> Decimal {
    let mut realized = Decimal::ZERO;
    for order in orders.iter().filter(|o| o.is_executed()) {
        let Some(price) = order.execution_price else {
            continue;
        };
        let execution_value = price * order.amount.abs();
        if order.is_buy() {
            realized -= execution_value;
        } else {
            realized += execution_value;
        }
    }
    realized
}

/// Mark-to-market PnL on the open net position versus the current price.
///
/// Zero when flat. Otherwise the open value is `current_price × |net|`; a
/// long position earns `open_value − |balance|`, a short the reverse.
pub fn unrealized_pnl(net_position: Decimal, current_price: Decimal, balance: Decimal) -> Decimal {
    if net_position.is_zero() {
        return Decimal::ZERO;
    }
    let open_value = current_price * net_position.abs();
    if net_position > Decimal::ZERO {
        open_value - balance.abs()
    } else {
        balance.abs() - open_value
    }
}
