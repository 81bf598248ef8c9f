//! The simulation engine: time stepping, order execution, position policy.

use rust_decimal::Decimal;

use super::balance::{realized_pnl, unrealized_pnl, BalanceTracker};
use super::candle::{Candle, CandleStore};
use super::decimal::format_fixed2;
use super::error::CandlesimError;
use super::ledger::OrderLedger;
use super::order::{Order, OrderType};
use super::snapshot::Snapshot;

/// Deterministic backtesting engine over a fixed candle history.
///
/// The engine is single-threaded and synchronous: every operation runs to
/// completion, and there is no internal locking. Callers sharing a simulator
/// across threads must serialize access themselves (see
/// [`AutoStepper`](crate::adapters::auto_step::AutoStepper)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulator {
    pub store: CandleStore,
    pub ledger: OrderLedger,
    pub balance: BalanceTracker,
    cursor: i64,
}

impl Simulator {
    /// Build a simulator over `candles`. The cursor starts at the first
    /// candle's timestamp, or 0 when there is no data.
    pub fn new(candles: Vec<Candle>) -> Result<Self, CandlesimError> {
        let store = CandleStore::new(candles)?;
        let cursor = store.first_timestamp().unwrap_or(0);
        Ok(Simulator {
            store,
            ledger: OrderLedger::new(),
            balance: BalanceTracker::new(),
            cursor,
        })
    }

    /// Timestamp of the most recently processed candle — the simulation's
    /// notion of "now". Monotonically non-decreasing.
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Close price of the candle at the cursor, or zero before any candle
    /// has been processed.
    pub fn current_price(&self) -> Decimal {
        self.store.price_at(self.cursor)
    }

    pub fn orders(&self) -> &[Order] {
        &self.ledger.orders
    }

    /// Place an order into the ledger. See [`OrderLedger::place`] for the
    /// validation rules.
    pub fn place_order(
        &mut self,
        order_type: OrderType,
        amount: Decimal,
        price: Option<Decimal>,
        timestamp: i64,
    ) -> Result<u64, CandlesimError> {
        self.ledger.place(order_type, amount, price, timestamp)
    }

    /// Advance the cursor to `target_timestamp`, filling pending orders
    /// against each candle in turn.
    ///
    /// Advancing to or before the cursor, or past the last candle, processes
    /// nothing and is not an error. Per candle, every still-pending order is
    /// evaluated against that candle only: market orders fill at the close;
    /// a buy limit fills at exactly its limit price once `low <= price`, a
    /// sell limit once `high >= price`. Each fill immediately updates the
    /// balance. The cursor moves after the candle's orders are evaluated.
    pub fn advance_to(&mut self, target_timestamp: i64) {
        self.advance_to_with(target_timestamp, |_, _| {});
    }

    /// [`advance_to`](Simulator::advance_to) with an observer callback,
    /// invoked after each candle is processed with that candle and the full
    /// order list. The callback cannot affect engine state.
    pub fn advance_to_with<F>(&mut self, target_timestamp: i64, mut on_candle: F)
    where
        F: FnMut(&Candle, &[Order]),
    {
        let candles: Vec<Candle> = self
            .store
            .range_after_through(self.cursor, target_timestamp)
            .to_vec();

        for candle in candles {
            for order in self.ledger.orders.iter_mut() {
                if !order.is_pending() {
                    continue;
                }
                let fill_price = match order.order_type {
                    OrderType::Market => Some(candle.close),
                    // A limit order always carries a price (enforced at
                    // placement and import); a missing one just never fills.
                    OrderType::Limit => match order.price {
                        Some(limit) if order.is_buy() && candle.low <= limit => Some(limit),
                        Some(limit) if order.is_sell() && candle.high >= limit => Some(limit),
                        _ => None,
                    },
                };
                if let Some(price) = fill_price {
                    order.fill(price);
                    self.balance.on_fill(order.amount, price);
                }
            }

            self.cursor = candle.timestamp;
            on_candle(&candle, &self.ledger.orders);
        }
    }

    /// Advance to the next candle after the cursor. Returns `false` when no
    /// candle remains — the expected terminal condition for an external
    /// driver, not an error.
    pub fn advance_to_next_candle(&mut self) -> bool {
        self.advance_to_next_candle_with(|_, _| {})
    }

    pub fn advance_to_next_candle_with<F>(&mut self, on_candle: F) -> bool
    where
        F: FnMut(&Candle, &[Order]),
    {
        match self.store.next_after(self.cursor) {
            Some(candle) => {
                let target = candle.timestamp;
                self.advance_to_with(target, on_candle);
                true
            }
            None => false,
        }
    }

    /// Go long one unit: close any short first, then open a unit buy unless
    /// the position already reads +1.
    ///
    /// Both checks use the net position snapshotted before the closing order
    /// is placed, so going long from a short of −1 places two +1 market
    /// orders. That doubled order flow is part of the engine's contract.
    pub fn go_long(&mut self) -> Result<(), CandlesimError> {
        let net = self.ledger.net_position();
        if net < Decimal::ZERO {
            self.close_position()?;
        }
        if net != Decimal::ONE {
            self.place_order(OrderType::Market, Decimal::ONE, None, self.cursor)?;
        }
        Ok(())
    }

    /// Go short one unit; mirror of [`go_long`](Simulator::go_long),
    /// including the stale-snapshot check.
    pub fn go_short(&mut self) -> Result<(), CandlesimError> {
        let net = self.ledger.net_position();
        if net > Decimal::ZERO {
            self.close_position()?;
        }
        if net != -Decimal::ONE {
            self.place_order(OrderType::Market, -Decimal::ONE, None, self.cursor)?;
        }
        Ok(())
    }

    /// Place a market order neutralizing the current net position, if any.
    pub fn close_position(&mut self) -> Result<(), CandlesimError> {
        let net = self.ledger.net_position();
        if !net.is_zero() {
            self.place_order(OrderType::Market, -net, None, self.cursor)?;
        }
        Ok(())
    }

    /// Total PnL (realized + unrealized) formatted to exactly two decimal
    /// places.
    pub fn total_pnl(&self) -> String {
        let realized = realized_pnl(&self.ledger.orders);
        let unrealized = unrealized_pnl(
            self.ledger.net_position(),
            self.current_price(),
            self.balance.balance(),
        );
        format_fixed2(realized + unrealized)
    }

    /// Serialize candle history, ledger and cursor to snapshot JSON. The
    /// balance is not part of the snapshot.
    pub fn export_state(&self) -> Result<String, CandlesimError> {
        Snapshot::capture(&self.store, &self.ledger, self.cursor).to_json()
    }

    /// Replace candle store, ledger and cursor from snapshot JSON.
    ///
    /// The running balance is deliberately not restored (it is absent from
    /// the snapshot); callers that need balance continuity should follow up
    /// with [`recompute_balance`](Simulator::recompute_balance). On any
    /// validation failure the simulator is left unchanged.
    pub fn import_state(&mut self, json: &str) -> Result<(), CandlesimError> {
        let snapshot = Snapshot::from_json(json)?;
        let (store, ledger) = snapshot.restore()?;
        self.store = store;
        self.ledger = ledger;
        self.cursor = snapshot.cursor;
        Ok(())
    }

    /// Rebuild the balance by replaying every executed order's fill, in
    /// ledger order. The explicit recovery path after
    /// [`import_state`](Simulator::import_state).
    pub fn recompute_balance(&mut self) {
        self.balance.replay(&self.ledger.orders);
    }
}
