//! End-to-end engine tests.
//!
//! Covers:
//! - Market and limit fill rules across multi-candle advances
//! - Stepping semantics: idempotence, no-ops at the data edges
//! - Position policy helpers, including the documented stale-snapshot
//!   doubling of `go_long`/`go_short`
//! - Balance clamp and total PnL scenarios
//! - Snapshot export/import round-trips, string-exact

mod common;

use candlesim::domain::error::CandlesimError;
use candlesim::domain::order::{OrderStatus, OrderType};
use candlesim::domain::simulator::Simulator;
use common::*;
use rust_decimal::Decimal;

mod market_orders {
    use super::*;

    #[test]
    fn fills_on_next_processed_candle_at_close() {
        let mut sim = scenario_simulator();
        sim.place_order(OrderType::Market, dec("5"), None, 10).unwrap();
        assert!(sim.orders()[0].is_pending());

        sim.advance_to(20);
        let order = &sim.orders()[0];
        assert_eq!(order.status, OrderStatus::Executed);
        assert_eq!(order.execution_price, Some(dec("104")));
    }

    #[test]
    fn order_placed_mid_history_ignores_earlier_candles() {
        let mut sim = Simulator::new(generate_candles(10, 10, 5, 100)).unwrap();
        sim.advance_to(30);
        sim.place_order(OrderType::Market, dec("1"), None, 30).unwrap();
        sim.advance_to(40);
        // fills on the candle at 40 (close 103), not any candle before placement
        assert_eq!(sim.orders()[0].execution_price, Some(dec("103")));
    }

    #[test]
    fn multiple_pending_orders_fill_on_same_candle() {
        let mut sim = scenario_simulator();
        sim.place_order(OrderType::Market, dec("1"), None, 10).unwrap();
        sim.place_order(OrderType::Market, dec("-2"), None, 10).unwrap();
        sim.advance_to(20);
        assert!(sim.orders().iter().all(|o| o.is_executed()));
    }
}

mod limit_orders {
    use super::*;

    fn staircase() -> Simulator {
        // lows: 98, 96, 94 — a buy limit at 95 must wait for the third candle
        Simulator::new(vec![
            make_candle(10, "100", "103", "99", "101"),
            make_candle(20, "101", "102", "98", "100"),
            make_candle(30, "100", "101", "96", "99"),
            make_candle(40, "99", "100", "94", "98"),
        ])
        .unwrap()
    }

    #[test]
    fn buy_limit_waits_for_low_to_reach_price() {
        let mut sim = staircase();
        sim.place_order(OrderType::Limit, dec("2"), Some(dec("95")), 10)
            .unwrap();

        sim.advance_to(30);
        assert!(sim.orders()[0].is_pending());

        sim.advance_to(40);
        let order = &sim.orders()[0];
        assert!(order.is_executed());
        assert_eq!(order.execution_price, Some(dec("95")));
    }

    #[test]
    fn buy_limit_fills_on_first_qualifying_candle_of_a_range() {
        let mut sim = staircase();
        sim.place_order(OrderType::Limit, dec("1"), Some(dec("96")), 10)
            .unwrap();
        let mut fill_candle = None;
        sim.advance_to_with(40, |candle, orders| {
            if orders[0].is_executed() && fill_candle.is_none() {
                fill_candle = Some(candle.timestamp);
            }
        });
        assert_eq!(fill_candle, Some(30));
    }

    #[test]
    fn sell_limit_fills_at_exact_price_not_close() {
        let mut sim = scenario_simulator();
        sim.place_order(OrderType::Limit, dec("-3"), Some(dec("100")), 10)
            .unwrap();
        sim.advance_to(20);

        // high 106 >= 100 → fills at the limit price, not close 104
        let order = &sim.orders()[0];
        assert!(order.is_executed());
        assert_eq!(order.execution_price, Some(dec("100")));
    }

    #[test]
    fn sell_limit_above_the_range_never_fills() {
        let mut sim = scenario_simulator();
        sim.place_order(OrderType::Limit, dec("-1"), Some(dec("500")), 10)
            .unwrap();
        sim.advance_to(20);
        assert!(sim.orders()[0].is_pending());
    }
}

mod stepping {
    use super::*;

    #[test]
    fn repeating_the_same_target_is_a_noop() {
        let mut sim = scenario_simulator();
        let mut first_pass = 0;
        sim.advance_to_with(20, |_, _| first_pass += 1);
        assert_eq!(first_pass, 1);

        let mut second_pass = 0;
        sim.advance_to_with(20, |_, _| second_pass += 1);
        assert_eq!(second_pass, 0);
        assert_eq!(sim.cursor(), 20);
    }

    #[test]
    fn advancing_past_all_data_processes_remaining_then_stops() {
        let mut sim = scenario_simulator();
        sim.advance_to(i64::MAX);
        assert_eq!(sim.cursor(), 20);
        assert!(!sim.advance_to_next_candle());
    }

    #[test]
    fn next_candle_stepping_walks_the_whole_history() {
        let mut sim = Simulator::new(generate_candles(0, 60, 10, 100)).unwrap();
        let mut steps = 0;
        while sim.advance_to_next_candle() {
            steps += 1;
        }
        assert_eq!(steps, 9);
        assert_eq!(sim.cursor(), 540);
    }

    #[test]
    fn callback_runs_per_candle_in_ascending_order() {
        let mut sim = Simulator::new(generate_candles(10, 10, 4, 100)).unwrap();
        let mut seen = Vec::new();
        sim.advance_to_with(40, |candle, _| seen.push(candle.timestamp));
        assert_eq!(seen, vec![20, 30, 40]);
    }
}

mod policy_helpers {
    use super::*;

    fn short_one_unit() -> Simulator {
        let mut sim = Simulator::new(generate_candles(10, 10, 4, 100)).unwrap();
        sim.place_order(OrderType::Market, dec("-1"), None, 10).unwrap();
        sim.advance_to(20);
        assert_eq!(sim.ledger.net_position(), dec("-1"));
        sim
    }

    #[test]
    fn go_long_from_short_places_doubled_buy_flow() {
        let mut sim = short_one_unit();
        sim.go_long().unwrap();

        // the position snapshot predates the closing order, so the helper
        // places both a closing +1 and an opening +1 — a +2 order flow
        let placed: Vec<Decimal> = sim
            .orders()
            .iter()
            .skip(1)
            .map(|o| o.amount)
            .collect();
        assert_eq!(placed, vec![dec("1"), dec("1")]);
        assert!(sim.orders().iter().skip(1).all(|o| o.is_pending()));

        sim.advance_to(30);
        assert_eq!(sim.ledger.net_position(), dec("1"));
    }

    #[test]
    fn go_short_from_long_places_doubled_sell_flow() {
        let mut sim = Simulator::new(generate_candles(10, 10, 4, 100)).unwrap();
        sim.place_order(OrderType::Market, dec("1"), None, 10).unwrap();
        sim.advance_to(20);

        sim.go_short().unwrap();
        let placed: Vec<Decimal> = sim
            .orders()
            .iter()
            .skip(1)
            .map(|o| o.amount)
            .collect();
        assert_eq!(placed, vec![dec("-1"), dec("-1")]);

        sim.advance_to(30);
        assert_eq!(sim.ledger.net_position(), dec("-1"));
    }

    #[test]
    fn go_long_when_flat_places_one_unit() {
        let mut sim = scenario_simulator();
        sim.go_long().unwrap();
        assert_eq!(sim.orders().len(), 1);
        assert_eq!(sim.orders()[0].amount, dec("1"));
    }

    #[test]
    fn close_position_flattens_fractional_net() {
        let mut sim = Simulator::new(generate_candles(10, 10, 3, 100)).unwrap();
        sim.place_order(OrderType::Market, dec("2.5"), None, 10).unwrap();
        sim.advance_to(20);
        sim.close_position().unwrap();
        sim.advance_to(30);
        assert_eq!(sim.ledger.net_position(), Decimal::ZERO);
    }
}

mod balance_and_pnl {
    use super::*;

    #[test]
    fn reference_round_trip_scenario() {
        // buy 5 at close 102, flatten at 104: PnL = 5 * (104 - 102) = 10
        let mut sim = Simulator::new(vec![
            make_candle(0, "99", "101", "97", "100"),
            make_candle(10, "100", "105", "95", "102"),
            make_candle(20, "102", "106", "98", "104"),
        ])
        .unwrap();

        sim.place_order(OrderType::Market, dec("5"), None, 0).unwrap();
        sim.advance_to(10);
        assert_eq!(sim.orders()[0].execution_price, Some(dec("102")));

        sim.close_position().unwrap();
        sim.advance_to(20);
        assert_eq!(sim.orders()[1].execution_price, Some(dec("104")));
        assert_eq!(sim.total_pnl(), "10.00");
    }

    #[test]
    fn balance_stays_clamped_through_a_fill_sequence() {
        let mut sim = Simulator::new(generate_candles(0, 10, 8, 100)).unwrap();
        for amount in ["3", "-7", "12", "-0.5"] {
            sim.place_order(OrderType::Market, dec(amount), None, sim.cursor())
                .unwrap();
            sim.advance_to_next_candle();
            let balance = sim.balance.balance();
            assert!(balance >= dec("-1") && balance <= dec("1"));
        }
    }

    #[test]
    fn unrealized_pnl_marks_open_long_to_market() {
        let mut sim = scenario_simulator();
        sim.place_order(OrderType::Market, dec("1"), None, 10).unwrap();
        sim.advance_to(20);
        // bought 1 @ 104: realized -104, balance clamped at -1,
        // unrealized = 104 - 1 = 103 → total -1
        assert_eq!(sim.total_pnl(), "-1.00");
    }

    #[test]
    fn pnl_is_exact_across_many_fractional_fills() {
        let mut sim = Simulator::new(generate_candles(0, 10, 60, 100)).unwrap();
        for i in 0..25 {
            let amount = if i % 2 == 0 { "0.1" } else { "-0.1" };
            sim.place_order(OrderType::Market, dec(amount), None, sim.cursor())
                .unwrap();
            sim.advance_to_next_candle();
        }
        sim.advance_to(i64::MAX);
        // 13 buys, 12 sells of 0.1 → net exactly 0.1, no binary drift
        assert_eq!(sim.ledger.net_position(), dec("0.1"));
    }
}

mod snapshots {
    use super::*;

    fn traded_simulator() -> Simulator {
        let mut sim = Simulator::new(vec![
            make_candle(10, "100.25", "105.50", "95.75", "102.00"),
            make_candle(20, "102.00", "106.10", "98.00", "104.30"),
        ])
        .unwrap();
        sim.place_order(OrderType::Market, dec("5"), None, 10).unwrap();
        sim.place_order(OrderType::Limit, dec("-3"), Some(dec("100.50")), 10)
            .unwrap();
        sim.advance_to(20);
        sim
    }

    #[test]
    fn export_import_export_is_byte_identical() {
        let original = traded_simulator();
        let first = original.export_state().unwrap();

        let mut restored = Simulator::new(Vec::new()).unwrap();
        restored.import_state(&first).unwrap();
        let second = restored.export_state().unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn import_reproduces_candles_orders_and_cursor() {
        let original = traded_simulator();
        let json = original.export_state().unwrap();

        let mut restored = Simulator::new(Vec::new()).unwrap();
        restored.import_state(&json).unwrap();

        assert_eq!(restored.store, original.store);
        assert_eq!(restored.ledger, original.ledger);
        assert_eq!(restored.cursor(), original.cursor());
    }

    #[test]
    fn import_does_not_restore_balance() {
        let original = traded_simulator();
        assert_ne!(original.balance.balance(), Decimal::ZERO);
        let json = original.export_state().unwrap();

        let mut restored = Simulator::new(Vec::new()).unwrap();
        restored.import_state(&json).unwrap();
        assert_eq!(restored.balance.balance(), Decimal::ZERO);

        restored.recompute_balance();
        assert_eq!(restored.balance.balance(), original.balance.balance());
    }

    #[test]
    fn restored_simulator_keeps_stepping() {
        let mut sim = Simulator::new(vec![
            make_candle(10, "100", "105", "95", "102"),
            make_candle(20, "102", "106", "98", "104"),
            make_candle(30, "104", "107", "99", "105"),
        ])
        .unwrap();
        sim.place_order(OrderType::Market, dec("1"), None, 10).unwrap();
        sim.advance_to(20);
        let json = sim.export_state().unwrap();

        let mut restored = Simulator::new(Vec::new()).unwrap();
        restored.import_state(&json).unwrap();
        restored.place_order(OrderType::Market, dec("-1"), None, 20).unwrap();
        assert_eq!(restored.orders()[1].id, 2);

        assert!(restored.advance_to_next_candle());
        assert_eq!(restored.cursor(), 30);
        assert!(restored.orders()[1].is_executed());
    }

    #[test]
    fn malformed_snapshot_leaves_simulator_unchanged() {
        let mut sim = traded_simulator();
        let before_cursor = sim.cursor();
        let before_orders = sim.orders().len();

        let err = sim.import_state("{\"candles\": []}").unwrap_err();
        assert!(matches!(err, CandlesimError::Snapshot { .. }));
        assert_eq!(sim.cursor(), before_cursor);
        assert_eq!(sim.orders().len(), before_orders);
    }
}
