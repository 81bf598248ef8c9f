#![allow(dead_code)]

use candlesim::domain::candle::Candle;
use candlesim::domain::simulator::Simulator;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Candle from decimal strings, scale preserved.
pub fn make_candle(timestamp: i64, open: &str, high: &str, low: &str, close: &str) -> Candle {
    Candle::from_strs(timestamp, open, high, low, close).unwrap()
}

/// The two-candle history used throughout the reference scenarios:
/// (t=10, close 102, low 95, high 105) and (t=20, close 104, low 98, high 106).
pub fn scenario_candles() -> Vec<Candle> {
    vec![
        make_candle(10, "100", "105", "95", "102"),
        make_candle(20, "102", "106", "98", "104"),
    ]
}

pub fn scenario_simulator() -> Simulator {
    Simulator::new(scenario_candles()).unwrap()
}

/// Flat synthetic history: `count` candles starting at `start`, spaced
/// `step` seconds apart, close walking up by 1 per candle.
pub fn generate_candles(start: i64, step: i64, count: usize, start_close: i64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let close = start_close + i as i64;
            Candle {
                timestamp: start + step * i as i64,
                open: Decimal::from(close - 1),
                high: Decimal::from(close + 2),
                low: Decimal::from(close - 2),
                close: Decimal::from(close),
            }
        })
        .collect()
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}
