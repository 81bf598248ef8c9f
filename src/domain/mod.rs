//! Core domain types and logic.

pub mod decimal;
pub mod candle;
pub mod order;
pub mod ledger;
pub mod balance;
pub mod simulator;
pub mod snapshot;
pub mod error;
