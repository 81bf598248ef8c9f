//! Data access port trait.

use crate::domain::candle::Candle;
use crate::domain::error::CandlesimError;
use crate::domain::order::OrderRequest;

/// Source of candle history and (optionally) a scripted order sequence.
pub trait DataPort {
    fn load_candles(&self) -> Result<Vec<Candle>, CandlesimError>;

    /// Orders to place before the replay starts. Sources without an order
    /// script return an empty list.
    fn load_orders(&self) -> Result<Vec<OrderRequest>, CandlesimError>;
}
