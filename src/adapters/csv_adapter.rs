//! CSV file data adapter.
//!
//! Candle files carry `timestamp,open,high,low,close` rows; order script
//! files carry `type,amount,price,timestamp` rows (price empty for market
//! orders). Price and amount columns are parsed as exact decimals, never
//! floats.

use std::fs;
use std::path::PathBuf;

use crate::domain::candle::Candle;
use crate::domain::decimal::parse_decimal;
use crate::domain::error::CandlesimError;
use crate::domain::order::{OrderRequest, OrderType};
use crate::ports::data_port::DataPort;

pub struct CsvAdapter {
    candles_path: PathBuf,
    orders_path: Option<PathBuf>,
}

impl CsvAdapter {
    pub fn new(candles_path: PathBuf, orders_path: Option<PathBuf>) -> Self {
        Self {
            candles_path,
            orders_path,
        }
    }
}

fn read_file(path: &PathBuf) -> Result<String, CandlesimError> {
    fs::read_to_string(path).map_err(|e| CandlesimError::Data {
        reason: format!("failed to read {}: {}", path.display(), e),
    })
}

fn column<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
) -> Result<&'a str, CandlesimError> {
    record.get(index).ok_or_else(|| CandlesimError::Data {
        reason: format!("row {row}: missing {name} column"),
    })
}

fn parse_timestamp(text: &str, row: usize) -> Result<i64, CandlesimError> {
    text.trim().parse().map_err(|_| CandlesimError::Data {
        reason: format!("row {row}: invalid timestamp '{text}'"),
    })
}

impl DataPort for CsvAdapter {
    fn load_candles(&self) -> Result<Vec<Candle>, CandlesimError> {
        let content = read_file(&self.candles_path)?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| CandlesimError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let timestamp = parse_timestamp(column(&record, 0, "timestamp", row)?, row)?;
            candles.push(Candle::from_strs(
                timestamp,
                column(&record, 1, "open", row)?,
                column(&record, 2, "high", row)?,
                column(&record, 3, "low", row)?,
                column(&record, 4, "close", row)?,
            )?);
        }

        Ok(candles)
    }

    fn load_orders(&self) -> Result<Vec<OrderRequest>, CandlesimError> {
        let Some(path) = &self.orders_path else {
            return Ok(Vec::new());
        };

        let content = read_file(path)?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut requests = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| CandlesimError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let type_field = column(&record, 0, "type", row)?;
            let order_type = match type_field.trim() {
                "market" => OrderType::Market,
                "limit" => OrderType::Limit,
                other => {
                    return Err(CandlesimError::Data {
                        reason: format!("row {row}: unknown order type '{other}'"),
                    });
                }
            };

            let amount = parse_decimal("amount", column(&record, 1, "amount", row)?)?;

            let price_field = column(&record, 2, "price", row)?;
            let price = if price_field.trim().is_empty() {
                None
            } else {
                Some(parse_decimal("price", price_field)?)
            };

            let timestamp = parse_timestamp(column(&record, 3, "timestamp", row)?, row)?;

            requests.push(OrderRequest {
                order_type,
                amount,
                price,
                timestamp,
            });
        }

        Ok(requests)
    }
}
