//! Domain error types.

/// Top-level error type for candlesim.
#[derive(Debug, thiserror::Error)]
pub enum CandlesimError {
    #[error("cannot parse {field} value '{value}' as a decimal")]
    Conversion { field: String, value: String },

    #[error("invalid order: {reason}")]
    OrderValidation { reason: String },

    #[error("invalid snapshot: {reason}")]
    Snapshot { reason: String },

    #[error("candle data out of order: timestamp {prev} followed by {next}")]
    OutOfOrderCandles { prev: i64, next: i64 },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CandlesimError {
    pub fn conversion(field: &str, value: &str) -> Self {
        CandlesimError::Conversion {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

impl From<&CandlesimError> for std::process::ExitCode {
    fn from(err: &CandlesimError) -> Self {
        let code: u8 = match err {
            CandlesimError::Io(_) => 1,
            CandlesimError::ConfigParse { .. } | CandlesimError::ConfigInvalid { .. } => 2,
            CandlesimError::Data { .. } => 3,
            CandlesimError::Conversion { .. } | CandlesimError::OrderValidation { .. } => 4,
            CandlesimError::Snapshot { .. } | CandlesimError::OutOfOrderCandles { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
