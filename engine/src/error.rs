use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Insufficient data: need at least {required} candles, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Malformed candle at index {index} ({timestamp}): {reason}")]
    MalformedCandle {
        index: usize,
        timestamp: DateTime<Utc>,
        reason: String,
    },

    #[error("Candle timestamps must be strictly increasing (violated at index {index})")]
    UnorderedSeries { index: usize },

    #[error("Indicator length mismatch: series has {series} candles, fast MA has {fast}, slow MA has {slow}")]
    IndicatorLengthMismatch { series: usize, fast: usize, slow: usize },

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    #[error("Market data source error: {0}")]
    DataSourceError(String),

    #[error("Path not allowed: {0}")]
    PathNotAllowed(String),

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl From<EngineError> for tonic::Status {
    fn from(err: EngineError) -> Self {
        tracing::error!("Mapping EngineError to tonic::Status: {:?}", err);
        match err {
            EngineError::ConfigError(msg) => tonic::Status::failed_precondition(format!("Configuration error: {}", msg)),
            e @ EngineError::InsufficientData { .. } => tonic::Status::failed_precondition(e.to_string()),
            e @ EngineError::MalformedCandle { .. } => tonic::Status::invalid_argument(e.to_string()),
            e @ EngineError::UnorderedSeries { .. } => tonic::Status::invalid_argument(e.to_string()),
            e @ EngineError::IndicatorLengthMismatch { .. } => tonic::Status::internal(e.to_string()),
            EngineError::CsvSystemError { source } => tonic::Status::invalid_argument(format!("CSV parsing system error: {}", source)),
            EngineError::IoError { source } => {
                if source.kind() == std::io::ErrorKind::NotFound {
                    tonic::Status::not_found(format!("I/O error: {}", source))
                } else {
                    tonic::Status::internal(format!("I/O error: {}", source))
                }
            }
            EngineError::CsvDataFormatError(msg) => tonic::Status::invalid_argument(format!("CSV data format error: {}", msg)),
            EngineError::DataSourceError(msg) => tonic::Status::unavailable(format!("Market data source error: {}", msg)),
            e @ EngineError::PathNotAllowed(_) => tonic::Status::permission_denied(e.to_string()),
            EngineError::AnyhowError(source) => tonic::Status::internal(format!("An internal error occurred: {}", source)),
        }
    }
}
