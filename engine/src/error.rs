use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

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

    #[error("Serialization error: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Catalog format error: {0}")]
    CatalogFormatError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Indicator calculation error: {0}")]
    IndicatorError(String),

    #[error("Trade simulation error: {0}")]
    SimulationError(String),

    #[error("Insight generation error: {0}")]
    InsightError(String),

    #[error("Internal processing error: {0}")]
    ProcessingError(String),

    // Catch-all for anyhow errors when direct conversion is suitable
    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err: EngineError = io.into();
        assert!(err.to_string().starts_with("I/O error"));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let bad = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: EngineError = bad.into();
        assert!(matches!(err, EngineError::SerializationError { .. }));
    }
}
