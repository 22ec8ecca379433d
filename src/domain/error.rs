//! Domain error types.
//!
//! The simulation core never fails; these errors come from loading
//! configuration, reading market data and writing exports.

use chrono::NaiveDate;

/// Top-level error type for fgtrader.
#[derive(Debug, thiserror::Error)]
pub enum FgTraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no aligned price/sentiment data between {start} and {end}")]
    NoData { start: NaiveDate, end: NaiveDate },

    #[error("export error: {reason}")]
    Export { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FgTraderError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        FgTraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn data_source(reason: impl Into<String>) -> Self {
        FgTraderError::DataSource {
            reason: reason.into(),
        }
    }
}

impl From<&FgTraderError> for std::process::ExitCode {
    fn from(err: &FgTraderError) -> Self {
        let code: u8 = match err {
            FgTraderError::Io(_) => 1,
            FgTraderError::ConfigParse { .. }
            | FgTraderError::ConfigMissing { .. }
            | FgTraderError::ConfigInvalid { .. } => 2,
            FgTraderError::DataSource { .. } => 3,
            FgTraderError::NoData { .. } => 5,
            FgTraderError::Export { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
