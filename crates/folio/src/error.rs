//! CLI error types.

use folio_billing::RateError;
use folio_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid bill data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Rate(#[from] RateError),
}
