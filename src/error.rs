use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the fetch -> parse -> normalize chain.
#[derive(Debug, Error)]
pub enum Error {
    /// Network/HTTP failure, or an unreadable local file.
    #[error("failed to fetch {origin}: {reason}")]
    Fetch { origin: String, reason: String },

    /// Malformed geographic payload.
    #[error("invalid geographic payload: {0}")]
    Parse(String),

    /// Upstream schema does not match the expected column mapping.
    #[error("schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: String, found: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to export table: {0}")]
    Export(String),
}

impl Error {
    pub(crate) fn fetch(origin: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch { origin: origin.into(), reason: reason.to_string() }
    }

    pub(crate) fn parse(reason: impl Into<String>) -> Self { Self::Parse(reason.into()) }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self { Self::Parse(err.to_string()) }
}

impl From<polars::error::PolarsError> for Error {
    fn from(err: polars::error::PolarsError) -> Self { Self::Export(err.to_string()) }
}
