use thiserror::Error;

/// Failure of a check request against the analysis server.
///
/// Never surfaced to the user: validations swallow these and leave the
/// previously displayed diagnostics in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("analysis server is not running")]
    NotRunning,
    #[error("check request was cancelled")]
    Cancelled,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("analyzer failed: {0}")]
    Analyzer(String),
}

impl CheckError {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
