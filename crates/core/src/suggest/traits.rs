//! Remote suggester contract.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::vocabulary::Word;

/// Errors a remote suggester can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The request was cancelled by a newer sentence. Not a failure.
    #[error("Request aborted")]
    Aborted,

    #[error("Remote unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("No usable suggestions in response")]
    Empty,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl RemoteError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteError::Aborted => "aborted",
            RemoteError::Unavailable(_) => "unavailable",
            RemoteError::Malformed(_) => "malformed",
            RemoteError::Empty => "empty",
            RemoteError::Timeout(_) => "timeout",
        }
    }

    /// Whether this outcome counts against the circuit breaker.
    pub fn is_failure(&self) -> bool {
        !matches!(self, RemoteError::Aborted)
    }
}

/// A context-aware next-word suggester backed by a remote service.
///
/// Implementations should observe `cancel` and return
/// `RemoteError::Aborted` promptly once it fires. Suggestions must come from
/// `vocabulary`.
#[async_trait]
pub trait RemoteSuggester: Send + Sync {
    /// Name of this suggester for logging.
    fn name(&self) -> &str;

    async fn suggest(
        &self,
        sentence: &[Word],
        vocabulary: &[Word],
        cancel: &CancellationToken,
    ) -> Result<Vec<Word>, RemoteError>;
}
