//! Errors surfaced by the stream decoder.

use thiserror::Error;

/// The transport failed while the body was being read.
///
/// Wraps whatever error the byte source produced (a dropped connection,
/// an aborted request, a read timeout).
#[derive(Debug, Error)]
#[error("transport read failed: {source}")]
pub struct TransportError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    /// Wrap a transport-level error.
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Unwrap the underlying transport error.
    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync> {
        self.source
    }
}
