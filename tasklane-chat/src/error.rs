//! Error types for the chat client and helpers for mapping HTTP failures.

use tasklane_stream::TransportError;
use thiserror::Error;

/// Errors from persisting or loading a transcript.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store rejected the write.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// The backing store could not be read.
    #[error("read failed: {0}")]
    ReadFailed(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// An environment value that could not be parsed.
#[derive(Debug, Error)]
#[error("invalid value {value:?} for {var}: {reason}")]
pub struct ConfigError {
    /// Variable name.
    pub var: String,
    /// Raw value that was rejected.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Errors surfaced to the caller of a chat request.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ChatError {
    /// No credential is available; the request was never sent.
    #[error("authentication required")]
    AuthRequired,

    /// The gateway answered 429.
    #[error("rate limited")]
    RateLimited,

    /// The gateway answered 402.
    #[error("payment required")]
    PaymentRequired,

    /// The gateway answered with another non-success status.
    #[error("gateway returned HTTP {status}: {body}")]
    Http {
        /// Status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The request could not be sent or its status line not received.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The body stream failed after streaming began.
    #[error("reply interrupted: {source}")]
    Transport {
        /// Reply text assembled before the failure.
        partial: String,
        /// The read error.
        #[source]
        source: TransportError,
    },

    /// The caller abandoned the request.
    #[error("chat cancelled")]
    Cancelled {
        /// Reply text assembled before cancellation.
        partial: String,
    },

    /// The reply was received but could not be persisted.
    #[error("transcript store: {0}")]
    Store(#[from] StoreError),
}

impl ChatError {
    /// Whether trying the same request again later might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::RateLimited
            | ChatError::Request(_)
            | ChatError::Transport { .. } => true,
            ChatError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Reply text that was assembled before the error, if any.
    pub fn partial(&self) -> Option<&str> {
        match self {
            ChatError::Transport { partial, .. } | ChatError::Cancelled { partial } => {
                Some(partial.as_str())
            }
            _ => None,
        }
    }

    /// Short user-facing notification text for this failure class.
    pub fn notice(&self) -> &'static str {
        match self {
            ChatError::AuthRequired => "Please sign in to use the AI assistant.",
            ChatError::RateLimited => "Rate limit exceeded. Please try again in a moment.",
            ChatError::PaymentRequired => {
                "AI credits exhausted. Please add credits to continue using the assistant."
            }
            ChatError::Cancelled { .. } => "Response stopped.",
            ChatError::Store(_) => "The reply could not be saved.",
            _ => "Something went wrong talking to the assistant. Please try again.",
        }
    }
}

/// Map a non-success HTTP status from the gateway to a [`ChatError`].
///
/// 429 and 402 are terminal for the request and their body is never needed,
/// so callers may pass an empty `body` for them.
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ChatError {
    match status.as_u16() {
        429 => ChatError::RateLimited,
        402 => ChatError::PaymentRequired,
        401 => ChatError::AuthRequired,
        code => ChatError::Http {
            status: code,
            body: body.to_string(),
        },
    }
}

/// Whether a status must stop the session before any body is read.
pub(crate) fn rejects_without_body(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 402 | 429)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_429_to_rate_limited() {
        let err = map_http_status(reqwest::StatusCode::TOO_MANY_REQUESTS, "");
        assert!(matches!(err, ChatError::RateLimited));
        assert!(err.is_retryable());
    }

    #[test]
    fn map_402_to_payment_required() {
        let err = map_http_status(reqwest::StatusCode::PAYMENT_REQUIRED, "");
        assert!(matches!(err, ChatError::PaymentRequired));
        assert!(!err.is_retryable());
    }

    #[test]
    fn map_401_to_auth_required() {
        let err = map_http_status(reqwest::StatusCode::UNAUTHORIZED, "invalid token");
        assert!(matches!(err, ChatError::AuthRequired));
    }

    #[test]
    fn map_500_to_http() {
        let err = map_http_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom");
        match &err {
            ChatError::Http { status, body } => {
                assert_eq!(*status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected Http, got {other:?}"),
        }
        assert!(err.is_retryable());
    }

    #[test]
    fn map_400_is_not_retryable() {
        let err = map_http_status(reqwest::StatusCode::BAD_REQUEST, "bad");
        assert!(!err.is_retryable());
    }

    #[test]
    fn only_402_and_429_skip_the_body() {
        assert!(rejects_without_body(reqwest::StatusCode::TOO_MANY_REQUESTS));
        assert!(rejects_without_body(reqwest::StatusCode::PAYMENT_REQUIRED));
        assert!(!rejects_without_body(reqwest::StatusCode::UNAUTHORIZED));
        assert!(!rejects_without_body(reqwest::StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn notices_are_distinct_per_class() {
        let rate = ChatError::RateLimited.notice();
        let pay = ChatError::PaymentRequired.notice();
        let auth = ChatError::AuthRequired.notice();
        assert_ne!(rate, pay);
        assert_ne!(pay, auth);
        assert!(rate.contains("Rate limit"));
        assert!(pay.contains("credits"));
    }

    #[test]
    fn partial_is_exposed_for_stream_failures() {
        let err = ChatError::Transport {
            partial: "half a repl".into(),
            source: TransportError::new("reset"),
        };
        assert_eq!(err.partial(), Some("half a repl"));
        assert!(err.is_retryable());
        assert_eq!(ChatError::Cancelled { partial: "x".into() }.partial(), Some("x"));
        assert_eq!(ChatError::RateLimited.partial(), None);
    }

    #[test]
    fn display_messages() {
        assert_eq!(ChatError::AuthRequired.to_string(), "authentication required");
        assert_eq!(ChatError::RateLimited.to_string(), "rate limited");
        assert_eq!(
            ChatError::Http {
                status: 503,
                body: "down".into()
            }
            .to_string(),
            "gateway returned HTTP 503: down"
        );
        assert_eq!(
            StoreError::WriteFailed("disk full".into()).to_string(),
            "write failed: disk full"
        );
    }

    #[test]
    fn store_errors_convert_into_chat_errors() {
        let boxed: Box<dyn std::error::Error + Send + Sync> =
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such table").into();
        let err = ChatError::from(StoreError::from(boxed));
        assert!(matches!(err, ChatError::Store(StoreError::Other(_))));
        assert_eq!(err.to_string(), "transcript store: no such table");
        assert!(!err.is_retryable());
        assert_eq!(err.notice(), "The reply could not be saved.");

        let read = StoreError::ReadFailed("replica offline".into());
        assert_eq!(read.to_string(), "read failed: replica offline");
    }
}
