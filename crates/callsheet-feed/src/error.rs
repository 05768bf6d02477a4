//! Feed error taxonomy.

use thiserror::Error;

/// Result alias for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;

/// Errors surfaced by snapshot fetchers.
///
/// A fetcher must fail rather than return an empty snapshot when the source
/// could not be read: an empty snapshot is a statement that the roster is
/// empty, and a full-mode pass will sweep the whole scope on it.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The upstream source could not be reached.
    #[error("Transport failure: {message}")]
    Transport {
        /// Human-readable description of the failure
        message: String,
        /// Underlying transport error, if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The upstream payload could not be parsed into records.
    #[error("Malformed payload: {message}")]
    Malformed {
        /// What was wrong with the payload
        message: String,
    },

    /// The upstream source is temporarily refusing requests.
    #[error("Source unavailable: {message}")]
    Unavailable {
        /// Human-readable description of the refusal
        message: String,
    },
}

impl FeedError {
    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transport error wrapping an underlying cause.
    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a malformed-payload error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates a source-unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Whether retrying the fetch may succeed without intervention.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Unavailable { .. })
    }

    /// Whether the error is permanent and retrying is pointless.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "TRANSPORT_FAILURE",
            Self::Malformed { .. } => "MALFORMED_PAYLOAD",
            Self::Unavailable { .. } => "SOURCE_UNAVAILABLE",
        }
    }
}
