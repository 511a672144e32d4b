//! Error types for the turn runner.
//!
//! [`EngineError`] covers everything that can go wrong talking to a
//! reasoning engine and carries the retry predicate. [`RunnerError`] covers
//! setup: configuration, template loading and rendering, and state
//! serialization for prompts.

/// Failures of a single reasoning-engine request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// No API credential is configured. Never retried.
    #[error("no API credential configured for the reasoning engine")]
    MissingCredential,

    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The engine answered with a non-success status.
    #[error("engine returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body was not in the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The engine answered without any candidate.
    #[error("engine returned no candidates")]
    EmptyResponse,
}

impl EngineError {
    /// Whether a retry could plausibly succeed: transport failures, rate
    /// limiting (429), and server errors (5xx).
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => matches!(*status, 429 | 500..=599),
            Self::MissingCredential | Self::Decode(_) | Self::EmptyResponse => false,
        }
    }
}

/// Errors that can occur while setting up or driving the runner.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// A prompt template could not be loaded or rendered.
    #[error("template error: {0}")]
    Template(String),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_predicate() {
        assert!(EngineError::Transport("connection reset".to_owned()).is_retryable());
        for status in [429, 500, 502, 503, 599] {
            assert!(EngineError::Status { status, body: String::new() }.is_retryable(), "{status}");
        }
        for status in [400, 401, 403, 404, 422] {
            assert!(!EngineError::Status { status, body: String::new() }.is_retryable(), "{status}");
        }
        assert!(!EngineError::MissingCredential.is_retryable());
        assert!(!EngineError::Decode("bad json".to_owned()).is_retryable());
        assert!(!EngineError::EmptyResponse.is_retryable());
    }

    #[test]
    fn serde_failures_convert() {
        let failure = serde_json::from_str::<u32>("not a number").map_err(RunnerError::from);
        assert!(matches!(failure, Err(RunnerError::Serde(_))));
    }
}
