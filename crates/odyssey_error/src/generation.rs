//! Generation failures and retry classification.

/// Why a text or image generation call failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GenerationErrorKind {
    /// API key not found in environment
    #[display("OPENAI_API_KEY environment variable not set")]
    MissingApiKey,
    /// Request never reached the service
    #[display("Request failed: {}", _0)]
    Transport(String),
    /// Service answered with a non-success status
    #[display("HTTP {} error: {}", status_code, message)]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// Service response could not be decoded
    #[display("Failed to parse response: {}", _0)]
    ResponseParsing(String),
    /// Service returned no usable content
    #[display("Service returned an empty response")]
    EmptyResponse,
    /// Completion parsed to an empty narrative
    #[display("Completion contained no narrative text")]
    EmptyNarrative,
    /// Call exceeded the configured deadline
    #[display("Call timed out after {} seconds", _0)]
    Timeout(u64),
    /// Base64 image payload was malformed
    #[display("Base64 decode error: {}", _0)]
    Base64Decode(String),
}

impl GenerationErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationErrorKind::Api { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            GenerationErrorKind::Transport(_) => true,
            GenerationErrorKind::Timeout(_) => true,
            _ => false,
        }
    }

    /// Get retry strategy parameters for this error type.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    pub fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self {
            GenerationErrorKind::Api { status_code, .. } => match *status_code {
                429 => (5000, 3, 40),
                503 => (2000, 5, 60),
                500 | 502 | 504 => (1000, 3, 8),
                408 => (2000, 4, 30),
                _ => (2000, 5, 60),
            },
            GenerationErrorKind::Transport(_) => (1000, 3, 10),
            _ => (2000, 5, 60),
        }
    }
}

/// Generation error with source location tracking.
///
/// # Examples
///
/// ```
/// use odyssey_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::MissingApiKey);
/// assert!(format!("{}", err).contains("OPENAI_API_KEY"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The kind of error that occurred
    pub kind: GenerationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that support retry logic.
///
/// # Examples
///
/// ```
/// use odyssey_error::{GenerationError, GenerationErrorKind, RetryableError};
///
/// let err = GenerationError::new(GenerationErrorKind::Api {
///     status_code: 503,
///     message: "Service unavailable".to_string(),
/// });
///
/// assert!(err.is_retryable());
/// let (backoff, retries, _max_delay) = err.retry_strategy_params();
/// assert_eq!(backoff, 2000);
/// assert_eq!(retries, 5);
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Rate limits, overloaded servers and dropped connections are transient.
    /// Authentication and bad requests are permanent.
    fn is_retryable(&self) -> bool;

    /// Get retry strategy parameters for this error.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        (2000, 5, 60)
    }
}

impl RetryableError for GenerationError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        self.kind.retry_strategy_params()
    }
}
