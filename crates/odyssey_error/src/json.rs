//! JSON error types.

/// JSON encode/decode failure, tagged with what was being processed.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error ({}): {} at line {} in {}", context, message, line, file)]
pub struct JsonError {
    /// What was being encoded or decoded (e.g. "session snapshot")
    pub context: String,
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Create a new JsonError at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use odyssey_error::JsonError;
    ///
    /// let err = JsonError::new("session snapshot", "missing field `log`");
    /// assert!(err.to_string().contains("session snapshot"));
    /// ```
    #[track_caller]
    pub fn new(context: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            context: context.into(),
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
