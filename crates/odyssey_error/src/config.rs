//! Configuration error types.

/// Configuration error with source location.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Error message
    pub message: String,
    /// Offending setting, when one can be named
    pub key: Option<String>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use odyssey_error::ConfigError;
    ///
    /// let err = ConfigError::new("Could not read odyssey.toml");
    /// assert!(err.key.is_none());
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            key: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create a ConfigError blaming a specific setting.
    ///
    /// # Examples
    ///
    /// ```
    /// use odyssey_error::ConfigError;
    ///
    /// let err = ConfigError::for_key("journey.stages", "must list at least one stage");
    /// assert_eq!(err.key.as_deref(), Some("journey.stages"));
    /// assert!(err.message.contains("journey.stages"));
    /// ```
    #[track_caller]
    pub fn for_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        let key = key.into();
        Self {
            message: format!("{}: {}", key, message.into()),
            key: Some(key),
            line: location.line(),
            file: location.file(),
        }
    }
}
