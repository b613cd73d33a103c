//! Journey state errors.

/// Specific error conditions for journey operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum NarrativeErrorKind {
    /// A stage tracker needs at least one stage
    #[display("Stage list cannot be empty")]
    EmptyStages,
    /// Choice index outside the offered choices
    #[display("Choice {} is out of range (only {} offered)", index, available)]
    InvalidChoice {
        /// Requested choice (zero based)
        index: usize,
        /// Number of choices on offer
        available: usize,
    },
    /// The final stage has been reached
    #[display("Journey is already complete")]
    JourneyComplete,
    /// The player chose to stop before the final stage
    #[display("Journey has ended")]
    JourneyEnded,
    /// Opening scenario requested twice
    #[display("Journey has already begun")]
    AlreadyStarted,
    /// Choice requested before the opening scenario exists
    #[display("Journey has not begun")]
    NotStarted,
    /// Retry requested with no failed turn pending
    #[display("No failed turn to retry")]
    NothingToRetry,
    /// Snapshot does not belong to this journey
    #[display("Snapshot mismatch: {}", _0)]
    SnapshotMismatch(String),
}

/// Error type for journey operations.
///
/// # Examples
///
/// ```
/// use odyssey_error::{NarrativeError, NarrativeErrorKind};
///
/// let err = NarrativeError::new(NarrativeErrorKind::EmptyStages);
/// assert!(format!("{}", err).contains("empty"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Narrative Error: {} at line {} in {}", kind, line, file)]
pub struct NarrativeError {
    /// The specific error condition
    pub kind: NarrativeErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl NarrativeError {
    /// Create a new NarrativeError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: NarrativeErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
