//! Finite-stage progress model.

use derive_getters::Getters;
use odyssey_error::{NarrativeError, NarrativeErrorKind, OdysseyResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// The twelve stages of the hero's journey, in order.
pub const HERO_JOURNEY_STAGES: [&str; 12] = [
    "The Ordinary World",
    "The Call to Adventure",
    "Refusal of the Call",
    "Meeting the Mentor",
    "Crossing the Threshold",
    "Tests, Allies, and Enemies",
    "Approach to the Inmost Cave",
    "The Ordeal",
    "Reward (Seizing the Sword)",
    "The Road Back",
    "Resurrection",
    "Return with the Elixir",
];

const MAX_PROGRESS: f64 = 100.0;

/// Tracks which stage of the journey the hero is in.
///
/// Progress accumulates in `[0, 100]`. Each stage owns an equal slice of that
/// range; whenever progress reaches the end of the current stage's slice the
/// tracker moves forward one stage. It never moves back and never skips.
///
/// # Examples
///
/// ```
/// use odyssey_narrative::StageTracker;
///
/// let mut tracker = StageTracker::new(["A", "B", "C"]).unwrap();
/// for _ in 0..3 {
///     tracker.apply_change(34.0);
/// }
/// assert_eq!(*tracker.current_stage_index(), 2);
/// assert!(tracker.is_complete());
/// assert_eq!(*tracker.progress(), 100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct StageTracker {
    /// Stage labels in order
    stages: Vec<String>,
    /// Index of the current stage
    current_stage_index: usize,
    /// Accumulated progress, 0 to 100
    progress: f64,
    /// Number of changes applied so far
    steps_taken: u32,
}

impl StageTracker {
    /// Create a tracker at the first stage with zero progress.
    ///
    /// # Errors
    ///
    /// Fails with [`NarrativeErrorKind::EmptyStages`] when no stages are given.
    pub fn new<I, S>(stages: I) -> OdysseyResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stages: Vec<String> = stages.into_iter().map(Into::into).collect();
        if stages.is_empty() {
            return Err(NarrativeError::new(NarrativeErrorKind::EmptyStages).into());
        }
        debug!(stage_count = stages.len(), "Created stage tracker");
        Ok(Self {
            stages,
            current_stage_index: 0,
            progress: 0.0,
            steps_taken: 0,
        })
    }

    /// Tracker over [`HERO_JOURNEY_STAGES`].
    pub fn hero_journey() -> Self {
        Self {
            stages: HERO_JOURNEY_STAGES.iter().map(|s| s.to_string()).collect(),
            current_stage_index: 0,
            progress: 0.0,
            steps_taken: 0,
        }
    }

    /// Add `delta` to progress (clamped to `[0, 100]`) and advance at most one
    /// stage if the current stage's threshold has been reached.
    ///
    /// Returns true when the stage advanced. Non-finite deltas are ignored.
    pub fn apply_change(&mut self, delta: f64) -> bool {
        if !delta.is_finite() {
            warn!(delta, "Ignoring non-finite progress change");
            return false;
        }

        self.steps_taken = self.steps_taken.saturating_add(1);
        self.progress = (self.progress + delta).clamp(0.0, MAX_PROGRESS);

        let last = self.stages.len() - 1;
        let advanced = self.current_stage_index < last
            && self.progress >= self.threshold(self.current_stage_index);
        if advanced {
            self.current_stage_index += 1;
            info!(
                stage_index = self.current_stage_index,
                stage = %self.current_stage(),
                progress = self.progress,
                "Advanced to next stage"
            );
        } else {
            debug!(delta, progress = self.progress, "Applied progress change");
        }
        advanced
    }

    /// True once the final stage has been reached.
    pub fn is_complete(&self) -> bool {
        self.current_stage_index == self.stages.len() - 1
    }

    /// Label of the current stage.
    pub fn current_stage(&self) -> &str {
        &self.stages[self.current_stage_index]
    }

    /// Number of stages.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Progress needed to leave stage `index`.
    pub fn threshold(&self, index: usize) -> f64 {
        (index + 1) as f64 * (MAX_PROGRESS / self.stages.len() as f64)
    }

    /// How far through the stage list the hero is, in `[0, 1]`.
    pub fn journey_fraction(&self) -> f64 {
        match self.stages.len() {
            1 => 1.0,
            n => self.current_stage_index as f64 / (n - 1) as f64,
        }
    }

    /// Smallest whole-number change that advances exactly one stage per call.
    pub fn default_change_per_choice(&self) -> f64 {
        (MAX_PROGRESS / self.stages.len() as f64).ceil()
    }

    /// Check a tracker that came from outside (e.g. a stored snapshot).
    pub fn validate(&self) -> OdysseyResult<()> {
        if self.stages.is_empty() {
            return Err(NarrativeError::new(NarrativeErrorKind::EmptyStages).into());
        }
        if self.current_stage_index >= self.stages.len()
            || !(0.0..=MAX_PROGRESS).contains(&self.progress)
        {
            return Err(NarrativeError::new(NarrativeErrorKind::SnapshotMismatch(format!(
                "stage index {} / progress {} out of range for {} stages",
                self.current_stage_index,
                self.progress,
                self.stages.len()
            )))
            .into());
        }
        Ok(())
    }
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::hero_journey()
    }
}
