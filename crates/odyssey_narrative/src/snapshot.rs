//! Serializable session state.

use crate::{PendingTurn, SessionSettings, StageTracker, StoryLog};
use chrono::{DateTime, Utc};
use derive_getters::{Dissolve, Getters};
use odyssey_core::{CharacterProfile, ParsedScenario};
use odyssey_error::{NarrativeError, NarrativeErrorKind, OdysseyResult};
use serde::{Deserialize, Serialize};

/// Current snapshot layout.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to resume a journey.
///
/// Caches are not included; a resumed session starts with empty caches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Dissolve)]
pub struct SessionSnapshot {
    /// Layout version
    version: u32,
    /// Session id
    session_id: String,
    /// The hero
    profile: CharacterProfile,
    /// Session knobs
    settings: SessionSettings,
    /// Stage progress
    tracker: StageTracker,
    /// Story so far
    log: StoryLog,
    /// Scenario awaiting the player's choice
    current: Option<ParsedScenario>,
    /// Turn that failed and can be retried
    pending: Option<PendingTurn>,
    /// The player chose to stop before the final stage
    #[serde(default)]
    ended: bool,
    /// When the snapshot was taken
    saved_at: DateTime<Utc>,
}

impl SessionSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        session_id: String,
        profile: CharacterProfile,
        settings: SessionSettings,
        tracker: StageTracker,
        log: StoryLog,
        current: Option<ParsedScenario>,
        pending: Option<PendingTurn>,
        ended: bool,
    ) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            session_id,
            profile,
            settings,
            tracker,
            log,
            current,
            pending,
            ended,
            saved_at: Utc::now(),
        }
    }

    /// True when the journey is over, either by reaching the final stage
    /// or because the player stopped it.
    pub fn is_finished(&self) -> bool {
        self.ended || self.tracker.is_complete()
    }

    /// Reject snapshots this version cannot resume.
    pub fn validate(&self) -> OdysseyResult<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(NarrativeError::new(NarrativeErrorKind::SnapshotMismatch(format!(
                "unsupported snapshot version {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )))
            .into());
        }
        self.tracker.validate()
    }
}
