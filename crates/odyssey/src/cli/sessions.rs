//! `sessions`: list saved journeys.

use crate::OdysseyConfig;
use odyssey_error::{OdysseyResult, StorageError, StorageErrorKind};
use odyssey_interface::SessionStore;
use odyssey_narrative::SessionSnapshot;
use odyssey_storage::FileSystemSessionStore;
use std::error::Error;
use tracing::warn;

/// Load a snapshot, treating an unknown id as an error.
pub(crate) async fn load_snapshot(
    store: &FileSystemSessionStore,
    session_id: &str,
) -> OdysseyResult<SessionSnapshot> {
    let snapshot: Option<SessionSnapshot> = store.load(session_id).await?;
    snapshot.ok_or_else(|| {
        StorageError::new(StorageErrorKind::NotFound(format!(
            "session {} in {}",
            session_id,
            store.dir().display()
        )))
        .into()
    })
}

/// Print every saved journey with its hero and stage.
pub async fn list_sessions(config: &OdysseyConfig) -> Result<(), Box<dyn Error>> {
    let store = FileSystemSessionStore::new(config.storage().session_dir());
    let ids = SessionStore::<SessionSnapshot>::list(&store).await?;

    if ids.is_empty() {
        println!("No saved journeys in {}", store.dir().display());
        return Ok(());
    }

    for id in ids {
        match load_snapshot(&store, &id).await {
            Ok(snapshot) => {
                let tracker = snapshot.tracker();
                let status = if tracker.is_complete() {
                    "complete".to_string()
                } else if *snapshot.ended() {
                    format!("ended at stage {}", tracker.current_stage_index() + 1)
                } else {
                    format!(
                        "stage {}/{}",
                        tracker.current_stage_index() + 1,
                        tracker.stage_count()
                    )
                };
                println!(
                    "{}  {}  {}: {}  (saved {})",
                    id,
                    snapshot.profile().identity(),
                    status,
                    tracker.current_stage(),
                    snapshot.saved_at().format("%Y-%m-%d %H:%M")
                );
            }
            Err(e) => {
                warn!(session_id = %id, error = %e, "Skipping unreadable session");
                println!("{}  (unreadable)", id);
            }
        }
    }
    Ok(())
}
