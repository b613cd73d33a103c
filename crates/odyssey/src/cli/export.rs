//! `export`: write a saved journey as Markdown.

use super::sessions::load_snapshot;
use crate::OdysseyConfig;
use odyssey_narrative::MarkdownExporter;
use odyssey_storage::{FileSystemImageStorage, FileSystemSessionStore};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::info;

/// Render `session_id` to `out`; illustrations are written beside it.
pub async fn export_session(
    session_id: &str,
    out: &Path,
    config: &OdysseyConfig,
) -> Result<(), Box<dyn Error>> {
    let store = FileSystemSessionStore::new(config.storage().session_dir());
    let snapshot = load_snapshot(&store, session_id).await?;

    let document_dir = out
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let images = FileSystemImageStorage::new(&document_dir)?;

    let document = MarkdownExporter::new(&document_dir)
        .render(&snapshot, &images)
        .await?;
    tokio::fs::write(out, document).await?;

    info!(session_id, out = %out.display(), "Exported journey");
    println!("Wrote {}", out.display());
    Ok(())
}
