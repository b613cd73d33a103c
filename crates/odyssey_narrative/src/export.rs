//! Markdown rendering of a finished (or unfinished) journey.

use crate::SessionSnapshot;
use odyssey_core::{StoryEvent, StoryEventKind};
use odyssey_error::OdysseyResult;
use odyssey_storage::{ImageStorage, StoredImage};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Renders a story log as a Markdown document.
///
/// Events are written in log order. A new section starts whenever the stage
/// changes. Images are stored through an [`ImageStorage`] and linked relative
/// to `document_dir` when they live beneath it.
#[derive(Debug, Clone)]
pub struct MarkdownExporter {
    document_dir: PathBuf,
}

impl MarkdownExporter {
    /// Exporter for a document that will be written into `document_dir`.
    pub fn new(document_dir: impl Into<PathBuf>) -> Self {
        Self {
            document_dir: document_dir.into(),
        }
    }

    /// Render the snapshot's story.
    #[tracing::instrument(skip_all, fields(session_id = %snapshot.session_id(), events = snapshot.log().len()))]
    pub async fn render<S: ImageStorage>(
        &self,
        snapshot: &SessionSnapshot,
        storage: &S,
    ) -> OdysseyResult<String> {
        let profile = snapshot.profile();
        let stages = snapshot.tracker().stages();
        let mut doc = String::new();

        let _ = writeln!(doc, "# {}'s Journey\n", profile.name());
        let _ = writeln!(
            doc,
            "*{}, facing {} to {}.*",
            profile.portrait(),
            profile.challenge().to_lowercase(),
            profile.goal()
        );

        let mut section: Option<usize> = None;
        for event in snapshot.log() {
            if section != Some(*event.stage_index()) {
                section = Some(*event.stage_index());
                let title = stages
                    .get(*event.stage_index())
                    .cloned()
                    .unwrap_or_else(|| format!("Stage {}", event.stage_index() + 1));
                let _ = writeln!(doc, "\n## {}", title);
            }
            self.render_event(&mut doc, event, storage).await?;
        }

        if snapshot.tracker().is_complete() {
            doc.push_str("\n---\n\n*The journey is complete.*\n");
        } else if *snapshot.ended() {
            doc.push_str("\n---\n\n*The journey ended early.*\n");
        }

        info!(bytes = doc.len(), "Rendered story document");
        Ok(doc)
    }

    async fn render_event<S: ImageStorage>(
        &self,
        doc: &mut String,
        event: &StoryEvent,
        storage: &S,
    ) -> OdysseyResult<()> {
        match event.kind() {
            StoryEventKind::Scenario(text) => {
                let _ = writeln!(doc, "\n{}", text.trim());
            }
            StoryEventKind::Image(image) => {
                let stored = storage.store(image).await?;
                let alt = image.caption().replace(['[', ']', '\n'], " ");
                let _ = writeln!(
                    doc,
                    "\n![{}]({})",
                    alt.trim(),
                    self.link_for(&stored).display()
                );
            }
            StoryEventKind::Choice(text) => {
                let _ = writeln!(doc, "\n> You chose: **{}**", text.trim());
            }
            StoryEventKind::Outcome(text) => {
                let _ = writeln!(doc, "\n_{}_", text.trim());
            }
            StoryEventKind::Error(text) => {
                let _ = writeln!(doc, "\n> **Note:** {}", text.trim());
            }
        }
        Ok(())
    }

    fn link_for(&self, stored: &StoredImage) -> PathBuf {
        let path: &Path = stored.path();
        match path.strip_prefix(&self.document_dir) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => {
                debug!(path = %path.display(), "Image outside document directory, linking absolute path");
                path.to_path_buf()
            }
        }
    }
}
