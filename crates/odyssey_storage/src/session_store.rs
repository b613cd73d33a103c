//! One JSON file per saved session.

use odyssey_error::{JsonError, OdysseyResult, StorageError, StorageErrorKind};
use odyssey_interface::SessionStore;
use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// Session snapshots stored as `{dir}/{session_id}.json`.
///
/// The directory is created on the first save. Saves are atomic: the
/// snapshot is written to a temp file and renamed over the old one.
#[derive(Debug, Clone)]
pub struct FileSystemSessionStore {
    dir: PathBuf,
}

impl FileSystemSessionStore {
    /// Store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the snapshots.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session_id: &str) -> OdysseyResult<PathBuf> {
        let usable = !session_id.is_empty()
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !usable {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(format!(
                "session id {:?}",
                session_id
            )))
            .into());
        }
        Ok(self.dir.join(format!("{}.{}", session_id, EXTENSION)))
    }
}

#[async_trait::async_trait]
impl<S> SessionStore<S> for FileSystemSessionStore
where
    S: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    #[tracing::instrument(skip(self, snapshot), fields(dir = %self.dir.display()))]
    async fn save(&self, session_id: &str, snapshot: &S) -> OdysseyResult<()> {
        let path = self.path_for(session_id)?;
        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| JsonError::new("session snapshot", e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                self.dir.display(),
                e
            )))
        })?;

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &json).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;
        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::info!(path = %path.display(), bytes = json.len(), "Saved session");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn load(&self, session_id: &str) -> OdysseyResult<Option<S>> {
        let path = self.path_for(session_id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No saved session");
                return Ok(None);
            }
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
                .into());
            }
        };

        let snapshot = serde_json::from_slice(&bytes)
            .map_err(|e| JsonError::new(format!("session snapshot {}", session_id), e.to_string()))?;
        tracing::debug!(bytes = bytes.len(), "Loaded session");
        Ok(Some(snapshot))
    }

    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn delete(&self, session_id: &str) -> OdysseyResult<bool> {
        let path = self.path_for(session_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!("Deleted session");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "delete {}: {}",
                path.display(),
                e
            )))
            .into()),
        }
    }

    async fn list(&self) -> OdysseyResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    self.dir.display(),
                    e
                )))
                .into());
            }
        };

        let mut ids = Vec::new();
        loop {
            let entry = entries.next_entry().await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    self.dir.display(),
                    e
                )))
            })?;
            let Some(entry) = entry else { break };
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_that_escape_the_directory_are_rejected() {
        let store = FileSystemSessionStore::new("/sessions");
        assert!(store.path_for("../etc/passwd").is_err());
        assert!(store.path_for("").is_err());
        assert_eq!(
            store.path_for("abc-123").unwrap(),
            PathBuf::from("/sessions/abc-123.json")
        );
    }
}
