//! Tests for the filesystem stores.

use odyssey_core::ImageHandle;
use odyssey_interface::SessionStore;
use odyssey_storage::{FileSystemImageStorage, FileSystemSessionStore, ImageStorage};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Snapshot {
    stage: usize,
    events: Vec<String>,
}

fn snapshot(stage: usize) -> Snapshot {
    Snapshot {
        stage,
        events: vec!["Pip wakes.".to_string(), "Stretch".to_string()],
    }
}

#[tokio::test]
async fn identical_images_share_one_file() {
    let dir = TempDir::new().unwrap();
    let storage = FileSystemImageStorage::new(dir.path()).unwrap();
    let image = ImageHandle::new(vec![1, 2, 3, 4], "image/png", "first");
    let same_bytes = ImageHandle::new(vec![1, 2, 3, 4], "image/png", "second caption");

    assert!(!storage.exists(&image).await.unwrap());
    let first = storage.store(&image).await.unwrap();
    let second = storage.store(&same_bytes).await.unwrap();

    assert_eq!(first.path(), second.path());
    assert!(first.path().starts_with(dir.path().join("images")));
    assert_eq!(first.path().extension().unwrap(), "png");
    assert!(storage.exists(&image).await.unwrap());
    assert_eq!(storage.retrieve(&first).await.unwrap(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn tampered_image_fails_hash_check() {
    let dir = TempDir::new().unwrap();
    let storage = FileSystemImageStorage::new(dir.path()).unwrap();
    let stored = storage
        .store(&ImageHandle::new(vec![9; 32], "image/jpeg", "x"))
        .await
        .unwrap();

    std::fs::write(stored.path(), b"not the same").unwrap();
    let err = storage.retrieve(&stored).await.unwrap_err();
    assert!(err.to_string().contains("hash mismatch"));
}

#[tokio::test]
async fn session_round_trip_and_listing() {
    let dir = TempDir::new().unwrap();
    let store = FileSystemSessionStore::new(dir.path().join("sessions"));

    let empty: Vec<String> = SessionStore::<Snapshot>::list(&store).await.unwrap();
    assert!(empty.is_empty());

    store.save("b-session", &snapshot(2)).await.unwrap();
    store.save("a-session", &snapshot(0)).await.unwrap();
    store.save("a-session", &snapshot(5)).await.unwrap();

    let loaded: Option<Snapshot> = store.load("a-session").await.unwrap();
    assert_eq!(loaded, Some(snapshot(5)));

    let ids = SessionStore::<Snapshot>::list(&store).await.unwrap();
    assert_eq!(ids, vec!["a-session".to_string(), "b-session".to_string()]);
}

#[tokio::test]
async fn unknown_session_loads_as_none_and_delete_reports_absence() {
    let dir = TempDir::new().unwrap();
    let store = FileSystemSessionStore::new(dir.path());

    let missing: Option<Snapshot> = store.load("nobody").await.unwrap();
    assert!(missing.is_none());
    assert!(!SessionStore::<Snapshot>::delete(&store, "nobody").await.unwrap());

    store.save("somebody", &snapshot(1)).await.unwrap();
    assert!(SessionStore::<Snapshot>::delete(&store, "somebody").await.unwrap());
    let gone: Option<Snapshot> = store.load("somebody").await.unwrap();
    assert!(gone.is_none());
}

#[tokio::test]
async fn corrupt_snapshot_is_a_json_error() {
    let dir = TempDir::new().unwrap();
    let store = FileSystemSessionStore::new(dir.path());
    std::fs::write(dir.path().join("broken.json"), b"{ not json").unwrap();

    let err = SessionStore::<Snapshot>::load(&store, "broken").await.unwrap_err();
    assert!(err.to_string().contains("JSON Error"));
}
