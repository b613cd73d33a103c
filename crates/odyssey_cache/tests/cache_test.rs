//! Tests for single-flight scenario caching.

use odyssey_cache::{ScenarioCache, ScenarioCacheConfig, ScenarioCacheConfigBuilder, Signature};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn key(stage: &str) -> Signature {
    Signature::from_parts(["Pip the hedgehog", stage, "Follow the river", "Watercolor"])
}

#[tokio::test]
async fn test_second_call_returns_first_value() {
    let cache: ScenarioCache<String> = ScenarioCache::default();
    let calls = AtomicUsize::new(0);

    let first = cache
        .get_or_compute(&key("The Ordeal"), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>("v1".to_string())
        })
        .await
        .unwrap();
    let second = cache
        .get_or_compute(&key("The Ordeal"), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>("v2".to_string())
        })
        .await
        .unwrap();

    assert_eq!(first, "v1");
    assert_eq!(second, "v1");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*cache.stats().hits(), 1);
    assert_eq!(*cache.stats().misses(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_computation() {
    let cache: Arc<ScenarioCache<String>> = Arc::new(ScenarioCache::default());
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = Arc::clone(&cache);
        let calls = Arc::clone(&calls);
        handles.push(tokio::spawn(async move {
            let signature = key("The Road Back");
            cache
                .get_or_compute(&signature, || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<_, String>("shared".to_string())
                })
                .await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "shared");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_failure_is_not_cached() {
    let cache: ScenarioCache<String> = ScenarioCache::default();

    let failed = cache
        .get_or_compute(&key("Resurrection"), || async {
            Err::<String, _>("service unavailable".to_string())
        })
        .await;
    assert_eq!(failed.unwrap_err(), "service unavailable");
    assert!(!cache.contains(&key("Resurrection")));
    assert!(cache.is_empty());

    let recovered = cache
        .get_or_compute(&key("Resurrection"), || async {
            Ok::<_, String>("second try".to_string())
        })
        .await
        .unwrap();
    assert_eq!(recovered, "second try");
    assert_eq!(cache.get(&key("Resurrection")).as_deref(), Some("second try"));
}

#[tokio::test]
async fn test_distinct_keys_compute_separately() {
    let cache: ScenarioCache<u32> = ScenarioCache::default();

    let a = cache
        .get_or_compute(&key("The Ordinary World"), || async { Ok::<_, ()>(1) })
        .await
        .unwrap();
    let b = cache
        .get_or_compute(&key("The Call to Adventure"), || async { Ok::<_, ()>(2) })
        .await
        .unwrap();

    assert_eq!((a, b), (1, 2));
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn test_expired_entries_are_recomputed() {
    let config = ScenarioCacheConfigBuilder::default()
        .ttl_secs(Some(1))
        .build()
        .unwrap();
    let cache: ScenarioCache<u32> = ScenarioCache::new(config);

    cache
        .get_or_compute(&key("The Ordeal"), || async { Ok::<_, ()>(1) })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(!cache.contains(&key("The Ordeal")));

    let fresh = cache
        .get_or_compute(&key("The Ordeal"), || async { Ok::<_, ()>(2) })
        .await
        .unwrap();
    assert_eq!(fresh, 2);
}

#[tokio::test]
async fn test_disabled_cache_always_computes() {
    let config = ScenarioCacheConfig::default().with_enabled(false);
    let cache: ScenarioCache<u32> = ScenarioCache::new(config);

    for expected in 1..=3 {
        let value = cache
            .get_or_compute(&key("The Ordeal"), || async move { Ok::<_, ()>(expected) })
            .await
            .unwrap();
        assert_eq!(value, expected);
    }
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_clear() {
    let cache: ScenarioCache<u32> = ScenarioCache::default();
    cache
        .get_or_compute(&key("The Ordeal"), || async { Ok::<_, ()>(7) })
        .await
        .unwrap();
    assert_eq!(cache.len(), 1);

    cache.clear();

    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_invalidated_key_is_recomputed() {
    let cache: ScenarioCache<u32> = ScenarioCache::default();
    let calls = AtomicUsize::new(0);
    let compute = || async {
        Ok::<_, String>(calls.fetch_add(1, Ordering::SeqCst) as u32)
    };

    assert_eq!(cache.get_or_compute(&key("The Road Back"), compute).await.unwrap(), 0);
    assert!(cache.invalidate(&key("The Road Back")));
    assert!(!cache.invalidate(&key("The Road Back")));
    assert!(!cache.contains(&key("The Road Back")));

    assert_eq!(cache.get_or_compute(&key("The Road Back"), compute).await.unwrap(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
