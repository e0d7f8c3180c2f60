//! Persistence tests: the record survives a restart when backed by files.
//!
//! Run with: `cargo test -p queryday-core --test file_store`

use queryday_core::facts::FactGroupName;
use queryday_core::persist::CacheRecord;
use queryday_core::testing::{paris_session, MockSource};
use queryday_core::{CacheError, FactCache, FileStore, RecordStore, STATE_KEY};
use tempfile::TempDir;

#[tokio::test]
async fn test_groups_survive_a_new_cache_instance() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let session = paris_session();

    let first_source = MockSource::paris_2001();
    let first = FactCache::new(FileStore::new(temp_dir.path()), first_source.clone());
    first
        .start_session(session.clone())
        .await
        .expect("start session");
    let core = first.ensure_core(&session).await.expect("core");

    // A fresh process reads the same directory
    let second_source = MockSource::paris_2001();
    let second = FactCache::new(FileStore::new(temp_dir.path()), second_source.clone());

    assert_eq!(second.active_session().await.expect("session"), session);
    let again = second.ensure_core(&session).await.expect("core");
    assert_eq!(again, core);
    assert_eq!(second_source.total_calls(), 0);

    let record = second.snapshot(&session).await.expect("snapshot");
    assert_eq!(record.facts.present_groups(), vec![FactGroupName::Core]);
}

#[tokio::test]
async fn test_record_file_is_readable_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = FileStore::new(temp_dir.path());
    let cache = FactCache::new(store.clone(), MockSource::failing());
    let session = paris_session();

    cache.start_session(session.clone()).await.expect("start");
    cache.ensure_culture(&session).await.expect("culture");

    let path = store.path_for(STATE_KEY).expect("path");
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("CHRONO_STATE.json"));

    let content = std::fs::read_to_string(&path).expect("read record");
    let value: serde_json::Value = serde_json::from_str(&content).expect("json");
    assert_eq!(value["facts"]["culture"]["movieData"]["title"], "Cinema of 2001");
    assert_eq!(value["facts"]["culture"]["musicData"]["artist"], "Various Artists");
    assert!(value["facts"]["core"].is_null());

    let record = CacheRecord::from_json(&content).expect("decode");
    assert!(record.belongs_to(&session));
}

#[tokio::test]
async fn test_end_session_removes_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = FileStore::new(temp_dir.path());
    let cache = FactCache::new(store.clone(), MockSource::paris_2001());

    cache.start_session(paris_session()).await.expect("start");
    cache.end_session().await.expect("end");

    assert_eq!(store.get(STATE_KEY).await.expect("get"), None);
    assert!(matches!(
        cache.active_session().await,
        Err(CacheError::NoSession)
    ));
}
