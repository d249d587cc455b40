use serde_json::json;
use tcard_storage::*;
use tempfile::TempDir;

fn record(pairs: &[(&str, serde_json::Value)]) -> Record {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect()
}

#[tokio::test]
async fn test_missing_file_reads_empty() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::builder().path(temp.path().join("prefs.json")).open().await.unwrap();

    assert!(store.get(&["enhancementPreferences"]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_write_read_roundtrip_and_merge() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/dir/prefs.json");
    let store = FileStore::builder().path(&path).create(true).open().await.unwrap();

    store
        .set(record(&[("enhancementPreferences", json!({ "weekend-shading": false }))]))
        .await
        .unwrap();
    store.set(record(&[("redLineColor", json!("rgb(0,0,255)"))])).await.unwrap();

    let found = store.get(&["enhancementPreferences", "redLineColor"]).await.unwrap();
    assert_eq!(found["enhancementPreferences"], json!({ "weekend-shading": false }));
    assert_eq!(found["redLineColor"], json!("rgb(0,0,255)"));

    // A second handle sees the persisted state.
    let reopened = FileStore::builder().path(&path).open().await.unwrap();
    assert_eq!(reopened.get(&["redLineColor"]).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_no_temp_files_left_after_write() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::builder().path(temp.path().join("prefs.json")).open().await.unwrap();
    store.set(record(&[("k", json!(1))])).await.unwrap();

    let names: Vec<_> = std::fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["prefs.json".to_owned()]);
}

#[tokio::test]
async fn test_stale_temp_files_are_purged_on_open() {
    let temp = TempDir::new().unwrap();
    let stale = temp.path().join("prefs.json.tcardtmp.42.7");
    std::fs::write(&stale, b"partial").unwrap();

    let _store = FileStore::builder().path(temp.path().join("prefs.json")).open().await.unwrap();
    assert!(!stale.exists());
}

#[tokio::test]
async fn test_non_object_document_is_corrupted() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("prefs.json");
    std::fs::write(&path, b"[1, 2, 3]").unwrap();

    let store = FileStore::builder().path(&path).open().await.unwrap();
    assert!(matches!(store.get(&["k"]).await, Err(StoreError::Corrupted { .. })));
    assert!(store.set(record(&[("k", json!(1))])).await.is_err());
}

#[tokio::test]
async fn test_invalid_json_is_serialization_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("prefs.json");
    std::fs::write(&path, b"{ not json").unwrap();

    let store = FileStore::builder().path(&path).open().await.unwrap();
    assert!(matches!(store.get(&["k"]).await, Err(StoreError::Serialize { .. })));
}
