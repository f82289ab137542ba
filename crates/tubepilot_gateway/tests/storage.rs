use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use tubepilot_gateway::{
    ensure_storage_dir, AtomicFileWriter, CredentialStore, FileStore, KeyValueStore, StoreError,
    AUTH_TOKEN_KEY, SETTINGS_KEY,
};

#[test]
fn creates_missing_storage_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("state");
    assert!(!new_dir.exists());
    ensure_storage_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("value.store", "hello").unwrap();
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = writer.write("value.store", "world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn no_partial_file_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    assert!(writer.write("value.store", "data").is_err());
    assert!(!file_path.with_file_name("value.store").exists());
}

#[test]
fn file_store_set_get_remove() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::new(temp.path().join("kv"));

    assert_eq!(store.get(SETTINGS_KEY).unwrap(), None);
    store.set(SETTINGS_KEY, "(theme: Dark)").unwrap();
    assert_eq!(
        store.get(SETTINGS_KEY).unwrap().as_deref(),
        Some("(theme: Dark)")
    );

    store.remove(SETTINGS_KEY).unwrap();
    assert_eq!(store.get(SETTINGS_KEY).unwrap(), None);
    store.remove(SETTINGS_KEY).unwrap();
}

#[test]
fn file_store_rejects_path_like_keys() {
    let temp = TempDir::new().unwrap();
    let store = FileStore::new(temp.path());
    assert!(matches!(
        store.set("../escape", "x"),
        Err(StoreError::InvalidKey(_))
    ));
}

#[test]
fn credential_store_trims_and_clears() {
    let temp = TempDir::new().unwrap();
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(temp.path()));
    let credentials = CredentialStore::new(storage.clone());

    assert_eq!(credentials.token(), None);
    credentials.store("  abc \n").unwrap();
    assert_eq!(credentials.token().as_deref(), Some("abc"));
    assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("abc"));

    credentials.clear().unwrap();
    assert_eq!(credentials.token(), None);
}
