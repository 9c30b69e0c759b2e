use savekeep::backup::index::INDEX_FILE;
use savekeep::backup::store::BackupStore;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_save(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn delete_removes_directory_and_entry_then_reports_not_found() {
    let saves = tempdir().unwrap();
    let root = tempdir().unwrap();
    let source = write_save(saves.path(), "save1.eu4", b"content");
    let store = BackupStore::open(root.path(), 10).unwrap();
    let id = store.create(&source, "", &[]).unwrap();

    store.delete(&id).expect("first delete succeeds");
    assert!(!root.path().join(&id).exists());
    assert!(store.list_for_save("save1").is_empty());

    let err = store.delete(&id).expect_err("second delete is not-found");
    assert!(err.to_string().contains(&id));
}

#[test]
fn delete_of_already_missing_directory_still_succeeds() {
    let saves = tempdir().unwrap();
    let root = tempdir().unwrap();
    let source = write_save(saves.path(), "save1.eu4", b"content");
    let store = BackupStore::open(root.path(), 10).unwrap();
    let id = store.create(&source, "", &[]).unwrap();

    fs::remove_dir_all(root.path().join(&id)).unwrap();

    store
        .delete(&id)
        .expect("absent directory is an idempotent success");
    assert!(store.list_for_save("save1").is_empty());
}

#[test]
fn delete_drops_save_key_once_its_list_empties() {
    let saves = tempdir().unwrap();
    let root = tempdir().unwrap();
    let source = write_save(saves.path(), "save1.eu4", b"content");
    let store = BackupStore::open(root.path(), 10).unwrap();
    let id = store.create(&source, "", &[]).unwrap();

    store.delete(&id).unwrap();

    let index_body = fs::read_to_string(root.path().join(INDEX_FILE)).unwrap();
    assert!(
        !index_body.contains("save1"),
        "empty save key removed from the index document"
    );
}

#[test]
fn delete_unknown_id_fails() {
    let root = tempdir().unwrap();
    let store = BackupStore::open(root.path(), 10).unwrap();
    assert!(store.delete("save1_20990101_000000").is_err());
}
