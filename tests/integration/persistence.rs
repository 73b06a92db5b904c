//! State survives a restart and a damaged state file never blocks startup

use super::common::{TempStore, add_link, bundle_of, storage_in};
use linkbundle::StateStore;
use linkbundle::models::{DEFAULT_CATEGORIES, NewActivity, StorageManager};
use std::fs;

#[test]
fn first_open_seeds_and_saves_defaults() {
    let temp = TempStore::new();
    let state_file = temp.store.storage().unwrap().state_file().to_path_buf();

    assert!(state_file.exists());
    assert_eq!(temp.store.stats().categories, DEFAULT_CATEGORIES.len());
    assert_eq!(temp.store.stats().links, 0);
}

#[test]
fn every_mutation_is_visible_after_reopen() {
    let mut temp = TempStore::new();
    let uniswap = add_link(&mut temp.store, "Uniswap", "https://uniswap.org", "Ethereum");
    let aave = add_link(&mut temp.store, "Aave", "https://aave.com", "Ethereum");
    bundle_of(&mut temp.store, "DeFi", &[&uniswap, &aave]);
    let date = chrono::NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
    temp.store.add_activity(NewActivity::new("Rebalance", date));
    temp.store.delete_link(&aave.id);

    let reopened = temp.reopen();
    assert_eq!(reopened.state(), temp.store.state());
    assert_eq!(reopened.state().bundles[0].link_ids, vec![uniswap.id]);
}

#[test]
fn corrupt_state_file_starts_fresh_and_keeps_a_copy() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    fs::write(storage.state_file(), "{\"links\": [ not json").unwrap();

    let store = StateStore::open(storage);
    assert_eq!(store.stats().links, 0);
    assert_eq!(store.stats().categories, DEFAULT_CATEGORIES.len());

    let quarantined: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().contains(".corrupt-"))
        .collect();
    assert_eq!(quarantined.len(), 1);
    assert_eq!(
        fs::read_to_string(quarantined[0].path()).unwrap(),
        "{\"links\": [ not json"
    );
}

#[test]
fn save_failure_keeps_in_memory_state() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageManager::with_dir(dir.path().join("data")).unwrap();
    let mut store = StateStore::open(storage);

    // Replace the data directory with a plain file so later saves fail
    fs::remove_dir_all(dir.path().join("data")).unwrap();
    fs::write(dir.path().join("data"), "").unwrap();

    let link = add_link(&mut store, "Mempool", "https://mempool.space", "Bitcoin");
    assert_eq!(store.state().link(&link.id).map(|l| l.title.as_str()), Some("Mempool"));
}

#[test]
fn backup_copies_the_current_slot() {
    let mut temp = TempStore::new();
    add_link(&mut temp.store, "Jupiter", "https://jup.ag", "Solana");

    let backup = temp.store.storage().unwrap().backup().unwrap();
    assert!(backup.starts_with(temp.dir.path().join("backups")));
    assert_eq!(
        fs::read_to_string(&backup).unwrap(),
        fs::read_to_string(temp.store.storage().unwrap().state_file()).unwrap()
    );
}

#[test]
fn non_utf8_state_file_is_copied_before_reseeding() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    let original: &[u8] = b"{\"links\":[{\"title\":\"caf\xE9\"}]}";
    fs::write(storage.state_file(), original).unwrap();

    let store = StateStore::open(storage);
    assert!(!store.is_read_only());
    assert_eq!(store.stats().categories, DEFAULT_CATEGORIES.len());

    let kept: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().contains(".corrupt-"))
        .collect();
    assert_eq!(kept.len(), 1);
    assert_eq!(fs::read(kept[0].path()).unwrap(), original);
}

#[test]
fn unreadable_slot_is_never_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    let slot = storage.state_file().to_path_buf();
    fs::create_dir(&slot).unwrap();

    let mut store = StateStore::open(storage);
    assert!(store.is_read_only());
    add_link(&mut store, "Mempool", "https://mempool.space", "Bitcoin");

    assert_eq!(store.stats().links, 1);
    assert!(slot.is_dir());
    assert!(!dir.path().join("bundle-app-state.json.tmp").exists());
}
