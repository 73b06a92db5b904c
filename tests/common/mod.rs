//! Shared fixtures for integration tests

use linkbundle::StateStore;
use linkbundle::models::{EntityId, Link, NewBundle, NewLink, StorageManager};
use tempfile::TempDir;

/// A store saving into its own temporary directory
pub struct TempStore {
    pub dir: TempDir,
    pub store: StateStore,
}

impl TempStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = StateStore::open(storage_in(&dir));
        Self { dir, store }
    }

    /// Open a second store over the same directory, as a fresh process would
    pub fn reopen(&self) -> StateStore {
        StateStore::open(storage_in(&self.dir))
    }
}

pub fn storage_in(dir: &TempDir) -> StorageManager {
    StorageManager::with_dir(dir.path()).expect("open storage")
}

pub fn category_id(store: &StateStore, name: &str) -> EntityId {
    store
        .state()
        .category_by_name(name)
        .unwrap_or_else(|| panic!("seeded category {name}"))
        .id
        .clone()
}

pub fn add_link(store: &mut StateStore, title: &str, url: &str, category: &str) -> Link {
    let category_id = category_id(store, category);
    store.add_link(NewLink::new(title, url, category_id))
}

pub fn bundle_of(store: &mut StateStore, name: &str, links: &[&Link]) -> EntityId {
    store
        .add_bundle(NewBundle {
            name: name.to_string(),
            description: format!("{name} links"),
            link_ids: links.iter().map(|l| l.id.clone()).collect(),
        })
        .id
}
