//! The state store: single owner of `AppState` and every mutation on it.
//!
//! Readers take cheap `Arc` snapshots. Mutations go through
//! `Arc::make_mut`, so a snapshot someone is still holding is copied rather
//! than changed, and each operation publishes its whole result at once.
//! When a `StorageManager` is attached the new state is saved after every
//! committed mutation; a failed save is logged and the in-memory state stays
//! authoritative.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{
    ActivityUpdate, AppState, Bundle, BundleUpdate, Category, CategoryUpdate, DataStats, EntityId,
    Link, LinkUpdate, NewActivity, NewBundle, NewCategory, NewLink, ScheduledActivity,
    SharedBundle, SharedLink, SlotContents, StorageManager, encode_share_code, normalize_url,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("No categories available. Please create a category first.")]
    NoCategories,
}

/// Which links of a shared bundle to bring in
#[derive(Debug, Clone, Default)]
pub struct SharedImportOptions {
    /// Positions in `SharedBundle::links` to import; `None` means all
    pub selection: Option<Vec<usize>>,
    /// Import links whose URL is already in the collection
    pub include_duplicates: bool,
}

#[derive(Debug)]
pub struct StateStore {
    state: Arc<AppState>,
    storage: Option<StorageManager>,
    /// Set when the saved slot must not be overwritten
    read_only: bool,
}

impl StateStore {
    /// Load the persisted state, or seed and save a fresh one.
    ///
    /// When the slot exists but could not be read or copied aside, the
    /// store starts seeded and never writes to it.
    pub fn open(storage: StorageManager) -> Self {
        let (state, read_only) = match storage.read_slot() {
            SlotContents::Loaded(state) => {
                debug!(stats = ?state.stats(), "Loaded saved state");
                (state, false)
            }
            SlotContents::Empty => {
                info!("No saved state, seeding default categories");
                (AppState::default(), false)
            }
            SlotContents::Locked => {
                warn!(
                    path = %storage.state_file().display(),
                    "Saved state is unreadable, changes will not be saved"
                );
                (AppState::default(), true)
            }
        };

        let store = Self {
            state: Arc::new(state),
            storage: Some(storage),
            read_only,
        };
        store.persist();
        store
    }

    /// Seeded store with no persistence
    pub fn in_memory() -> Self {
        Self::from_state(AppState::default())
    }

    pub fn from_state(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
            storage: None,
            read_only: false,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Immutable view of the current state; later mutations never change it
    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    pub fn stats(&self) -> DataStats {
        self.state.stats()
    }

    pub fn storage(&self) -> Option<&StorageManager> {
        self.storage.as_ref()
    }

    /// Whether changes are kept in memory only
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Run `mutate` against the next state. The change is published and
    /// saved only when `mutate` reports that it changed something.
    fn commit<T>(
        &mut self,
        action: &'static str,
        mutate: impl FnOnce(&mut AppState) -> Option<T>,
    ) -> Option<T> {
        let mut next = Arc::clone(&self.state);
        let result = mutate(Arc::make_mut(&mut next))?;
        self.state = next;
        debug!(action, "Committed state change");
        self.persist();
        Some(result)
    }

    fn persist(&self) {
        if self.read_only {
            return;
        }
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.save(&self.state) {
                warn!(error = %e, "Failed to save state");
            }
        }
    }

    // Links

    pub fn add_link(&mut self, fields: NewLink) -> Link {
        let link = Link::new(fields);
        let created = link.clone();
        self.commit("add_link", |state| {
            state.links.push(link);
            Some(())
        });
        created
    }

    pub fn update_link(&mut self, id: &EntityId, update: LinkUpdate) -> bool {
        self.commit("update_link", |state| {
            let link = state.links.iter_mut().find(|link| &link.id == id)?;
            link.apply(update);
            Some(())
        })
        .is_some()
    }

    /// Delete a link and every reference to it from bundles and activities
    pub fn delete_link(&mut self, id: &EntityId) -> bool {
        self.commit("delete_link", |state| {
            let position = state.links.iter().position(|link| &link.id == id)?;
            state.links.remove(position);
            strip_link_references(state, id);
            Some(())
        })
        .is_some()
    }

    pub fn toggle_highlight(&mut self, id: &EntityId) -> bool {
        self.commit("toggle_highlight", |state| {
            let link = state.links.iter_mut().find(|link| &link.id == id)?;
            link.toggle_highlight();
            Some(())
        })
        .is_some()
    }

    /// Give the listed links `order` values matching their position.
    /// Unknown ids are skipped.
    pub fn reorder_links(&mut self, ordered_ids: &[EntityId]) -> bool {
        self.commit("reorder_links", |state| {
            let mut changed = false;
            for (position, id) in ordered_ids.iter().enumerate() {
                if let Some(link) = state.links.iter_mut().find(|link| &link.id == id) {
                    link.order = Some(position as i64);
                    link.touch();
                    changed = true;
                }
            }
            changed.then_some(())
        })
        .is_some()
    }

    // Categories

    pub fn add_category(&mut self, fields: NewCategory) -> Category {
        let category = Category::new(fields);
        let created = category.clone();
        self.commit("add_category", |state| {
            state.categories.push(category);
            Some(())
        });
        created
    }

    pub fn update_category(&mut self, id: &EntityId, update: CategoryUpdate) -> bool {
        self.commit("update_category", |state| {
            let category = state.categories.iter_mut().find(|c| &c.id == id)?;
            category.apply(update);
            Some(())
        })
        .is_some()
    }

    /// Delete a category, moving its links to the fallback category
    pub fn delete_category(&mut self, id: &EntityId) -> bool {
        self.commit("delete_category", |state| {
            let position = state.categories.iter().position(|c| &c.id == id)?;
            let fallback = state
                .fallback_category(Some(id))
                .map(|c| c.id.clone())
                .unwrap_or_else(EntityId::empty);

            state.categories.remove(position);
            let mut moved = 0;
            for link in state.links.iter_mut().filter(|link| &link.category_id == id) {
                link.category_id = fallback.clone();
                link.touch();
                moved += 1;
            }
            if moved > 0 {
                debug!(moved, fallback = %fallback, "Reassigned links of deleted category");
            }
            Some(())
        })
        .is_some()
    }

    // Bundles

    pub fn add_bundle(&mut self, fields: NewBundle) -> Bundle {
        let bundle = Bundle::new(fields);
        let created = bundle.clone();
        self.commit("add_bundle", |state| {
            state.bundles.push(bundle);
            Some(())
        });
        created
    }

    pub fn update_bundle(&mut self, id: &EntityId, update: BundleUpdate) -> bool {
        self.commit("update_bundle", |state| {
            let bundle = state.bundles.iter_mut().find(|b| &b.id == id)?;
            bundle.apply(update);
            Some(())
        })
        .is_some()
    }

    pub fn delete_bundle(&mut self, id: &EntityId) -> bool {
        self.commit("delete_bundle", |state| {
            let position = state.bundles.iter().position(|b| &b.id == id)?;
            state.bundles.remove(position);
            Some(())
        })
        .is_some()
    }

    /// Encode the bundle's current links into a share code, remember it on
    /// the bundle and return it. `None` if the bundle does not exist.
    pub fn generate_bundle_share_code(&mut self, id: &EntityId) -> Option<String> {
        let shared = self.shared_bundle(id)?;
        let code = encode_share_code(&shared);

        let cached = code.clone();
        self.commit("generate_bundle_share_code", |state| {
            let bundle = state.bundles.iter_mut().find(|b| &b.id == id)?;
            bundle.share_code = Some(cached);
            bundle.updated_at = chrono::Utc::now();
            Some(())
        });
        Some(code)
    }

    /// The payload a share code for this bundle carries, links in bundle
    /// order. Ids that no longer resolve are skipped.
    pub fn shared_bundle(&self, id: &EntityId) -> Option<SharedBundle> {
        let bundle = self.state.bundle(id)?;
        let links = bundle
            .link_ids
            .iter()
            .filter_map(|link_id| self.state.link(link_id))
            .map(|link| SharedLink {
                title: link.title.clone(),
                url: link.url.clone(),
                description: link.description.clone(),
                order: None,
                social_media_type: None,
            })
            .collect();

        Some(SharedBundle {
            name: bundle.name.clone(),
            description: Some(bundle.description.clone()),
            links,
        })
    }

    /// Add the links of a decoded share code to the collection.
    ///
    /// Links land in the fallback category in `order` sequence. Links whose
    /// URL is already stored are skipped unless `include_duplicates` is set.
    /// Returns how many links were added.
    pub fn import_shared_bundle(
        &mut self,
        shared: &SharedBundle,
        options: &SharedImportOptions,
    ) -> Result<usize, ImportError> {
        let category_id = self
            .state
            .fallback_category(None)
            .map(|c| c.id.clone())
            .ok_or(ImportError::NoCategories)?;

        let mut known: HashSet<String> =
            self.state.links.iter().map(Link::normalized_url).collect();
        let mut candidates: Vec<(usize, &SharedLink)> = shared.links.iter().enumerate().collect();
        candidates.sort_by(|(_, a), (_, b)| compare_order(a.order, b.order));

        let new_links: Vec<Link> = candidates
            .into_iter()
            .filter(|(index, _)| {
                options
                    .selection
                    .as_ref()
                    .is_none_or(|selection| selection.contains(index))
            })
            .filter(|(_, link)| {
                options.include_duplicates || known.insert(normalize_url(&link.url))
            })
            .map(|(_, link)| {
                Link::new(NewLink {
                    title: link.title.clone(),
                    url: link.url.clone(),
                    description: link.description.clone(),
                    category_id: category_id.clone(),
                    is_highlighted: false,
                    social_media_type: link.social_media_type,
                    order: None,
                })
            })
            .collect();

        let added = new_links.len();
        if added > 0 {
            self.commit("import_shared_bundle", |state| {
                state.links.extend(new_links);
                Some(())
            });
        }
        info!(bundle = %shared.name, added, "Imported shared bundle");
        Ok(added)
    }

    // Activities

    pub fn add_activity(&mut self, fields: NewActivity) -> ScheduledActivity {
        let activity = ScheduledActivity::new(fields);
        let created = activity.clone();
        self.commit("add_activity", |state| {
            state.activities.push(activity);
            Some(())
        });
        created
    }

    pub fn update_activity(&mut self, id: &EntityId, update: ActivityUpdate) -> bool {
        self.commit("update_activity", |state| {
            let activity = state.activities.iter_mut().find(|a| &a.id == id)?;
            activity.apply(update);
            Some(())
        })
        .is_some()
    }

    pub fn delete_activity(&mut self, id: &EntityId) -> bool {
        self.commit("delete_activity", |state| {
            let position = state.activities.iter().position(|a| &a.id == id)?;
            state.activities.remove(position);
            Some(())
        })
        .is_some()
    }

    pub fn toggle_activity_complete(&mut self, id: &EntityId) -> bool {
        self.commit("toggle_activity_complete", |state| {
            let activity = state.activities.iter_mut().find(|a| &a.id == id)?;
            activity.toggle_complete();
            Some(())
        })
        .is_some()
    }

    // Data management

    /// Replace the whole state with `state` as given. Structural validation
    /// is the caller's job (see `models::parse_import`).
    pub fn import_data(&mut self, state: AppState) {
        info!(stats = ?state.stats(), "Importing data");
        self.state = Arc::new(state);
        self.persist();
    }

    /// Reset to a freshly seeded state
    pub fn clear_all_data(&mut self) {
        info!("Clearing all data");
        self.state = Arc::new(AppState::default());
        self.persist();
    }
}

/// Remove `link_id` from every bundle and activity
fn strip_link_references(state: &mut AppState, link_id: &EntityId) {
    for bundle in &mut state.bundles {
        if bundle.remove_link(link_id) {
            bundle.updated_at = chrono::Utc::now();
        }
    }
    for activity in &mut state.activities {
        if activity.remove_link(link_id) {
            activity.updated_at = chrono::Utc::now();
        }
    }
}

/// Missing order sorts as position 0
fn compare_order(a: Option<i64>, b: Option<i64>) -> Ordering {
    a.unwrap_or(0).cmp(&b.unwrap_or(0))
}
