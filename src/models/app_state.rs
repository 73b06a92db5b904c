use serde::{Deserialize, Serialize};

use crate::models::{Bundle, Category, EntityId, Link, ScheduledActivity, default_categories};

/// The whole persisted unit: every collection the application owns.
///
/// It is always read and written as one value; there is no per-entity
/// storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub links: Vec<Link>,
    pub categories: Vec<Category>,
    pub bundles: Vec<Bundle>,
    pub activities: Vec<ScheduledActivity>,
}

impl Default for AppState {
    /// Fresh state: no user data, default categories with new ids
    fn default() -> Self {
        Self {
            links: Vec::new(),
            categories: default_categories(),
            bundles: Vec::new(),
            activities: Vec::new(),
        }
    }
}

/// Entity counts, as shown on the data management screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataStats {
    pub links: usize,
    pub categories: usize,
    pub bundles: usize,
    pub activities: usize,
}

impl AppState {
    pub fn empty() -> Self {
        Self {
            links: Vec::new(),
            categories: Vec::new(),
            bundles: Vec::new(),
            activities: Vec::new(),
        }
    }

    pub fn stats(&self) -> DataStats {
        DataStats {
            links: self.links.len(),
            categories: self.categories.len(),
            bundles: self.bundles.len(),
            activities: self.activities.len(),
        }
    }

    pub fn link(&self, id: &EntityId) -> Option<&Link> {
        self.links.iter().find(|link| &link.id == id)
    }

    pub fn category(&self, id: &EntityId) -> Option<&Category> {
        self.categories.iter().find(|category| &category.id == id)
    }

    pub fn bundle(&self, id: &EntityId) -> Option<&Bundle> {
        self.bundles.iter().find(|bundle| &bundle.id == id)
    }

    pub fn activity(&self, id: &EntityId) -> Option<&ScheduledActivity> {
        self.activities.iter().find(|activity| &activity.id == id)
    }

    /// Category new and orphaned links go to: "Other" if present, else the
    /// first category. `excluding` is skipped, for use while it is being
    /// deleted.
    pub fn fallback_category(&self, excluding: Option<&EntityId>) -> Option<&Category> {
        let candidates = || {
            self.categories
                .iter()
                .filter(move |category| Some(&category.id) != excluding)
        };

        candidates()
            .find(|category| category.is_fallback())
            .or_else(|| candidates().next())
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        let name = name.trim().to_lowercase();
        self.categories
            .iter()
            .find(|category| category.name.to_lowercase() == name)
    }
}
