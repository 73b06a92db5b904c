use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::EntityId;

/// A named, ordered selection of links that can be shared as one code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link_ids: Vec<EntityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Last share code generated for this bundle. Informational only; the
    /// share flow always re-encodes from the current links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_code: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewBundle {
    pub name: String,
    pub description: String,
    pub link_ids: Vec<EntityId>,
}

#[derive(Debug, Clone, Default)]
pub struct BundleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub link_ids: Option<Vec<EntityId>>,
}

impl Bundle {
    pub fn new(fields: NewBundle) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            name: fields.name,
            description: fields.description,
            link_ids: dedup_link_ids(fields.link_ids),
            created_at: now,
            updated_at: now,
            share_code: None,
        }
    }

    pub fn apply(&mut self, update: BundleUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(link_ids) = update.link_ids {
            self.link_ids = dedup_link_ids(link_ids);
        }
        self.updated_at = Utc::now();
    }

    /// Append a link unless it is already in the bundle
    pub fn add_link(&mut self, link_id: EntityId) -> bool {
        if self.link_ids.contains(&link_id) {
            return false;
        }
        self.link_ids.push(link_id);
        true
    }

    /// Drop a link reference; returns whether anything was removed
    pub fn remove_link(&mut self, link_id: &EntityId) -> bool {
        let before = self.link_ids.len();
        self.link_ids.retain(|id| id != link_id);
        self.link_ids.len() != before
    }
}

/// Keep the first occurrence of each id, preserving order
fn dedup_link_ids(ids: Vec<EntityId>) -> Vec<EntityId> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}
