use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::EntityId;

/// Name of the category links fall back to when theirs is deleted
pub const FALLBACK_CATEGORY_NAME: &str = "Other";

/// Categories every fresh state starts with: (name, color, icon)
pub const DEFAULT_CATEGORIES: [(&str, &str, &str); 8] = [
    ("Ethereum", "#627EEA", "ethereum"),
    ("Bitcoin", "#F7931A", "bitcoin"),
    ("Solana", "#00FFA3", "solana"),
    ("Polygon", "#8247E5", "polygon"),
    ("Arbitrum", "#28A0F0", "arbitrum"),
    ("Base", "#0052FF", "base"),
    ("Avalanche", "#E84142", "avalanche"),
    (FALLBACK_CATEGORY_NAME, "#6B7280", "other"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: EntityId,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            icon: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<Option<String>>,
}

impl Category {
    pub fn new(fields: NewCategory) -> Self {
        Self {
            id: EntityId::generate(),
            name: fields.name,
            color: fields.color,
            icon: fields.icon,
            created_at: Utc::now(),
        }
    }

    /// Categories carry no updatedAt, so an update only merges fields.
    pub fn apply(&mut self, update: CategoryUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(color) = update.color {
            self.color = color;
        }
        if let Some(icon) = update.icon {
            self.icon = icon;
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.name == FALLBACK_CATEGORY_NAME
    }
}

/// Build the default category set with fresh ids
pub fn default_categories() -> Vec<Category> {
    let now = Utc::now();
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, color, icon)| Category {
            id: EntityId::generate(),
            name: name.to_string(),
            color: color.to_string(),
            icon: Some(icon.to_string()),
            created_at: now,
        })
        .collect()
}
