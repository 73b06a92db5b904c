use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: EntityId,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    pub category_id: EntityId,
    #[serde(default)]
    pub is_highlighted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_media_type: Option<SocialMediaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Community platforms a link can be tagged with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialMediaType {
    Telegram,
    Discord,
    X,
}

static TELEGRAM_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://(t\.me|telegram\.me)").expect("valid regex"));
static DISCORD_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://(discord\.(gg|com)|discordapp\.com)").expect("valid regex")
});
static X_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://(x\.com|twitter\.com)").expect("valid regex"));

impl SocialMediaType {
    pub const ALL: [SocialMediaType; 3] = [
        SocialMediaType::Telegram,
        SocialMediaType::Discord,
        SocialMediaType::X,
    ];

    /// Guess the platform from a link URL
    pub fn detect(url: &str) -> Option<Self> {
        let url = url.trim();
        Self::ALL
            .into_iter()
            .find(|platform| platform.url_pattern().is_match(url))
    }

    fn url_pattern(&self) -> &'static Regex {
        match self {
            SocialMediaType::Telegram => &*TELEGRAM_URL,
            SocialMediaType::Discord => &*DISCORD_URL,
            SocialMediaType::X => &*X_URL,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SocialMediaType::Telegram => "Telegram",
            SocialMediaType::Discord => "Discord",
            SocialMediaType::X => "X (Twitter)",
        }
    }

    /// Brand color as a hex string
    pub fn color(&self) -> &'static str {
        match self {
            SocialMediaType::Telegram => "#0088cc",
            SocialMediaType::Discord => "#5865F2",
            SocialMediaType::X => "#000000",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "telegram" | "tg" => Some(SocialMediaType::Telegram),
            "discord" => Some(SocialMediaType::Discord),
            "x" | "twitter" => Some(SocialMediaType::X),
            _ => None,
        }
    }
}

/// Fields supplied by the caller when creating a link
#[derive(Debug, Clone, Default)]
pub struct NewLink {
    pub title: String,
    pub url: String,
    pub description: String,
    pub category_id: EntityId,
    pub is_highlighted: bool,
    pub social_media_type: Option<SocialMediaType>,
    pub order: Option<i64>,
}

impl NewLink {
    pub fn new(title: impl Into<String>, url: impl Into<String>, category_id: EntityId) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            category_id,
            ..Self::default()
        }
    }
}

/// Partial update for a link. `None` leaves a field untouched; the nested
/// options clear a field with `Some(None)`.
#[derive(Debug, Clone, Default)]
pub struct LinkUpdate {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<EntityId>,
    pub is_highlighted: Option<bool>,
    pub social_media_type: Option<Option<SocialMediaType>>,
    pub order: Option<Option<i64>>,
}

impl Link {
    pub fn new(fields: NewLink) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            title: fields.title,
            url: fields.url,
            description: fields.description,
            category_id: fields.category_id,
            is_highlighted: fields.is_highlighted,
            social_media_type: fields.social_media_type,
            order: fields.order,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: LinkUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(url) = update.url {
            self.url = url;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(category_id) = update.category_id {
            self.category_id = category_id;
        }
        if let Some(is_highlighted) = update.is_highlighted {
            self.is_highlighted = is_highlighted;
        }
        if let Some(social_media_type) = update.social_media_type {
            self.social_media_type = social_media_type;
        }
        if let Some(order) = update.order {
            self.order = order;
        }
        self.touch();
    }

    pub fn toggle_highlight(&mut self) {
        self.is_highlighted = !self.is_highlighted;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// URL form used for duplicate detection
    pub fn normalized_url(&self) -> String {
        normalize_url(&self.url)
    }
}

pub fn normalize_url(url: &str) -> String {
    url.trim().to_lowercase()
}
