use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledActivity {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Calendar day, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Optional time of day, serialized as `HH:MM`
    #[serde(default, with = "hh_mm", skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub link_ids: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub link_ids: Vec<EntityId>,
    pub color: Option<String>,
    pub is_completed: bool,
}

impl NewActivity {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            date,
            time: None,
            link_ids: Vec::new(),
            color: None,
            is_completed: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActivityUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<Option<NaiveTime>>,
    pub link_ids: Option<Vec<EntityId>>,
    pub color: Option<Option<String>>,
    pub is_completed: Option<bool>,
}

impl ScheduledActivity {
    pub fn new(fields: NewActivity) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            title: fields.title,
            description: fields.description,
            date: fields.date,
            time: fields.time,
            link_ids: fields.link_ids,
            color: fields.color,
            is_completed: fields.is_completed,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: ActivityUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(time) = update.time {
            self.time = time;
        }
        if let Some(link_ids) = update.link_ids {
            self.link_ids = link_ids;
        }
        if let Some(color) = update.color {
            self.color = color;
        }
        if let Some(is_completed) = update.is_completed {
            self.is_completed = is_completed;
        }
        self.updated_at = Utc::now();
    }

    pub fn toggle_complete(&mut self) {
        self.is_completed = !self.is_completed;
        self.updated_at = Utc::now();
    }

    pub fn remove_link(&mut self, link_id: &EntityId) -> bool {
        let before = self.link_ids.len();
        self.link_ids.retain(|id| id != link_id);
        self.link_ids.len() != before
    }
}

/// Parse a `HH:MM` (or `HH:MM:SS`) time of day
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(time) => serializer.serialize_str(&time.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_time(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid time of day: {raw}"))),
        }
    }
}
