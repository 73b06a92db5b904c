use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};

use crate::models::{AppState, Bundle, EntityId, Link, ScheduledActivity, normalize_url};

/// Number of entries the upcoming panel shows
pub const DEFAULT_UPCOMING_LIMIT: usize = 5;

/// Criteria for narrowing the link list
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    /// Case-insensitive substring matched against title, description and url
    pub query: String,
    pub category_id: Option<EntityId>,
    pub highlighted_only: bool,
}

impl LinkFilter {
    pub fn matches(&self, link: &Link) -> bool {
        let query = self.query.trim().to_lowercase();
        let matches_query = query.is_empty()
            || link.title.to_lowercase().contains(&query)
            || link.description.to_lowercase().contains(&query)
            || link.url.to_lowercase().contains(&query);
        let matches_category = self
            .category_id
            .as_ref()
            .is_none_or(|category| &link.category_id == category);
        let matches_highlight = !self.highlighted_only || link.is_highlighted;

        matches_query && matches_category && matches_highlight
    }
}

/// Links passing `filter`, ordered by their `order` position. Links without
/// one come after the ordered ones, in insertion order.
pub fn filter_links<'a>(state: &'a AppState, filter: &LinkFilter) -> Vec<&'a Link> {
    let mut links: Vec<&Link> = state.links.iter().filter(|l| filter.matches(l)).collect();
    links.sort_by(|a, b| match (a.order, b.order) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    links
}

/// Untimed activities sort after timed ones
fn compare_time(a: Option<NaiveTime>, b: Option<NaiveTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Activities grouped per calendar day, each day sorted by time
pub fn activities_by_date(state: &AppState) -> BTreeMap<NaiveDate, Vec<&ScheduledActivity>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&ScheduledActivity>> = BTreeMap::new();
    for activity in &state.activities {
        by_date.entry(activity.date).or_default().push(activity);
    }
    for day in by_date.values_mut() {
        day.sort_by(|a, b| compare_time(a.time, b.time));
    }
    by_date
}

/// Open activities from `today` on, soonest first
pub fn upcoming_activities(
    state: &AppState,
    today: NaiveDate,
    limit: usize,
) -> Vec<&ScheduledActivity> {
    let mut upcoming: Vec<_> = state
        .activities
        .iter()
        .filter(|a| a.date >= today && !a.is_completed)
        .collect();
    upcoming.sort_by(|a, b| a.date.cmp(&b.date).then(compare_time(a.time, b.time)));
    upcoming.truncate(limit);
    upcoming
}

fn resolve<'a>(state: &'a AppState, ids: &[EntityId]) -> Vec<&'a Link> {
    ids.iter().filter_map(|id| state.link(id)).collect()
}

pub fn links_for_activity<'a>(state: &'a AppState, activity: &ScheduledActivity) -> Vec<&'a Link> {
    resolve(state, &activity.link_ids)
}

pub fn links_for_bundle<'a>(state: &'a AppState, bundle: &Bundle) -> Vec<&'a Link> {
    resolve(state, &bundle.link_ids)
}

/// Whether a link with the same (trimmed, case-folded) URL is stored
pub fn is_duplicate_url(state: &AppState, url: &str) -> bool {
    let url = normalize_url(url);
    state.links.iter().any(|link| link.normalized_url() == url)
}
