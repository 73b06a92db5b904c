//! Referential guarantees of the store across sequences of operations

use super::common::{add_link, bundle_of, category_id};
use chrono::NaiveDate;
use linkbundle::StateStore;
use linkbundle::models::{EntityId, NewActivity, NewCategory};
use std::collections::HashSet;

fn no_dangling_links(store: &StateStore) {
    let state = store.state();
    let ids: HashSet<&EntityId> = state.links.iter().map(|l| &l.id).collect();
    for bundle in &state.bundles {
        assert!(bundle.link_ids.iter().all(|id| ids.contains(id)), "bundle {}", bundle.name);
    }
    for activity in &state.activities {
        assert!(
            activity.link_ids.iter().all(|id| ids.contains(id)),
            "activity {}",
            activity.title
        );
    }
}

#[test]
fn deleting_links_in_any_order_leaves_no_references() {
    let mut store = StateStore::in_memory();
    let links: Vec<_> = (0..5)
        .map(|i| add_link(&mut store, &format!("L{i}"), &format!("https://l{i}.test"), "Base"))
        .collect();
    let refs: Vec<_> = links.iter().collect();
    bundle_of(&mut store, "all", &refs);
    bundle_of(&mut store, "odd", &[refs[1], refs[3]]);
    let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    store.add_activity(NewActivity {
        link_ids: vec![links[3].id.clone(), links[0].id.clone()],
        ..NewActivity::new("check", date)
    });

    for index in [3, 0, 4, 1, 2] {
        assert!(store.delete_link(&links[index].id));
        no_dangling_links(&store);
    }
    assert!(store.state().bundles.iter().all(|b| b.link_ids.is_empty()));
    assert!(store.state().activities[0].link_ids.is_empty());
}

#[test]
fn deleted_category_never_stays_referenced() {
    let mut store = StateStore::in_memory();
    let sol = category_id(&store, "Solana");
    let other = category_id(&store, "Other");
    add_link(&mut store, "Jupiter", "https://jup.ag", "Solana");
    add_link(&mut store, "Tensor", "https://tensor.trade", "Solana");

    assert!(store.delete_category(&sol));
    assert!(store.state().links.iter().all(|l| l.category_id == other));

    // Removing every category leaves links pointing at nothing known
    let remaining: Vec<_> = store.state().categories.iter().map(|c| c.id.clone()).collect();
    for id in remaining {
        store.delete_category(&id);
        for link in &store.state().links {
            assert_ne!(link.category_id, id);
            assert!(
                link.category_id.is_empty() || store.state().category(&link.category_id).is_some()
            );
        }
    }
    assert!(store.state().categories.is_empty());
}

#[test]
fn generated_ids_are_unique_per_collection() {
    let mut store = StateStore::in_memory();
    let mut link_ids = HashSet::new();
    let mut category_ids: HashSet<_> =
        store.state().categories.iter().map(|c| c.id.clone()).collect();
    let mut bundle_ids = HashSet::new();
    let mut activity_ids = HashSet::new();
    let date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();

    for i in 0..50 {
        let link = add_link(&mut store, "same", "https://same.test", "Other");
        assert!(link_ids.insert(link.id.clone()));
        let category = store.add_category(NewCategory::new(format!("C{i}"), "#000000"));
        assert!(category_ids.insert(category.id));
        let bundle = bundle_of(&mut store, "same", &[&link]);
        assert!(bundle_ids.insert(bundle));
        let activity = store.add_activity(NewActivity::new("same", date));
        assert!(activity_ids.insert(activity.id));
    }
    assert_eq!(store.stats().bundles, 50);
    assert_eq!(store.stats().activities, 50);
}

#[test]
fn import_data_replaces_everything_verbatim() {
    let mut source = StateStore::from_state(linkbundle::models::AppState::empty());
    let category = source.add_category(NewCategory::new("Only", "#111111"));
    for i in 0..3 {
        source.add_link(linkbundle::models::NewLink::new(
            format!("Link {i}"),
            format!("https://{i}.test"),
            category.id.clone(),
        ));
    }
    let incoming = source.state().clone();

    let mut store = StateStore::in_memory();
    add_link(&mut store, "Old", "https://old.test", "Other");
    store.import_data(incoming.clone());

    let stats = store.stats();
    assert_eq!(
        (stats.links, stats.categories, stats.bundles, stats.activities),
        (3, 1, 0, 0)
    );
    assert_eq!(store.state(), &incoming);
}
