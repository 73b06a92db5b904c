//! Share a bundle from one collection and import it into another

use super::common::{TempStore, add_link, bundle_of, category_id};
use linkbundle::models::{
    AppState, ShareCodeError, decode_share_code, extract_share_code, share_url,
};
use linkbundle::{ImportError, SharedImportOptions, StateStore};

#[test]
fn share_code_carries_bundle_links_in_order() {
    let mut temp = TempStore::new();
    let a = add_link(&mut temp.store, "Uniswap", "https://uniswap.org", "Ethereum");
    let b = add_link(&mut temp.store, "Curve", "https://curve.fi", "Ethereum");
    let bundle = bundle_of(&mut temp.store, "DEXes", &[&b, &a]);

    let code = temp.store.generate_bundle_share_code(&bundle).unwrap();
    let decoded = decode_share_code(&code).unwrap();

    assert_eq!(decoded.name, "DEXes");
    let pairs: Vec<_> = decoded
        .links
        .iter()
        .map(|l| (l.title.as_str(), l.url.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![("Curve", "https://curve.fi"), ("Uniswap", "https://uniswap.org")]
    );

    // The cached code is saved with the bundle
    let reopened = temp.reopen();
    assert_eq!(
        reopened.state().bundle(&bundle).unwrap().share_code.as_deref(),
        Some(code.as_str())
    );
}

#[test]
fn url_round_trip_into_another_collection() {
    let mut sender = TempStore::new();
    let a = add_link(&mut sender.store, "Mempool", "https://mempool.space", "Bitcoin");
    let b = add_link(&mut sender.store, "Ordinals", "https://ordinals.com", "Bitcoin");
    let bundle = bundle_of(&mut sender.store, "BTC tools", &[&a, &b]);
    let code = sender.store.generate_bundle_share_code(&bundle).unwrap();
    let url = share_url("https://links.example.com/", &code);

    let mut receiver = TempStore::new();
    add_link(&mut receiver.store, "Mempool", " HTTPS://MEMPOOL.SPACE ", "Bitcoin");

    let shared = decode_share_code(&extract_share_code(&url)).unwrap();
    let added = receiver
        .store
        .import_shared_bundle(&shared, &SharedImportOptions::default())
        .unwrap();

    assert_eq!(added, 1);
    let other = category_id(&receiver.store, "Other");
    let imported = receiver.store.state().links.last().unwrap();
    assert_eq!(imported.title, "Ordinals");
    assert_eq!(imported.category_id, other);
    assert_eq!(receiver.reopen().stats().links, 2);
}

#[test]
fn importing_with_duplicates_included() {
    let mut temp = TempStore::new();
    let a = add_link(&mut temp.store, "Aave", "https://aave.com", "Ethereum");
    let bundle = bundle_of(&mut temp.store, "Lending", &[&a]);
    let shared = temp.store.shared_bundle(&bundle).unwrap();

    let options = SharedImportOptions {
        selection: None,
        include_duplicates: true,
    };
    assert_eq!(temp.store.import_shared_bundle(&shared, &options), Ok(1));
    assert_eq!(temp.store.stats().links, 2);
}

#[test]
fn import_without_categories_is_refused() {
    let mut store = StateStore::from_state(AppState::empty());
    let mut temp = TempStore::new();
    let a = add_link(&mut temp.store, "Aave", "https://aave.com", "Ethereum");
    let bundle = bundle_of(&mut temp.store, "Lending", &[&a]);
    let shared = temp.store.shared_bundle(&bundle).unwrap();

    assert_eq!(
        store.import_shared_bundle(&shared, &SharedImportOptions::default()),
        Err(ImportError::NoCategories)
    );
    assert!(store.state().links.is_empty());
}

#[test]
fn garbage_codes_fail_without_panicking() {
    for input in ["", "   ", "@@@", "bm90IGpzb24=", "JTdCJTdE"] {
        assert!(decode_share_code(input).is_err(), "{input:?} should fail");
    }
    assert!(matches!(decode_share_code(""), Err(ShareCodeError::Empty)));
}
