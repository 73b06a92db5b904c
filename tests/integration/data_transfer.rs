//! Export files written by one collection restore another

use super::common::{TempStore, add_link, bundle_of};
use linkbundle::models::{ExportFormat, export_to_file, import_from_file};
use std::fs;

#[test]
fn json_export_restores_into_fresh_store() {
    let mut source = TempStore::new();
    let a = add_link(&mut source.store, "Arbiscan", "https://arbiscan.io", "Arbitrum");
    let b = add_link(&mut source.store, "GMX", "https://gmx.io", "Arbitrum");
    bundle_of(&mut source.store, "Arb", &[&a, &b]);

    let path = source.dir.path().join("bundle-backup.json");
    export_to_file(source.store.state(), &path, ExportFormat::Json).unwrap();

    let mut target = TempStore::new();
    target.store.import_data(import_from_file(&path).unwrap());

    assert_eq!(target.store.state(), source.store.state());
    assert_eq!(target.reopen().state(), source.store.state());
}

#[test]
fn yaml_export_is_accepted_by_import() {
    let mut source = TempStore::new();
    add_link(&mut source.store, "Snowtrace", "https://snowtrace.io", "Avalanche");
    let path = source.dir.path().join("bundle-backup.yaml");
    export_to_file(source.store.state(), &path, ExportFormat::Yaml).unwrap();

    assert_eq!(&import_from_file(&path).unwrap(), source.store.state());
}

#[test]
fn rejected_import_leaves_state_untouched() {
    let mut temp = TempStore::new();
    add_link(&mut temp.store, "Basescan", "https://basescan.org", "Base");
    let before = temp.store.snapshot();

    let path = temp.dir.path().join("broken.json");
    fs::write(&path, r#"{"links": [], "categories": []}"#).unwrap();

    let err = import_from_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("bundles"));
    assert_eq!(temp.store.state(), &*before);
}
