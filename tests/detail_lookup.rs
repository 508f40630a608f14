use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use payments_core::classify::EntityType;
use payments_core::config::StoreConfig;
use payments_core::store::{
    AggregateStore, Detail, DetailCache, DetailError, DetailKind, Lookup, SnapshotConfig,
    SnapshotError, SnapshotInput, SnapshotManifest, SnapshotWriter,
};
use payments_core::types::TableKind;
use serde_json::json;
use tempfile::tempdir;

fn detail_input() -> SnapshotInput {
    SnapshotInput::new()
        .table(
            TableKind::States,
            vec![json!({"state": "IA", "amount": 3_150_000_000.0, "payments": 900_000})],
        )
        .detail(
            DetailKind::Recipient,
            "Smith Family LLC",
            json!({
                "name": "SMITH FAMILY LLC",
                "state": "IA",
                "amount": 1_250_000.0,
                "payments": 42,
                "yearly": [
                    {"year": 2019, "amount": 500_000.0, "payments": 20},
                    {"year": 2020, "amount": 750_000.0, "payments": 22}
                ],
                "programs": [{"program": "MFP", "amount": 1_250_000.0, "payments": 42}]
            }),
        )
        .detail(
            DetailKind::State,
            "IA",
            json!({
                "state": "IA",
                "name": "Iowa",
                "totalAmount": 3_150_000_000.0,
                "paymentCount": 900_000,
                "top_counties": [{"name": "Story", "key": "19169", "amount": 150_000_000.0}]
            }),
        )
        .detail(
            DetailKind::County,
            "1001",
            json!({
                "fips": "01001",
                "county": "Autauga",
                "state": "AL",
                "amount": 12_000_000.0,
                "payments": 3_100
            }),
        )
}

fn open_store(root: &Path) -> (AggregateStore, PathBuf) {
    let out = root.join("snapshot");
    SnapshotWriter::new(SnapshotConfig::v0())
        .write(detail_input(), &out)
        .expect("snapshot write failed");
    let store = AggregateStore::open(&out, StoreConfig::v0()).unwrap();
    (store, out)
}

#[test]
fn recipient_detail_found_by_name_or_slug() {
    let dir = tempdir().unwrap();
    let (store, _) = open_store(dir.path());

    for key in ["smith-family-llc", "Smith Family LLC", "SMITH FAMILY, LLC"] {
        let lookup = store.detail(DetailKind::Recipient, key).unwrap();
        match lookup {
            Lookup::Found(Detail::Recipient(detail)) => {
                assert_eq!(detail.payments, 42);
                assert_eq!(detail.yearly.len(), 2);
                assert_eq!(detail.entity_type(), EntityType::Llc);
            }
            other => panic!("expected recipient detail for {key:?}, got {other:?}"),
        }
    }
}

#[test]
fn state_and_county_keys_normalize() {
    let dir = tempdir().unwrap();
    let (store, _) = open_store(dir.path());

    let state = store.detail(DetailKind::State, "ia").unwrap();
    let state = state.found().expect("state detail");
    assert_eq!(state.kind(), DetailKind::State);
    assert_eq!(state.amount(), 3_150_000_000.0);

    // Numeric FIPS without the leading zero addresses the same county.
    assert!(store.detail(DetailKind::County, "1001").unwrap().is_found());
    assert!(store.detail(DetailKind::County, "01001").unwrap().is_found());
}

#[test]
fn invariant_unknown_key_is_not_found_not_error() {
    let dir = tempdir().unwrap();
    let (store, _) = open_store(dir.path());

    assert_eq!(
        store.detail(DetailKind::Recipient, "nobody-at-all").unwrap(),
        Lookup::NotFound
    );
    assert_eq!(store.detail(DetailKind::Recipient, "../../etc/passwd").unwrap(), Lookup::NotFound);
    assert_eq!(store.detail(DetailKind::State, "Iowa").unwrap(), Lookup::NotFound);
    assert_eq!(store.detail(DetailKind::County, "abc").unwrap(), Lookup::NotFound);
    assert_eq!(store.detail(DetailKind::Recipient, "").unwrap(), Lookup::NotFound);
}

#[test]
fn corrupt_detail_file_is_an_error() {
    let dir = tempdir().unwrap();
    let (store, root) = open_store(dir.path());
    fs::write(root.join("details/recipients/broken.json"), "{ not json").unwrap();

    assert!(matches!(
        store.detail(DetailKind::Recipient, "broken"),
        Err(DetailError::Corrupt { .. })
    ));
}

#[test]
fn detail_cache_memoizes_per_request() {
    let dir = tempdir().unwrap();
    let (store, root) = open_store(dir.path());

    let mut cache = DetailCache::new(&store);
    assert!(cache.is_empty());

    let first = cache.get(DetailKind::Recipient, "Smith Family LLC").unwrap();
    fs::remove_file(root.join("details/recipients/smith-family-llc.json")).unwrap();
    let second = cache.get(DetailKind::Recipient, "smith-family-llc").unwrap();

    match (first, second) {
        (Lookup::Found(a), Lookup::Found(b)) => assert!(Arc::ptr_eq(&a, &b)),
        other => panic!("expected two hits, got {other:?}"),
    }
    assert_eq!(cache.get(DetailKind::State, "TX").unwrap(), Lookup::NotFound);
    assert_eq!(cache.len(), 2);

    // A fresh request sees the deletion.
    let mut next_request = DetailCache::new(&store);
    assert_eq!(
        next_request.get(DetailKind::Recipient, "smith-family-llc").unwrap(),
        Lookup::NotFound
    );
}

#[test]
fn detail_kind_parses_singular_and_plural() {
    assert_eq!("recipient".parse::<DetailKind>().unwrap(), DetailKind::Recipient);
    assert_eq!("counties".parse::<DetailKind>().unwrap(), DetailKind::County);
    assert!(matches!("widgets".parse::<DetailKind>(), Err(DetailError::UnknownKind(_))));
}

#[test]
fn writer_rejects_unaddressable_detail_keys() {
    let dir = tempdir().unwrap();
    let input = SnapshotInput::new().detail(DetailKind::State, "Iowa", json!({}));
    let result = SnapshotWriter::new(SnapshotConfig::v0()).write(input, &dir.path().join("snap"));
    assert!(matches!(result, Err(SnapshotError::InvalidDetailKey { .. })));
}

#[test]
fn golden_detail_serialization_is_tagged() {
    let dir = tempdir().unwrap();
    let (store, _) = open_store(dir.path());

    let detail = store
        .detail(DetailKind::County, "01001")
        .unwrap()
        .into_option()
        .unwrap();
    let value = serde_json::to_value(&detail).unwrap();
    assert_eq!(value["kind"], "county");
    assert_eq!(value["fips"], "01001");
    assert_eq!(value["state"], "AL");
    assert_eq!(value["payments"], 3_100);
}

#[test]
fn manifest_counts_detail_records() {
    let dir = tempdir().unwrap();
    let (store, _) = open_store(dir.path());

    let details = &store.manifest().details;
    assert_eq!(details.get("recipients"), Some(&1));
    assert_eq!(details.get("states"), Some(&1));
    assert_eq!(details.get("counties"), Some(&1));
}

fn write_recipients(root: &Path, name: &str, records: &[(&str, f64)]) -> SnapshotManifest {
    let input = records.iter().fold(SnapshotInput::new(), |input, (key, amount)| {
        input.detail(
            DetailKind::Recipient,
            *key,
            json!({"name": key, "amount": amount, "payments": 1}),
        )
    });
    SnapshotWriter::new(SnapshotConfig::v0())
        .write(input, &root.join(name))
        .unwrap()
}

#[test]
fn invariant_colliding_detail_keys_are_counted_once() {
    let dir = tempdir().unwrap();
    let manifest = write_recipients(dir.path(), "snap", &[("Smith Farms", 10.0), ("SMITH-FARMS", 20.0)]);

    assert_eq!(manifest.details.get("recipients"), Some(&1));
    let files = fs::read_dir(dir.path().join("snap/details/recipients")).unwrap().count();
    assert_eq!(files, 1);

    let store = AggregateStore::open(dir.path().join("snap"), StoreConfig::v0()).unwrap();
    let detail = store.detail(DetailKind::Recipient, "smith farms").unwrap().into_option().unwrap();
    assert_eq!(detail.amount(), 20.0);
    assert_eq!(store.manifest().details, manifest.details);
}

#[test]
fn invariant_snapshot_version_covers_detail_records() {
    let dir = tempdir().unwrap();
    let first = write_recipients(dir.path(), "a", &[("Smith Farms", 10.0)]);
    let same = write_recipients(dir.path(), "b", &[("Smith Farms", 10.0)]);
    let changed = write_recipients(dir.path(), "c", &[("Smith Farms", 11.0)]);

    assert_eq!(first.snapshot_version, same.snapshot_version);
    assert_ne!(first.snapshot_version, changed.snapshot_version);

    let without = SnapshotWriter::new(SnapshotConfig::v0())
        .write(SnapshotInput::new(), &dir.path().join("d"))
        .unwrap();
    assert_ne!(first.snapshot_version, without.snapshot_version);
}
