use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use crate::keys::KeyEncoder;
use crate::lakehouse::LakehouseDef;
use crate::namespace::{NamespaceReader, NamespaceWriter};
use crate::object_store::{ObjectStore, ObjectStoreConfig};
use crate::serialization::decode_node;
use crate::test_utils::{get_test_catalog, get_test_lakehouse};
use crate::transaction::IsolationLevel;
use crate::version::RootVersion;
use crate::{open_catalog, tree, CatalogConfig, CatalogError};

#[test]
fn open_catalog_from_a_default_config_works_end_to_end() {
    let catalog = open_catalog(&CatalogConfig::default()).unwrap();
    catalog.create_lakehouse(&LakehouseDef::default()).unwrap();
    let txn = catalog.begin_transaction().unwrap();
    assert_eq!(txn.transaction().beginning_version(), RootVersion(0));
}

#[test]
fn open_catalog_rejects_an_invalid_config() {
    let config = CatalogConfig { object_store: ObjectStoreConfig { url: String::new() } };
    assert_matches!(open_catalog(&config), Err(CatalogError::InvalidConfig(_)));
}

#[test]
fn begin_requires_an_initialized_lakehouse() {
    let (catalog, _store) = get_test_catalog();
    assert_matches!(catalog.begin_transaction(), Err(CatalogError::Uninitialized));
}

#[test]
fn create_lakehouse_publishes_an_empty_root_zero() {
    let (catalog, store) = get_test_catalog();
    catalog.create_lakehouse(&LakehouseDef::default()).unwrap();
    assert!(store.exists(&tree::root_path(RootVersion(0))).unwrap());

    let txn = catalog.begin_transaction().unwrap();
    assert_eq!(txn.transaction().beginning_version(), RootVersion(0));
    assert_eq!(txn.transaction().running_root().row_count(), 0);
}

#[test]
fn create_lakehouse_twice_fails() {
    let (catalog, _store) = get_test_lakehouse();
    assert_matches!(
        catalog.create_lakehouse(&LakehouseDef::default()),
        Err(CatalogError::LakehouseAlreadyExists)
    );
}

#[test]
fn commit_publishes_the_running_root_at_the_successor_version() {
    let (catalog, store) = get_test_lakehouse();
    let txn =
        catalog.begin_transaction().unwrap().create_namespace("sales", b"def").unwrap();
    let expected = txn.transaction().running_root().clone();

    let committed = txn.commit().unwrap();
    assert_eq!(committed.committed_version(), RootVersion(1));
    assert_eq!(committed.committed_root(), &expected);
    assert_eq!(committed.committed_root().version(), Some(RootVersion(1)));

    let bytes = store.read(&tree::root_path(RootVersion(1))).unwrap();
    assert_eq!(decode_node(&bytes).unwrap(), expected);
}

#[test]
fn an_unmutated_transaction_has_nothing_to_commit() {
    let (catalog, _store) = get_test_lakehouse();
    let txn = catalog.begin_transaction().unwrap();
    assert_matches!(txn.commit(), Err(CatalogError::NothingToCommit));
}

#[test]
fn concurrent_transactions_race_for_the_next_version() {
    let (catalog, _store) = get_test_lakehouse();
    let t1 = catalog.begin_transaction().unwrap();
    let t2 = catalog.begin_transaction().unwrap();

    let committed = t1.create_namespace("a", b"def-a").unwrap().commit().unwrap();
    assert_eq!(committed.committed_version(), RootVersion(1));

    // t2 began at version 0 as well, so its commit races for version 1 and
    // loses. The engine never rebases; replaying on a fresh snapshot works.
    let t2 = t2.create_namespace("b", b"def-b").unwrap();
    assert_matches!(
        t2.commit(),
        Err(CatalogError::CommitConflict { version }) if version == RootVersion(1)
    );

    let replay = catalog.begin_transaction().unwrap();
    assert_eq!(replay.transaction().beginning_version(), RootVersion(1));
    let committed = replay.create_namespace("b", b"def-b").unwrap().commit().unwrap();
    assert_eq!(committed.committed_version(), RootVersion(2));

    let txn = catalog.begin_transaction().unwrap();
    assert_eq!(txn.show_namespaces().unwrap(), vec!["a", "b"]);
}

#[test]
fn transactions_are_snapshot_isolated() {
    let (catalog, _store) = get_test_lakehouse();
    let observer = catalog.begin_transaction().unwrap();
    let writer =
        catalog.begin_transaction().unwrap().create_namespace("sales", b"def").unwrap();

    let key = KeyEncoder::new(&LakehouseDef::default()).namespace_key("sales").unwrap();
    assert!(writer.transaction().running_root().contains_key(&key));
    assert!(!writer.transaction().beginning_root().contains_key(&key));
    assert!(!observer.transaction().running_root().contains_key(&key));

    writer.commit().unwrap();
    // The observer still reads its begin snapshot.
    assert!(!observer.namespace_exists("sales").unwrap());
}

#[test]
fn a_new_transaction_observes_the_latest_commit() {
    let (catalog, _store) = get_test_lakehouse();
    catalog
        .begin_transaction()
        .unwrap()
        .create_namespace("sales", b"def")
        .unwrap()
        .commit()
        .unwrap();
    let txn = catalog.begin_transaction().unwrap();
    assert_eq!(txn.transaction().beginning_version(), RootVersion(1));
    assert!(txn.namespace_exists("sales").unwrap());
}

#[test]
fn transaction_records_carry_identity_and_options() {
    let (catalog, _store) = get_test_lakehouse();
    let txn = catalog.begin_transaction().unwrap();
    let record = txn.transaction();
    assert!(!record.id().is_empty());
    assert_eq!(record.isolation_level(), IsolationLevel::Snapshot);
    assert_eq!(record.beginning_version(), RootVersion(0));
    assert_eq!(record.beginning_root().version(), Some(RootVersion(0)));

    let other = catalog.begin_transaction().unwrap();
    assert_ne!(record.id(), other.transaction().id());
}
