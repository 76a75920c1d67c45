use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use crate::keys::KeyEncoder;
use crate::lakehouse::LakehouseDef;
use crate::namespace::{NamespaceReader, NamespaceWriter};
use crate::object_store::ObjectStore;
use crate::test_utils::get_test_lakehouse;
use crate::CatalogError;

#[test]
fn a_fresh_lakehouse_has_no_namespaces() {
    let (catalog, _store) = get_test_lakehouse();
    let txn = catalog.begin_transaction().unwrap();
    assert_eq!(txn.show_namespaces().unwrap(), Vec::<String>::new());
}

#[test]
fn create_then_describe_across_transactions() {
    let (catalog, _store) = get_test_lakehouse();
    catalog
        .begin_transaction()
        .unwrap()
        .create_namespace("sales", b"the definition")
        .unwrap()
        .commit()
        .unwrap();

    let txn = catalog.begin_transaction().unwrap();
    assert_eq!(txn.describe_namespace("sales").unwrap(), b"the definition");
    assert_eq!(txn.show_namespaces().unwrap(), vec!["sales"]);
}

#[test]
fn a_transaction_reads_its_own_writes() {
    let (catalog, _store) = get_test_lakehouse();
    let txn = catalog
        .begin_transaction()
        .unwrap()
        .create_namespace("sales", b"the definition")
        .unwrap();
    assert!(txn.namespace_exists("sales").unwrap());
    assert_eq!(txn.describe_namespace("sales").unwrap(), b"the definition");
}

#[test]
fn create_twice_in_one_transaction_fails() {
    let (catalog, _store) = get_test_lakehouse();
    let txn =
        catalog.begin_transaction().unwrap().create_namespace("sales", b"def").unwrap();
    assert_matches!(
        txn.create_namespace("sales", b"def"),
        Err(CatalogError::NamespaceAlreadyExists { namespace }) if namespace == "sales"
    );
}

#[test]
fn existence_is_non_throwing() {
    let (catalog, _store) = get_test_lakehouse();
    let txn = catalog.begin_transaction().unwrap();
    assert!(!txn.namespace_exists("absent").unwrap());
    // Names the encoder rejects cannot exist either.
    assert!(!txn.namespace_exists("a/b").unwrap());
    assert!(!txn.namespace_exists("").unwrap());
}

#[test]
fn describe_missing_fails() {
    let (catalog, _store) = get_test_lakehouse();
    let txn = catalog.begin_transaction().unwrap();
    assert_matches!(
        txn.describe_namespace("absent"),
        Err(CatalogError::NamespaceNotFound { namespace }) if namespace == "absent"
    );
}

#[test]
fn alter_swings_the_pointer_and_keeps_the_old_blob() {
    let (catalog, store) = get_test_lakehouse();
    catalog
        .begin_transaction()
        .unwrap()
        .create_namespace("sales", b"v1")
        .unwrap()
        .commit()
        .unwrap();
    let key = KeyEncoder::new(&LakehouseDef::default()).namespace_key("sales").unwrap();

    let txn = catalog.begin_transaction().unwrap();
    let old_path = txn.transaction().running_root().get(&key).unwrap().to_owned();
    let txn = txn.alter_namespace("sales", b"v2").unwrap();
    let new_path = txn.transaction().running_root().get(&key).unwrap().to_owned();
    assert_ne!(old_path, new_path);
    txn.commit().unwrap();

    // The old blob is immutable and still readable.
    assert_eq!(store.read(&old_path).unwrap(), b"v1");
    let txn = catalog.begin_transaction().unwrap();
    assert_eq!(txn.describe_namespace("sales").unwrap(), b"v2");
}

#[test]
fn alter_missing_fails() {
    let (catalog, _store) = get_test_lakehouse();
    let txn = catalog.begin_transaction().unwrap();
    assert_matches!(
        txn.alter_namespace("absent", b"def"),
        Err(CatalogError::NamespaceNotFound { .. })
    );
}

#[test]
fn drop_removes_the_namespace() {
    let (catalog, _store) = get_test_lakehouse();
    catalog
        .begin_transaction()
        .unwrap()
        .create_namespace("sales", b"def")
        .unwrap()
        .commit()
        .unwrap();

    catalog.begin_transaction().unwrap().drop_namespace("sales").unwrap().commit().unwrap();

    let txn = catalog.begin_transaction().unwrap();
    assert!(!txn.namespace_exists("sales").unwrap());
    assert_eq!(txn.show_namespaces().unwrap(), Vec::<String>::new());
}

#[test]
fn drop_missing_fails() {
    let (catalog, _store) = get_test_lakehouse();
    let txn = catalog.begin_transaction().unwrap();
    assert_matches!(
        txn.drop_namespace("absent"),
        Err(CatalogError::NamespaceNotFound { .. })
    );
}

#[test]
fn show_namespaces_is_in_key_order() {
    let (catalog, _store) = get_test_lakehouse();
    catalog
        .begin_transaction()
        .unwrap()
        .create_namespace("b", b"")
        .unwrap()
        .create_namespace("a", b"")
        .unwrap()
        .create_namespace("c", b"")
        .unwrap()
        .commit()
        .unwrap();

    let txn = catalog.begin_transaction().unwrap();
    assert_eq!(txn.show_namespaces().unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn invalid_names_are_rejected() {
    let (catalog, _store) = get_test_lakehouse();
    let txn = catalog.begin_transaction().unwrap();
    assert_matches!(
        txn.create_namespace("a/b", b"def"),
        Err(CatalogError::InvalidName { .. })
    );
}
