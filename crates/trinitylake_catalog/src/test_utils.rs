#![allow(clippy::unwrap_used)]
//! Test utilities for the catalog crate users.

use std::sync::Arc;

use crate::lakehouse::LakehouseDef;
use crate::object_store::in_memory::InMemoryObjectStore;
use crate::Catalog;

/// Returns a [`Catalog`] over a fresh in-memory object store, plus the store
/// itself so tests can inspect raw objects.
pub fn get_test_catalog() -> (Catalog, InMemoryObjectStore) {
    let store = InMemoryObjectStore::new();
    (Catalog::new(Arc::new(store.clone())), store)
}

/// Returns a [`Catalog`] whose lakehouse was created with the default
/// descriptor, plus the backing in-memory store.
pub fn get_test_lakehouse() -> (Catalog, InMemoryObjectStore) {
    let (catalog, store) = get_test_catalog();
    catalog.create_lakehouse(&LakehouseDef::default()).unwrap();
    (catalog, store)
}
