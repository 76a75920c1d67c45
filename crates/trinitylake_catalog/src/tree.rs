#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;

use std::io::Write;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::keys::LAKEHOUSE_DEF_KEY;
use crate::lakehouse::LakehouseDef;
use crate::node::TreeNode;
use crate::object_store::{ObjectStore, ObjectStoreError};
use crate::serialization::{decode_node, encode_node, NodeDecodeError};
use crate::version::RootVersion;
use crate::{CatalogError, CatalogResult};

// Storage layout. Root paths are deterministic so versions can be probed and
// listed; descriptor blob paths embed a fresh uuid so writes never conflict
// and a blob, once referenced, is never overwritten.
pub(crate) const ROOT_DIR: &str = "root";
pub(crate) const LAKEHOUSE_DIR: &str = "lakehouse";
pub(crate) const NAMESPACE_DIR: &str = "ns";
pub(crate) const TABLE_DIR: &str = "tbl";

pub(crate) fn root_path(version: RootVersion) -> String {
    format!("{ROOT_DIR}/{version}")
}

pub(crate) fn new_lakehouse_def_path() -> String {
    format!("{LAKEHOUSE_DIR}/{}", Uuid::new_v4())
}

pub(crate) fn new_namespace_def_path(namespace: &str) -> String {
    format!("{NAMESPACE_DIR}/{namespace}/{}", Uuid::new_v4())
}

pub(crate) fn new_table_def_path(namespace: &str, table: &str) -> String {
    format!("{TABLE_DIR}/{namespace}/{table}/{}", Uuid::new_v4())
}

fn version_from_path(path: &str) -> Option<RootVersion> {
    RootVersion::from_file_name(path.strip_prefix(ROOT_DIR)?.strip_prefix('/')?)
}

/// Finds the highest published root version and reads its node.
/// Fails with [`CatalogError::Uninitialized`] when no root exists.
pub(crate) fn find_latest_root(
    store: &dyn ObjectStore,
) -> CatalogResult<(RootVersion, TreeNode)> {
    let listing = store.list(&format!("{ROOT_DIR}/"))?;
    // Listings are only eventually consistent: a root published moments ago
    // may be missing, including root 0 itself. Take the listed maximum as a
    // starting point and probe forward with point reads; with nothing listed,
    // probe from version 0.
    let mut latest = listing.iter().filter_map(|path| version_from_path(path)).max();
    let mut probe = match latest {
        Some(version) => version.next(),
        None => RootVersion(0),
    };
    while store.exists(&root_path(probe))? {
        latest = Some(probe);
        probe = probe.next();
    }
    let latest = latest.ok_or(CatalogError::Uninitialized)?;
    debug!("Latest root is version {latest}.");
    let node = read_root(store, latest)?;
    Ok((latest, node))
}

/// Reads and decodes the root node of a version. The returned node carries the
/// version it was read from.
pub(crate) fn read_root(store: &dyn ObjectStore, version: RootVersion) -> CatalogResult<TreeNode> {
    let path = root_path(version);
    let bytes = store.read(&path)?;
    let node = decode_node(&bytes).map_err(|err| {
        warn!("Root node {path} is corrupt: {err}");
        CatalogError::from(err)
    })?;
    Ok(node.with_version(version))
}

/// Serializes the node and conditionally creates it as the root of `version`.
/// Surfaces [`ObjectStoreError::AlreadyExists`] when the version is already
/// published; callers translate that into their own conflict error.
pub(crate) fn write_root(
    store: &dyn ObjectStore,
    version: RootVersion,
    node: &TreeNode,
) -> CatalogResult<()> {
    let bytes = encode_node(node)?;
    let mut handle = store.start_atomic_write(&root_path(version))?;
    handle.write_all(&bytes).map_err(ObjectStoreError::from)?;
    handle.complete()?;
    Ok(())
}

/// Follows the lakehouse-definition pointer of the node and reads the
/// descriptor blob.
pub(crate) fn read_lakehouse_def(
    store: &dyn ObjectStore,
    node: &TreeNode,
) -> CatalogResult<LakehouseDef> {
    let path = node.lakehouse_def_path().ok_or(CatalogError::CorruptNode(
        NodeDecodeError::MissingReservedRow { key: LAKEHOUSE_DEF_KEY },
    ))?;
    let bytes = store.read(path)?;
    Ok(LakehouseDef::from_bytes(&bytes)?)
}
