#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;

use std::collections::BTreeMap;

use crate::version::RootVersion;

/// A single snapshot of the catalog tree.
///
/// A node owns a flat table of user rows mapping encoded keys to the storage
/// paths of definition blobs, plus the pointer to the lakehouse descriptor.
/// Nodes are value types: cloning yields an independent copy sharing no
/// mutable state, which is what keeps concurrently running transactions
/// isolated from each other.
#[derive(Clone, Debug, Default)]
pub struct TreeNode {
    lakehouse_def_path: Option<String>,
    rows: BTreeMap<String, String>,
    version: Option<RootVersion>,
    dirty: bool,
}

impl TreeNode {
    /// Returns an empty node with no version and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(lakehouse_def_path: String, rows: BTreeMap<String, String>) -> Self {
        Self { lakehouse_def_path: Some(lakehouse_def_path), rows, version: None, dirty: false }
    }

    /// The storage path of the lakehouse descriptor blob. Set on every root
    /// from version 0 onward.
    pub fn lakehouse_def_path(&self) -> Option<&str> {
        self.lakehouse_def_path.as_deref()
    }

    pub(crate) fn set_lakehouse_def_path(&mut self, path: String) {
        self.lakehouse_def_path = Some(path);
        self.dirty = true;
    }

    /// The root version this node was read from, if any. A node assembled in
    /// memory has no version until it is published.
    pub fn version(&self) -> Option<RootVersion> {
        self.version
    }

    // Stamps the version a node was read from or published at. The node is
    // clean afterwards: it matches storage exactly.
    pub(crate) fn with_version(mut self, version: RootVersion) -> Self {
        self.version = Some(version);
        self.dirty = false;
        self
    }

    /// Returns the value of a user row.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.rows.get(key).map(String::as_str)
    }

    /// Returns whether a user row is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    pub(crate) fn set(&mut self, key: String, value: String) {
        self.rows.insert(key, value);
        self.dirty = true;
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<String> {
        let removed = self.rows.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    /// Iterates over the user rows in key byte order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rows.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// The number of user rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the node was mutated since it was read or cloned. Only
    /// dirty nodes have anything to commit.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

// Two nodes are equal when they hold the same catalog content. The carried
// version and the dirty flag record how the node was obtained, not what it
// contains.
impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        self.lakehouse_def_path == other.lakehouse_def_path && self.rows == other.rows
    }
}

impl Eq for TreeNode {}
