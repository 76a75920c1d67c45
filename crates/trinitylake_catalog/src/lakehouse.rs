#[cfg(test)]
#[path = "lakehouse_test.rs"]
mod lakehouse_test;

use serde::{Deserialize, Serialize};

/// The descriptor of a lakehouse, fixed at creation time.
///
/// The descriptor is written once as an immutable blob and every root node
/// points at it through a reserved row. Namespace and table definitions are
/// opaque payloads to the engine, but this one the engine reads itself: the
/// key encoding of every transaction is derived from it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LakehouseDef {
    /// A human readable name for the lakehouse.
    pub name: String,
    /// Separator between the components of an encoded node key. Names
    /// containing this character are rejected.
    pub key_separator: char,
    /// Maximum byte length of a namespace name.
    pub namespace_name_max_size: usize,
    /// Maximum byte length of a table name.
    pub table_name_max_size: usize,
}

impl Default for LakehouseDef {
    fn default() -> Self {
        Self {
            name: "lakehouse".to_owned(),
            key_separator: '/',
            namespace_name_max_size: 128,
            table_name_max_size: 128,
        }
    }
}

impl LakehouseDef {
    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
