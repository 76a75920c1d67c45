
pub mod in_memory;
pub mod local;

use std::fmt::Debug;
use std::io::Write;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::object_store::in_memory::InMemoryObjectStore;
use crate::object_store::local::LocalObjectStore;

// Abstraction over an object store holding the catalog. The API is the small
// subset the tree engine needs; any backend offering conditional create (or
// something it can be synthesized from, e.g. if-none-match or a CAS column)
// can implement it.
//
// Assumptions:
// Objects are immutable once published; listings eventually reflect published
// objects but need not be strongly consistent.

/// Errors originating from an object store backend.
#[allow(missing_docs)]
#[derive(thiserror::Error, Debug)]
pub enum ObjectStoreError {
    #[error("Object {path} was not found.")]
    NotFound { path: String },
    #[error("Object {path} already exists.")]
    AlreadyExists { path: String },
    #[error("Object path {path} is not valid for this store.")]
    InvalidPath { path: String },
    #[error("Unsupported object store URL {url}.")]
    UnsupportedUrl { url: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A type alias that maps to std::result::Result<T, ObjectStoreError>.
pub type ObjectStoreResult<V> = std::result::Result<V, ObjectStoreError>;

/// A pending write that publishes its object only on [`complete`].
///
/// Publication is conditional: it succeeds iff the path is still absent, and
/// fails with [`ObjectStoreError::AlreadyExists`] otherwise. On failure (or on
/// drop without completing) no bytes become visible. This is the only
/// coordination point the engine relies on between concurrent writers.
///
/// [`complete`]: AtomicWriteHandle::complete
pub trait AtomicWriteHandle: Write + Send {
    /// Atomically publishes the buffered bytes at the handle's path.
    fn complete(self: Box<Self>) -> ObjectStoreResult<()>;
}

/// Random access object storage.
pub trait ObjectStore: Debug + Send + Sync {
    /// Returns the content of the object, or [`ObjectStoreError::NotFound`].
    fn read(&self, path: &str) -> ObjectStoreResult<Vec<u8>>;

    /// Writes the object unconditionally.
    fn write(&self, path: &str, bytes: &[u8]) -> ObjectStoreResult<()>;

    /// Starts a conditional create of the object. See [`AtomicWriteHandle`].
    fn start_atomic_write(&self, path: &str) -> ObjectStoreResult<Box<dyn AtomicWriteHandle>>;

    /// Returns the paths of the objects under the prefix, in ascending order.
    fn list(&self, prefix: &str) -> ObjectStoreResult<Vec<String>>;

    /// Returns whether the object exists.
    fn exists(&self, path: &str) -> ObjectStoreResult<bool>;
}

/// A struct for the configuration of an object store.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct ObjectStoreConfig {
    /// URL of the store root, e.g. `memory://` or `file:///var/lib/lakehouse`.
    #[validate(length(min = 1))]
    pub url: String,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self { url: "memory://".to_owned() }
    }
}

/// Opens the object store backend named by the configuration URL.
pub fn open_object_store(config: &ObjectStoreConfig) -> ObjectStoreResult<Arc<dyn ObjectStore>> {
    let unsupported = || ObjectStoreError::UnsupportedUrl { url: config.url.clone() };
    let url = Url::parse(&config.url).map_err(|_| unsupported())?;
    match url.scheme() {
        "memory" => Ok(Arc::new(InMemoryObjectStore::new())),
        "file" => {
            let root = url.to_file_path().map_err(|_| unsupported())?;
            Ok(Arc::new(LocalObjectStore::new(root)?))
        }
        _ => Err(unsupported()),
    }
}
