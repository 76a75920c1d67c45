#![warn(missing_docs)]

//! A transactional catalog for a [`TrinityLake`] lakehouse.
//!
//! This crate provides a versioned tree of namespaces and tables stored in an
//! object store. Every transaction works against an immutable snapshot of the
//! tree and publishes its changes as a brand new root node, so readers never
//! block and concurrent writers are linearized by a single conditional-create
//! storage primitive: publishing a root succeeds only if its version is not
//! taken yet.
//!
//! # Quick Start
//! To use this crate, open a catalog over an object store, create the
//! lakehouse once, and run transactions against it. The catalog operations
//! are implemented on the transaction in multiple traits.
//!
//! ```
//! use std::sync::Arc;
//!
//! use trinitylake_catalog::namespace::{NamespaceReader, NamespaceWriter};
//! use trinitylake_catalog::object_store::in_memory::InMemoryObjectStore;
//! use trinitylake_catalog::{Catalog, LakehouseDef};
//!
//! let catalog = Catalog::new(Arc::new(InMemoryObjectStore::new()));
//! catalog.create_lakehouse(&LakehouseDef::default())?;
//!
//! let txn = catalog.begin_transaction()?;                         // Capture the latest root.
//! let txn = txn.create_namespace("sales", br#"{"owner": "analytics"}"#)?;
//! txn.commit()?;                                                  // Publish root version 1.
//!
//! let txn = catalog.begin_transaction()?;
//! assert_eq!(txn.describe_namespace("sales")?, br#"{"owner": "analytics"}"#);
//! # Ok::<(), trinitylake_catalog::CatalogError>(())
//! ```
//!
//! [`TrinityLake`]: https://trinitylake.io/

pub mod keys;
pub mod lakehouse;
pub mod namespace;
pub mod node;
pub mod object_store;
mod serialization;
pub mod table;
pub mod transaction;
mod tree;
mod version;

#[cfg(any(feature = "testing", test))]
pub mod test_utils;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use crate::keys::KeyEncoder;
use crate::node::TreeNode;
use crate::object_store::{
    open_object_store,
    ObjectStore,
    ObjectStoreConfig,
    ObjectStoreError,
};
use crate::transaction::{CommittedTransaction, RunningTransaction, TransactionOptions};

pub use crate::lakehouse::LakehouseDef;
pub use crate::serialization::{NodeDecodeError, NodeEncodeError};
pub use crate::version::RootVersion;

/// Error type for the catalog crate.
#[allow(missing_docs)]
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    /// Errors related to the underlying object store.
    #[error(transparent)]
    ObjectStore(#[from] ObjectStoreError),
    #[error(transparent)]
    CorruptNode(#[from] NodeDecodeError),
    #[error(transparent)]
    NodeEncode(#[from] NodeEncodeError),
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    /// Errors related to an invalid configuration.
    #[error(transparent)]
    InvalidConfig(#[from] validator::ValidationErrors),
    #[error("No lakehouse root found in the store; create the lakehouse first.")]
    Uninitialized,
    #[error("A lakehouse already exists in the store.")]
    LakehouseAlreadyExists,
    #[error("Namespace {namespace} was not found.")]
    NamespaceNotFound { namespace: String },
    #[error("Namespace {namespace} already exists.")]
    NamespaceAlreadyExists { namespace: String },
    #[error("Table {namespace}.{table} was not found.")]
    TableNotFound { namespace: String, table: String },
    #[error("Table {namespace}.{table} already exists.")]
    TableAlreadyExists { namespace: String, table: String },
    #[error(
        "Commit of root version {version} lost the race to a concurrent writer. Begin a new \
         transaction and replay the changes to retry."
    )]
    CommitConflict { version: RootVersion },
    #[error("The transaction has no changes to commit.")]
    NothingToCommit,
    #[error("Invalid name {name:?}: {reason}.")]
    InvalidName { name: String, reason: String },
    #[error("Key {key:?} does not decode to a name of the requested kind.")]
    MalformedKey { key: String },
}

/// A type alias that maps to std::result::Result<T, CatalogError>.
pub type CatalogResult<V> = std::result::Result<V, CatalogError>;

/// A struct for the configuration of a [`Catalog`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, Validate)]
pub struct CatalogConfig {
    /// The object store holding the lakehouse.
    #[validate]
    pub object_store: ObjectStoreConfig,
}

/// Opens the object store named by the configuration and returns a [`Catalog`]
/// over it. The configuration is validated first.
pub fn open_catalog(config: &CatalogConfig) -> CatalogResult<Catalog> {
    config.validate()?;
    let store = open_object_store(&config.object_store)?;
    Ok(Catalog::new(store))
}

/// Handle to one lakehouse catalog in an object store.
///
/// The handle is cheap to clone and holds no state of its own besides the
/// store; all catalog state lives in the published root lineage. Any number of
/// transactions may run concurrently against the same handle or against
/// separate handles over the same store.
#[derive(Clone, Debug)]
pub struct Catalog {
    store: Arc<dyn ObjectStore>,
}

impl Catalog {
    /// Returns a catalog over the given store.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// Initializes the lakehouse: writes the descriptor blob and publishes
    /// root version 0 pointing at it. Fails with
    /// [`CatalogError::LakehouseAlreadyExists`] if root 0 is already
    /// published.
    pub fn create_lakehouse(&self, def: &LakehouseDef) -> CatalogResult<()> {
        let root_zero = tree::root_path(RootVersion(0));
        if self.store.exists(&root_zero)? {
            return Err(CatalogError::LakehouseAlreadyExists);
        }
        let def_path = tree::new_lakehouse_def_path();
        self.store.write(&def_path, &def.to_bytes()?)?;
        let mut root = TreeNode::new();
        root.set_lakehouse_def_path(def_path);
        tree::write_root(self.store(), RootVersion(0), &root).map_err(|err| match err {
            CatalogError::ObjectStore(ObjectStoreError::AlreadyExists { .. }) => {
                CatalogError::LakehouseAlreadyExists
            }
            err => err,
        })?;
        debug!("Created lakehouse {} with root {root_zero}.", def.name);
        Ok(())
    }

    /// Captures the latest published root as the snapshot of a new
    /// transaction.
    pub fn begin_transaction(&self) -> CatalogResult<CatalogTxn<'_>> {
        self.begin_transaction_with_options(TransactionOptions::default())
    }

    /// Like [`begin_transaction`], with explicit options.
    ///
    /// [`begin_transaction`]: Catalog::begin_transaction
    pub fn begin_transaction_with_options(
        &self,
        options: TransactionOptions,
    ) -> CatalogResult<CatalogTxn<'_>> {
        let (version, root) = tree::find_latest_root(self.store())?;
        let lakehouse_def = tree::read_lakehouse_def(self.store(), &root)?;
        let encoder = KeyEncoder::new(&lakehouse_def);
        let txn = RunningTransaction::new(version, root, options);
        debug!("Began transaction {} at root version {version}.", txn.id());
        Ok(CatalogTxn { catalog: self, encoder, txn })
    }
}

/// A transaction over the catalog.
///
/// The actual catalog operations are implemented on the transaction in
/// multiple traits: [`NamespaceReader`]/[`NamespaceWriter`] and
/// [`TableReader`]/[`TableWriter`]. Mutations consume the transaction and
/// return it on success; [`commit`] publishes the accumulated changes as the
/// next root version.
///
/// [`NamespaceReader`]: crate::namespace::NamespaceReader
/// [`NamespaceWriter`]: crate::namespace::NamespaceWriter
/// [`TableReader`]: crate::table::TableReader
/// [`TableWriter`]: crate::table::TableWriter
/// [`commit`]: CatalogTxn::commit
#[derive(Debug)]
pub struct CatalogTxn<'cat> {
    catalog: &'cat Catalog,
    encoder: KeyEncoder,
    txn: RunningTransaction,
}

impl CatalogTxn<'_> {
    /// The transaction record: id, begin time, snapshot and working roots.
    pub fn transaction(&self) -> &RunningTransaction {
        &self.txn
    }

    pub(crate) fn store(&self) -> &dyn ObjectStore {
        self.catalog.store()
    }

    pub(crate) fn encoder(&self) -> &KeyEncoder {
        &self.encoder
    }

    pub(crate) fn running_root(&self) -> &TreeNode {
        self.txn.running_root()
    }

    pub(crate) fn running_root_mut(&mut self) -> &mut TreeNode {
        self.txn.running_root_mut()
    }

    /// Publishes the running root at the successor of the beginning version.
    ///
    /// Exactly one of the transactions that began at the same version can
    /// succeed; the others fail with [`CatalogError::CommitConflict`]. The
    /// engine never retries a commit; on conflict, begin a new transaction
    /// and replay the changes. Descriptor blobs written by a conflicted
    /// transaction stay in storage as unreferenced garbage.
    pub fn commit(self) -> CatalogResult<CommittedTransaction> {
        if !self.txn.running_root().is_dirty() {
            return Err(CatalogError::NothingToCommit);
        }
        let target = self.txn.beginning_version().next();
        tree::write_root(self.store(), target, self.txn.running_root()).map_err(
            |err| match err {
                CatalogError::ObjectStore(ObjectStoreError::AlreadyExists { .. }) => {
                    CatalogError::CommitConflict { version: target }
                }
                err => err,
            },
        )?;
        debug!("Transaction {} committed root version {target}.", self.txn.id());
        Ok(self.txn.into_committed(target))
    }
}
