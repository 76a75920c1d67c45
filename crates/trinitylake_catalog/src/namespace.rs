#[cfg(test)]
#[path = "namespace_test.rs"]
mod namespace_test;

use tracing::debug;

use crate::{tree, CatalogError, CatalogResult, CatalogTxn};

/// Read access to the namespaces of a catalog snapshot.
pub trait NamespaceReader {
    /// Returns the definition payload of the namespace.
    fn describe_namespace(&self, namespace: &str) -> CatalogResult<Vec<u8>>;

    /// Returns whether the namespace exists. Absence is a `false`, never an
    /// error.
    fn namespace_exists(&self, namespace: &str) -> CatalogResult<bool>;

    /// Returns the names of all namespaces, in key order.
    fn show_namespaces(&self) -> CatalogResult<Vec<String>>;
}

/// Write access to the namespaces of a catalog snapshot.
pub trait NamespaceWriter
where
    Self: Sized,
{
    // To enforce that no commit happens after a failure, we consume and return
    // Self on success.
    /// Creates the namespace with the given definition payload.
    fn create_namespace(self, namespace: &str, definition: &[u8]) -> CatalogResult<Self>;

    /// Replaces the definition payload of the namespace.
    fn alter_namespace(self, namespace: &str, definition: &[u8]) -> CatalogResult<Self>;

    /// Removes the namespace.
    fn drop_namespace(self, namespace: &str) -> CatalogResult<Self>;
}

impl NamespaceReader for CatalogTxn<'_> {
    fn describe_namespace(&self, namespace: &str) -> CatalogResult<Vec<u8>> {
        let key = self.encoder().namespace_key(namespace)?;
        let Some(def_path) = self.running_root().get(&key) else {
            return Err(CatalogError::NamespaceNotFound { namespace: namespace.to_owned() });
        };
        Ok(self.store().read(def_path)?)
    }

    fn namespace_exists(&self, namespace: &str) -> CatalogResult<bool> {
        // A name the encoder rejects can never have been created.
        let Ok(key) = self.encoder().namespace_key(namespace) else {
            return Ok(false);
        };
        Ok(self.running_root().contains_key(&key))
    }

    fn show_namespaces(&self) -> CatalogResult<Vec<String>> {
        let encoder = self.encoder();
        self.running_root()
            .rows()
            .filter(|(key, _)| encoder.is_namespace_key(key))
            .map(|(key, _)| encoder.namespace_name(key))
            .collect()
    }
}

impl NamespaceWriter for CatalogTxn<'_> {
    fn create_namespace(mut self, namespace: &str, definition: &[u8]) -> CatalogResult<Self> {
        let key = self.encoder().namespace_key(namespace)?;
        if self.running_root().contains_key(&key) {
            return Err(CatalogError::NamespaceAlreadyExists { namespace: namespace.to_owned() });
        }
        let def_path = tree::new_namespace_def_path(namespace);
        self.store().write(&def_path, definition)?;
        self.running_root_mut().set(key, def_path);
        debug!("Transaction {} created namespace {namespace}.", self.transaction().id());
        Ok(self)
    }

    fn alter_namespace(mut self, namespace: &str, definition: &[u8]) -> CatalogResult<Self> {
        let key = self.encoder().namespace_key(namespace)?;
        if !self.running_root().contains_key(&key) {
            return Err(CatalogError::NamespaceNotFound { namespace: namespace.to_owned() });
        }
        // The previous blob stays in place; only the pointer swings.
        let def_path = tree::new_namespace_def_path(namespace);
        self.store().write(&def_path, definition)?;
        self.running_root_mut().set(key, def_path);
        debug!("Transaction {} altered namespace {namespace}.", self.transaction().id());
        Ok(self)
    }

    fn drop_namespace(mut self, namespace: &str) -> CatalogResult<Self> {
        let key = self.encoder().namespace_key(namespace)?;
        if !self.running_root().contains_key(&key) {
            return Err(CatalogError::NamespaceNotFound { namespace: namespace.to_owned() });
        }
        self.running_root_mut().remove(&key);
        debug!("Transaction {} dropped namespace {namespace}.", self.transaction().id());
        Ok(self)
    }
}
