#[cfg(test)]
#[path = "table_test.rs"]
mod table_test;

use tracing::debug;

use crate::namespace::NamespaceReader;
use crate::{tree, CatalogError, CatalogResult, CatalogTxn};

/// Read access to the tables of a catalog snapshot.
pub trait TableReader {
    /// Returns the definition payload of the table.
    fn describe_table(&self, namespace: &str, table: &str) -> CatalogResult<Vec<u8>>;

    /// Returns whether the table exists. Absence is a `false`, never an
    /// error.
    fn table_exists(&self, namespace: &str, table: &str) -> CatalogResult<bool>;

    /// Returns the names of the tables of the namespace, in key order.
    fn show_tables(&self, namespace: &str) -> CatalogResult<Vec<String>>;
}

/// Write access to the tables of a catalog snapshot.
pub trait TableWriter
where
    Self: Sized,
{
    // To enforce that no commit happens after a failure, we consume and return
    // Self on success.
    /// Creates the table with the given definition payload.
    fn create_table(self, namespace: &str, table: &str, definition: &[u8])
    -> CatalogResult<Self>;

    /// Replaces the definition payload of the table.
    fn alter_table(self, namespace: &str, table: &str, definition: &[u8])
    -> CatalogResult<Self>;

    /// Removes the table.
    fn drop_table(self, namespace: &str, table: &str) -> CatalogResult<Self>;
}

impl TableReader for CatalogTxn<'_> {
    fn describe_table(&self, namespace: &str, table: &str) -> CatalogResult<Vec<u8>> {
        let key = self.encoder().table_key(namespace, table)?;
        match self.running_root().get(&key) {
            Some(def_path) => Ok(self.store().read(def_path)?),
            None => Err(table_not_found(self, namespace, table)?),
        }
    }

    fn table_exists(&self, namespace: &str, table: &str) -> CatalogResult<bool> {
        // A name the encoder rejects can never have been created.
        let Ok(key) = self.encoder().table_key(namespace, table) else {
            return Ok(false);
        };
        Ok(self.running_root().contains_key(&key))
    }

    fn show_tables(&self, namespace: &str) -> CatalogResult<Vec<String>> {
        if !self.namespace_exists(namespace)? {
            return Err(CatalogError::NamespaceNotFound { namespace: namespace.to_owned() });
        }
        let encoder = self.encoder();
        let mut tables = Vec::new();
        for (key, _) in self.running_root().rows() {
            if !encoder.is_table_key(key) {
                continue;
            }
            let (table_namespace, table) = encoder.table_name(key)?;
            if table_namespace == namespace {
                tables.push(table);
            }
        }
        Ok(tables)
    }
}

impl TableWriter for CatalogTxn<'_> {
    fn create_table(
        mut self,
        namespace: &str,
        table: &str,
        definition: &[u8],
    ) -> CatalogResult<Self> {
        if !self.namespace_exists(namespace)? {
            return Err(CatalogError::NamespaceNotFound { namespace: namespace.to_owned() });
        }
        let key = self.encoder().table_key(namespace, table)?;
        if self.running_root().contains_key(&key) {
            return Err(CatalogError::TableAlreadyExists {
                namespace: namespace.to_owned(),
                table: table.to_owned(),
            });
        }
        let def_path = tree::new_table_def_path(namespace, table);
        self.store().write(&def_path, definition)?;
        self.running_root_mut().set(key, def_path);
        debug!("Transaction {} created table {namespace}.{table}.", self.transaction().id());
        Ok(self)
    }

    fn alter_table(
        mut self,
        namespace: &str,
        table: &str,
        definition: &[u8],
    ) -> CatalogResult<Self> {
        let key = self.encoder().table_key(namespace, table)?;
        if !self.running_root().contains_key(&key) {
            return Err(table_not_found(&self, namespace, table)?);
        }
        // The previous blob stays in place; only the pointer swings.
        let def_path = tree::new_table_def_path(namespace, table);
        self.store().write(&def_path, definition)?;
        self.running_root_mut().set(key, def_path);
        debug!("Transaction {} altered table {namespace}.{table}.", self.transaction().id());
        Ok(self)
    }

    fn drop_table(mut self, namespace: &str, table: &str) -> CatalogResult<Self> {
        let key = self.encoder().table_key(namespace, table)?;
        if !self.running_root().contains_key(&key) {
            return Err(table_not_found(&self, namespace, table)?);
        }
        self.running_root_mut().remove(&key);
        debug!("Transaction {} dropped table {namespace}.{table}.", self.transaction().id());
        Ok(self)
    }
}

// Distinguishes a missing table from a missing namespace so the error names
// what is actually absent.
fn table_not_found(
    txn: &CatalogTxn<'_>,
    namespace: &str,
    table: &str,
) -> CatalogResult<CatalogError> {
    if !txn.namespace_exists(namespace)? {
        return Ok(CatalogError::NamespaceNotFound { namespace: namespace.to_owned() });
    }
    Ok(CatalogError::TableNotFound {
        namespace: namespace.to_owned(),
        table: table.to_owned(),
    })
}
