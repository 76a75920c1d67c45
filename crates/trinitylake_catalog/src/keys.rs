#[cfg(test)]
#[path = "keys_test.rs"]
mod keys_test;

use crate::lakehouse::LakehouseDef;
use crate::{CatalogError, CatalogResult};

/// Prefix of the node rows owned by the engine rather than by user objects.
/// Names containing this byte are rejected, so reserved rows can never collide
/// with an encoded namespace or table key.
pub(crate) const RESERVED_KEY_PREFIX: &str = "$";
/// Reserved row holding the storage path of the lakehouse descriptor blob.
pub(crate) const LAKEHOUSE_DEF_KEY: &str = "$lakehouse_def";
/// Reserved row holding the number of user keys in the node, as decimal text.
pub(crate) const NUMBER_OF_KEYS_KEY: &str = "$number_of_keys";

const NAMESPACE_KEY_TAG: &str = "ns";
const TABLE_KEY_TAG: &str = "tbl";

/// Maps namespace and table names into the flat key space of a tree node and
/// back. The mapping is injective and every well-formed key belongs to exactly
/// one of three disjoint classes: namespace keys, table keys and reserved keys.
///
/// The separator and the maximum name sizes come from the lakehouse
/// descriptor, so all transactions of one lakehouse agree on the encoding.
#[derive(Clone, Debug)]
pub struct KeyEncoder {
    separator: char,
    namespace_name_max_size: usize,
    table_name_max_size: usize,
}

impl KeyEncoder {
    /// Builds the encoder for a lakehouse.
    pub fn new(def: &LakehouseDef) -> Self {
        Self {
            separator: def.key_separator,
            namespace_name_max_size: def.namespace_name_max_size,
            table_name_max_size: def.table_name_max_size,
        }
    }

    /// Encodes a namespace name into its node key.
    pub fn namespace_key(&self, namespace: &str) -> CatalogResult<String> {
        self.validate_name(namespace, self.namespace_name_max_size)?;
        Ok(format!("{NAMESPACE_KEY_TAG}{}{namespace}", self.separator))
    }

    /// Encodes a table name into its node key.
    pub fn table_key(&self, namespace: &str, table: &str) -> CatalogResult<String> {
        self.validate_name(namespace, self.namespace_name_max_size)?;
        self.validate_name(table, self.table_name_max_size)?;
        Ok(format!("{TABLE_KEY_TAG}{sep}{namespace}{sep}{table}", sep = self.separator))
    }

    /// Returns whether the key encodes a namespace.
    pub fn is_namespace_key(&self, key: &str) -> bool {
        self.split_namespace_key(key).is_some()
    }

    /// Returns whether the key encodes a table.
    pub fn is_table_key(&self, key: &str) -> bool {
        self.split_table_key(key).is_some()
    }

    /// Returns whether the key is a reserved engine row.
    pub fn is_reserved_key(key: &str) -> bool {
        key.starts_with(RESERVED_KEY_PREFIX)
    }

    /// Decodes the namespace name out of a namespace key.
    pub fn namespace_name(&self, key: &str) -> CatalogResult<String> {
        self.split_namespace_key(key)
            .map(str::to_owned)
            .ok_or_else(|| CatalogError::MalformedKey { key: key.to_owned() })
    }

    /// Decodes the namespace and table names out of a table key.
    pub fn table_name(&self, key: &str) -> CatalogResult<(String, String)> {
        self.split_table_key(key)
            .map(|(namespace, table)| (namespace.to_owned(), table.to_owned()))
            .ok_or_else(|| CatalogError::MalformedKey { key: key.to_owned() })
    }

    fn split_namespace_key<'a>(&self, key: &'a str) -> Option<&'a str> {
        let name = key.strip_prefix(NAMESPACE_KEY_TAG)?.strip_prefix(self.separator)?;
        (!name.is_empty() && !name.contains(self.separator)).then_some(name)
    }

    fn split_table_key<'a>(&self, key: &'a str) -> Option<(&'a str, &'a str)> {
        let rest = key.strip_prefix(TABLE_KEY_TAG)?.strip_prefix(self.separator)?;
        let (namespace, table) = rest.split_once(self.separator)?;
        (!namespace.is_empty() && !table.is_empty() && !table.contains(self.separator))
            .then_some((namespace, table))
    }

    fn validate_name(&self, name: &str, max_size: usize) -> CatalogResult<()> {
        if name.is_empty() {
            return Err(invalid_name(name, "it is empty".to_owned()));
        }
        if name.len() > max_size {
            return Err(invalid_name(name, format!("it is longer than {max_size} bytes")));
        }
        if name.contains(self.separator) {
            return Err(invalid_name(
                name,
                format!("it contains the key separator {:?}", self.separator),
            ));
        }
        if name.contains(RESERVED_KEY_PREFIX) {
            return Err(invalid_name(
                name,
                format!("it contains the reserved prefix {RESERVED_KEY_PREFIX:?}"),
            ));
        }
        Ok(())
    }
}

fn invalid_name(name: &str, reason: String) -> CatalogError {
    CatalogError::InvalidName { name: name.to_owned(), reason }
}
