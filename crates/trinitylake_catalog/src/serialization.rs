#[cfg(test)]
#[path = "serialization_test.rs"]
mod serialization_test;

use std::collections::BTreeMap;
use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use tracing::trace;

use crate::keys::{KeyEncoder, LAKEHOUSE_DEF_KEY, NUMBER_OF_KEYS_KEY};
use crate::node::TreeNode;

// The node format: magic bytes, a big-endian u16 format version, a big-endian
// u32 row count, then the rows as length-prefixed (key, value) strings sorted
// ascending by key bytes. Reserved rows are part of the row table. Sorting
// makes the encoding deterministic, so equal nodes produce equal bytes.

pub(crate) const NODE_MAGIC: [u8; 4] = *b"TLTN";
pub(crate) const NODE_FORMAT_VERSION: u16 = 1;

/// Reasons a tree node cannot be serialized.
#[allow(missing_docs)]
#[derive(thiserror::Error, Debug)]
pub enum NodeEncodeError {
    #[error("The node has no lakehouse definition pointer.")]
    MissingLakehouseDef,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reasons a byte sequence is not a valid tree node.
#[allow(missing_docs)]
#[derive(thiserror::Error, Debug)]
pub enum NodeDecodeError {
    #[error("Bad magic bytes {found:?}.")]
    BadMagic { found: [u8; 4] },
    #[error("Unknown node format version {version}.")]
    UnknownFormatVersion { version: u16 },
    #[error("Unexpected end of node data.")]
    UnexpectedEof,
    #[error("Node row is not valid UTF-8.")]
    InvalidUtf8,
    #[error("Node keys are duplicated or out of order at {key:?}.")]
    UnorderedKey { key: String },
    #[error("Unknown reserved row {key:?}.")]
    UnknownReservedRow { key: String },
    #[error("The number-of-keys row holds {value:?}, not a number.")]
    InvalidKeyCount { value: String },
    #[error("Missing reserved row {key:?}.")]
    MissingReservedRow { key: &'static str },
    #[error("Node declares {declared} user keys but carries {observed}.")]
    KeyCountMismatch { declared: usize, observed: usize },
    #[error("Trailing bytes after the node rows.")]
    TrailingBytes,
}

pub(crate) fn encode_node(node: &TreeNode) -> Result<Vec<u8>, NodeEncodeError> {
    let lakehouse_def_path =
        node.lakehouse_def_path().ok_or(NodeEncodeError::MissingLakehouseDef)?;
    let key_count = node.row_count().to_string();

    // Merge reserved and user rows into one canonically ordered table.
    let mut rows: BTreeMap<&str, &str> = BTreeMap::new();
    rows.insert(LAKEHOUSE_DEF_KEY, lakehouse_def_path);
    rows.insert(NUMBER_OF_KEYS_KEY, &key_count);
    for (key, value) in node.rows() {
        rows.insert(key, value);
    }

    let mut out = Vec::new();
    out.write_all(&NODE_MAGIC)?;
    out.write_u16::<BigEndian>(NODE_FORMAT_VERSION)?;
    out.write_u32::<BigEndian>(rows.len() as u32)?;
    for (key, value) in &rows {
        write_string(&mut out, key)?;
        write_string(&mut out, value)?;
    }
    trace!("Encoded a tree node of {} rows.", rows.len());
    Ok(out)
}

pub(crate) fn decode_node(bytes: &[u8]) -> Result<TreeNode, NodeDecodeError> {
    let mut buf = bytes;

    let mut magic = [0u8; 4];
    buf.read_exact(&mut magic).map_err(|_| NodeDecodeError::UnexpectedEof)?;
    if magic != NODE_MAGIC {
        return Err(NodeDecodeError::BadMagic { found: magic });
    }
    let format_version =
        buf.read_u16::<BigEndian>().map_err(|_| NodeDecodeError::UnexpectedEof)?;
    if format_version != NODE_FORMAT_VERSION {
        return Err(NodeDecodeError::UnknownFormatVersion { version: format_version });
    }

    let row_count = buf.read_u32::<BigEndian>().map_err(|_| NodeDecodeError::UnexpectedEof)?;
    let mut lakehouse_def_path = None;
    let mut declared_key_count = None;
    let mut rows = BTreeMap::new();
    let mut previous_key: Option<String> = None;
    for _ in 0..row_count {
        let key = read_string(&mut buf)?;
        let value = read_string(&mut buf)?;
        if previous_key.as_deref().is_some_and(|previous| previous >= key.as_str()) {
            return Err(NodeDecodeError::UnorderedKey { key });
        }
        previous_key = Some(key.clone());
        if key == LAKEHOUSE_DEF_KEY {
            lakehouse_def_path = Some(value);
        } else if key == NUMBER_OF_KEYS_KEY {
            let count = value
                .parse::<usize>()
                .map_err(|_| NodeDecodeError::InvalidKeyCount { value: value.clone() })?;
            declared_key_count = Some(count);
        } else if KeyEncoder::is_reserved_key(&key) {
            return Err(NodeDecodeError::UnknownReservedRow { key });
        } else {
            rows.insert(key, value);
        }
    }

    let lakehouse_def_path = lakehouse_def_path
        .ok_or(NodeDecodeError::MissingReservedRow { key: LAKEHOUSE_DEF_KEY })?;
    let declared_key_count = declared_key_count
        .ok_or(NodeDecodeError::MissingReservedRow { key: NUMBER_OF_KEYS_KEY })?;
    if declared_key_count != rows.len() {
        return Err(NodeDecodeError::KeyCountMismatch {
            declared: declared_key_count,
            observed: rows.len(),
        });
    }
    if !buf.is_empty() {
        return Err(NodeDecodeError::TrailingBytes);
    }
    trace!("Decoded a tree node of {} user rows.", rows.len());
    Ok(TreeNode::from_parts(lakehouse_def_path, rows))
}

fn write_string(out: &mut Vec<u8>, value: &str) -> Result<(), NodeEncodeError> {
    out.write_u32::<BigEndian>(value.len() as u32)?;
    out.write_all(value.as_bytes())?;
    Ok(())
}

fn read_string(buf: &mut &[u8]) -> Result<String, NodeDecodeError> {
    let len = buf.read_u32::<BigEndian>().map_err(|_| NodeDecodeError::UnexpectedEof)? as usize;
    // Validate the length against the remaining bytes before allocating.
    if len > buf.len() {
        return Err(NodeDecodeError::UnexpectedEof);
    }
    let (head, rest) = buf.split_at(len);
    let value = std::str::from_utf8(head).map_err(|_| NodeDecodeError::InvalidUtf8)?.to_owned();
    *buf = rest;
    Ok(value)
}
