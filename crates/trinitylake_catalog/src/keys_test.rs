use std::collections::HashSet;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use test_case::test_case;

use crate::keys::{KeyEncoder, LAKEHOUSE_DEF_KEY, NUMBER_OF_KEYS_KEY};
use crate::lakehouse::LakehouseDef;
use crate::CatalogError;

fn encoder() -> KeyEncoder {
    KeyEncoder::new(&LakehouseDef::default())
}

#[test]
fn namespace_key_round_trip() {
    let encoder = encoder();
    let key = encoder.namespace_key("sales").unwrap();
    assert!(encoder.is_namespace_key(&key));
    assert!(!encoder.is_table_key(&key));
    assert!(!KeyEncoder::is_reserved_key(&key));
    assert_eq!(encoder.namespace_name(&key).unwrap(), "sales");
}

#[test]
fn table_key_round_trip() {
    let encoder = encoder();
    let key = encoder.table_key("sales", "orders").unwrap();
    assert!(encoder.is_table_key(&key));
    assert!(!encoder.is_namespace_key(&key));
    assert!(!KeyEncoder::is_reserved_key(&key));
    assert_eq!(encoder.table_name(&key).unwrap(), ("sales".to_owned(), "orders".to_owned()));
}

#[test]
fn classification_is_total_and_mutually_exclusive() {
    let encoder = encoder();
    let keys = [
        encoder.namespace_key("sales").unwrap(),
        encoder.table_key("sales", "orders").unwrap(),
        LAKEHOUSE_DEF_KEY.to_owned(),
        NUMBER_OF_KEYS_KEY.to_owned(),
    ];
    for key in keys {
        let classes = [
            encoder.is_namespace_key(&key),
            encoder.is_table_key(&key),
            KeyEncoder::is_reserved_key(&key),
        ];
        assert_eq!(classes.iter().filter(|class| **class).count(), 1, "key {key}");
    }
}

#[test]
fn distinct_names_encode_to_distinct_keys() {
    let encoder = encoder();
    let keys: HashSet<String> = [
        encoder.namespace_key("a").unwrap(),
        encoder.namespace_key("b").unwrap(),
        encoder.namespace_key("ab").unwrap(),
        encoder.table_key("a", "b").unwrap(),
        encoder.table_key("a", "c").unwrap(),
        encoder.table_key("ab", "c").unwrap(),
    ]
    .into_iter()
    .collect();
    assert_eq!(keys.len(), 6);
}

#[test_case(""; "empty")]
#[test_case("a/b"; "contains the separator")]
#[test_case("a$b"; "contains the reserved prefix")]
#[test_case("$"; "is the reserved prefix")]
fn invalid_names_are_rejected(name: &str) {
    let encoder = encoder();
    assert_matches!(encoder.namespace_key(name), Err(CatalogError::InvalidName { .. }));
    assert_matches!(encoder.table_key("sales", name), Err(CatalogError::InvalidName { .. }));
    assert_matches!(encoder.table_key(name, "orders"), Err(CatalogError::InvalidName { .. }));
}

#[test]
fn over_long_names_are_rejected() {
    let encoder = encoder();
    let name = "n".repeat(LakehouseDef::default().namespace_name_max_size + 1);
    assert_matches!(encoder.namespace_key(&name), Err(CatalogError::InvalidName { .. }));
}

#[test]
fn foreign_keys_do_not_decode() {
    let encoder = encoder();
    for key in ["tbl/a/b", "$lakehouse_def", "garbage", "ns/", "ns/a/b"] {
        assert_matches!(encoder.namespace_name(key), Err(CatalogError::MalformedKey { .. }));
    }
    for key in ["ns/a", "$number_of_keys", "garbage", "tbl/a", "tbl//b"] {
        assert_matches!(encoder.table_name(key), Err(CatalogError::MalformedKey { .. }));
    }
}

#[test]
fn separator_comes_from_the_lakehouse_def() {
    let def = LakehouseDef { key_separator: ':', ..LakehouseDef::default() };
    let encoder = KeyEncoder::new(&def);
    let key = encoder.namespace_key("a/b").unwrap();
    assert_eq!(encoder.namespace_name(&key).unwrap(), "a/b");
    assert_matches!(encoder.namespace_key("a:b"), Err(CatalogError::InvalidName { .. }));
}
