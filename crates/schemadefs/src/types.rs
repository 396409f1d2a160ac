//! Source-type tags and their mapping to SQL column types.
//!
//! A source type describes how raw values of a column are parsed before they
//! are stored. The [`TypeMapping`] turns such a tag into the SQL type literal
//! used in generated DDL. It is an ordinary value passed to the generator and
//! the inference engine, so alternate dialects can be plugged in.

use serde::Serialize;
use std::collections::BTreeMap;

pub const INT: &str = "int";
pub const FLOAT: &str = "float";
pub const STR: &str = "str";
/// Dates stored as integers (`YYYYMMDD`).
pub const INTDATE: &str = "intdate";
pub const GEOCODE: &str = "geocode";
pub const BOOL: &str = "bool";

/// Strips an optional `:qualifier` suffix from a source-type tag.
///
/// `str:trim` and `str` both denote the `str` source type.
pub fn base_tag(source_type: &str) -> &str {
    source_type
        .split_once(':')
        .map(|(base, _)| base)
        .unwrap_or(source_type)
}

/// Immutable mapping from source-type tag to SQL type literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMapping {
    types: BTreeMap<String, String>,
}

impl TypeMapping {
    pub fn new<I, K, V>(types: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            types: types
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// MySQL / InnoDB column types.
    pub fn mysql() -> Self {
        Self::new([
            (INT, "INT(11)"),
            (FLOAT, "DOUBLE"),
            (STR, "VARCHAR(255)"),
            (INTDATE, "INT(11)"),
            (GEOCODE, "VARCHAR(32)"),
            (BOOL, "TINYINT(1)"),
        ])
    }

    /// SQL type literal for `source_type`, ignoring any `:qualifier`.
    pub fn sql_type(&self, source_type: &str) -> Option<&str> {
        self.types.get(base_tag(source_type)).map(String::as_str)
    }

    pub fn contains(&self, source_type: &str) -> bool {
        self.sql_type(source_type).is_some()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl Default for TypeMapping {
    fn default() -> Self {
        Self::mysql()
    }
}
