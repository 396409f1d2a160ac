use serde::{Serialize, Serializer};
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// Errors that abort DDL generation for a single table.
///
/// Generation is all-or-nothing: none of these produce a partial statement.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum DdlError {
    #[error("column '{column}' of table '{table}' has source type '{source_type}' which is not in the type mapping")]
    UnknownSourceType {
        table: String,
        column: String,
        source_type: String,
    },
    #[error("{context} of table '{table}' references column '{column}' which is not declared in its ordered columns")]
    DanglingColumnReference {
        table: String,
        context: String,
        column: String,
    },
    #[error("column '{column}' of table '{table}' clashes with a column generated for every table")]
    ReservedColumnName { table: String, column: String },
}

/// The normalizer applied every abbreviation rule and the name is still too long.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("unable to shorten column name '{name}' ({length} characters) below {maximum} characters using the known abbreviations")]
pub struct NameTooLong {
    pub name: String,
    pub length: usize,
    pub maximum: usize,
}

/// Type inference could not determine a type for an upstream column.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("unable to infer the type of column '{column}': {reason}")]
pub struct InferenceImpossible {
    pub column: String,
    pub reason: String,
}

#[derive(Debug, ThisError)]
pub enum CatalogError {
    #[error("unable to read schema file '{}': {error}", .path.display())]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("unable to parse schema definitions: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unknown table '{name}'")]
    UnknownTable { name: String },
    #[error("column #{position} of table '{table}' must be a [source_name, sql_name, source_type] triple")]
    MalformedColumn { table: String, position: usize },
}

/// Serializes an error as its human-readable message.
///
/// Used for errors that are carried inside serializable reports.
pub(crate) fn serialize_as_message<E, S>(error: &Option<E>, serializer: S) -> Result<S::Ok, S::Error>
where
    E: std::fmt::Display,
    S: Serializer,
{
    error
        .as_ref()
        .map(|e| e.to_string())
        .serialize(serializer)
}
