//! Detection of upstream columns that the schema does not model yet.

use crate::error::{serialize_as_message, InferenceImpossible, NameTooLong};
use crate::inference::{infer, InferenceEngine, InferredType};
use crate::normalize::{normalize, sanitize};
use crate::schema::TableSchema;
use crate::upstream::UpstreamColumnMeta;
use log::{debug, warn};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};

/// An upstream column proposed for addition to the schema.
///
/// Type fields are `None` when inference failed; such columns need a manual
/// decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposedColumn {
    pub upstream_name: String,
    pub sql_name: String,
    pub source_type: Option<String>,
    pub sql_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_type_size: Option<usize>,
    /// Set when the name could not be shortened; `sql_name` is then only
    /// sanitized and still too long.
    #[serde(
        serialize_with = "serialize_as_message",
        skip_serializing_if = "Option::is_none"
    )]
    pub name_error: Option<NameTooLong>,
    #[serde(
        serialize_with = "serialize_as_message",
        skip_serializing_if = "Option::is_none"
    )]
    pub inference_error: Option<InferenceImpossible>,
}

impl ProposedColumn {
    fn new(
        column: &UpstreamColumnMeta,
        inferred: Result<InferredType, InferenceImpossible>,
    ) -> Self {
        let (sql_name, name_error) = match normalize(&column.name) {
            Ok(sql_name) => (sql_name, None),
            Err(e) => {
                warn!("{e}");
                (sanitize(&column.name), Some(e))
            }
        };
        let mut proposed = Self {
            upstream_name: column.name.clone(),
            sql_name,
            source_type: None,
            sql_type: None,
            sql_type_size: None,
            name_error,
            inference_error: None,
        };
        match inferred {
            Ok(inferred) => {
                debug!("Inferred type {inferred} for column '{}'", column.name);
                proposed.source_type = Some(inferred.source_type);
                proposed.sql_type = Some(inferred.sql_type);
                proposed.sql_type_size = inferred.sql_type_size;
            }
            Err(e) => {
                warn!("{e}");
                proposed.inference_error = Some(e);
            }
        }
        proposed
    }

    pub fn is_inferred(&self) -> bool {
        self.sql_type.is_some()
    }

    /// SQL column type such as `VARCHAR(15)`, if inferred.
    pub fn column_type(&self) -> Option<String> {
        self.sql_type.as_ref().map(|sql_type| match self.sql_type_size {
            Some(size) => format!("{sql_type}({size})"),
            None => sql_type.clone(),
        })
    }
}

/// Raw upstream columns keyed by name; computed columns are dropped and the
/// first column wins on duplicate names.
fn raw_columns(upstream_columns: &[UpstreamColumnMeta]) -> BTreeMap<&str, &UpstreamColumnMeta> {
    let mut columns = BTreeMap::new();
    for column in upstream_columns.iter().filter(|c| !c.is_computed()) {
        columns.entry(column.name.as_str()).or_insert(column);
    }
    columns
}

/// Proposes a column for every raw upstream column that the schema does not
/// declare under its effective name.
///
/// A column whose type or name cannot be derived is still reported.
pub fn detect(schema: &TableSchema, upstream_columns: &[UpstreamColumnMeta]) -> Vec<ProposedColumn> {
    let declared: BTreeSet<&str> = schema.column_names();
    raw_columns(upstream_columns)
        .into_iter()
        .filter(|(name, _)| !declared.contains(name))
        .map(|(_, column)| ProposedColumn::new(column, infer(column)))
        .collect()
}

/// Infers a type for every raw upstream column, falling back to the types
/// declared in `schema` where the upstream metadata is not enough.
pub fn audit(
    engine: &InferenceEngine,
    schema: &TableSchema,
    upstream_columns: &[UpstreamColumnMeta],
) -> Vec<ProposedColumn> {
    raw_columns(upstream_columns)
        .into_values()
        .map(|column| ProposedColumn::new(column, engine.infer_with_schema(column, schema)))
        .collect()
}

/// Proposed columns of one table, ordered by upstream name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    table_name: String,
    columns: Vec<ProposedColumn>,
}

impl DriftReport {
    pub fn new(table_name: &str, mut columns: Vec<ProposedColumn>) -> Self {
        columns.sort_by(|a, b| a.upstream_name.cmp(&b.upstream_name));
        Self {
            table_name: table_name.to_string(),
            columns,
        }
    }

    /// Runs [`detect`] and wraps the result.
    pub fn detect(schema: &TableSchema, upstream_columns: &[UpstreamColumnMeta]) -> Self {
        Self::new(&schema.table_name, detect(schema, upstream_columns))
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[ProposedColumn] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn inferred_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_inferred()).count()
    }

    pub fn uninferred_count(&self) -> usize {
        self.columns.len() - self.inferred_count()
    }
}

impl Display for DriftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return writeln!(f, "No new columns for table '{}'", self.table_name);
        }
        writeln!(
            f,
            "New columns for table '{}' ({} inferred, {} need review):",
            self.table_name,
            self.inferred_count(),
            self.uninferred_count()
        )?;
        for column in &self.columns {
            match column.column_type() {
                Some(column_type) => writeln!(
                    f,
                    "  {} -> `{}` {column_type}",
                    column.upstream_name, column.sql_name
                )?,
                None => writeln!(
                    f,
                    "  {} -> `{}` (type unknown)",
                    column.upstream_name, column.sql_name
                )?,
            }
        }
        Ok(())
    }
}
