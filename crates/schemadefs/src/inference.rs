//! Best-effort inference of the type a new upstream column should get.
//!
//! The result is a proposal for human review, derived from the column's
//! declared data type and, when available, the sampled statistics the upstream
//! service publishes for it.

use crate::error::InferenceImpossible;
use crate::schema::TableSchema;
use crate::types::{self, TypeMapping};
use crate::upstream::{UpstreamColumnMeta, UpstreamDataType};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Slack added to the longest sampled value of variable-width text columns.
pub const VARCHAR_SLACK: usize = 5;

/// Width of geocoded point columns.
pub const GEOCODE_SIZE: usize = 32;

/// Name suffixes that mark integral aggregates when no samples are available.
const INTEGRAL_SUFFIXES: [&str; 2] = ["sum", "coverage"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredType {
    pub source_type: String,
    pub sql_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_type_size: Option<usize>,
}

impl InferredType {
    fn new(source_type: &str, sql_type: &str) -> Self {
        Self {
            source_type: source_type.to_string(),
            sql_type: sql_type.to_string(),
            sql_type_size: None,
        }
    }

    fn sized(source_type: &str, sql_type: &str, size: usize) -> Self {
        Self {
            sql_type_size: Some(size),
            ..Self::new(source_type, sql_type)
        }
    }
}

impl Display for InferredType {
    /// Renders the SQL column type, e.g. `VARCHAR(15)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sql_type_size {
            Some(size) => write!(f, "{}({size})", self.sql_type),
            None => write!(f, "{}", self.sql_type),
        }
    }
}

/// Infers a type from an upstream column descriptor alone.
pub fn infer(column: &UpstreamColumnMeta) -> Result<InferredType, InferenceImpossible> {
    let impossible = |reason: &str| InferenceImpossible {
        column: column.name.clone(),
        reason: reason.to_string(),
    };

    match &column.data_type {
        UpstreamDataType::Text => {
            let contents = column.cached_contents.as_ref().ok_or_else(|| {
                impossible("text columns need cached contents to determine their type and length")
            })?;
            if contents.cardinality.as_deref() == Some("2") {
                return Ok(InferredType::new(types::BOOL, "BOOLEAN"));
            }
            let (Some(smallest), Some(largest)) = (&contents.smallest, &contents.largest) else {
                return Err(impossible(
                    "cached contents do not include the smallest and largest values",
                ));
            };
            let max_len = largest.chars().count();
            let min_len = smallest.chars().count();
            if max_len == min_len {
                Ok(InferredType::sized(types::STR, "CHAR", max_len))
            } else {
                Ok(InferredType::sized(
                    types::STR,
                    "VARCHAR",
                    max_len + VARCHAR_SLACK,
                ))
            }
        }
        UpstreamDataType::CalendarDate => Ok(InferredType::new(types::INTDATE, "INT")),
        UpstreamDataType::Number => {
            let integral = match &column.cached_contents {
                Some(contents) => contents
                    .largest
                    .as_deref()
                    .is_some_and(|largest| !largest.contains('.')),
                None => INTEGRAL_SUFFIXES
                    .iter()
                    .any(|suffix| column.name.ends_with(suffix)),
            };
            if integral {
                Ok(InferredType::new(types::INT, "INT"))
            } else {
                Ok(InferredType::new(types::FLOAT, "DOUBLE"))
            }
        }
        UpstreamDataType::Point => Ok(InferredType::sized(types::GEOCODE, "VARCHAR", GEOCODE_SIZE)),
        UpstreamDataType::Checkbox => Ok(InferredType::new(types::BOOL, "BOOLEAN")),
        UpstreamDataType::Other(name) => Err(impossible(&format!("unsupported data type '{name}'"))),
    }
}

/// Type inference that can fall back to the type already declared in a schema.
///
/// The type mapping only resolves declared types in that fallback; types
/// inferred from upstream metadata keep the bare literals of [`infer`].
#[derive(Debug, Clone, Default)]
pub struct InferenceEngine {
    types: TypeMapping,
}

impl InferenceEngine {
    pub fn new(types: TypeMapping) -> Self {
        Self { types }
    }

    pub fn infer(&self, column: &UpstreamColumnMeta) -> Result<InferredType, InferenceImpossible> {
        infer(column)
    }

    /// Like [`infer`](Self::infer), but a text column without cached contents
    /// takes the type of the schema column with the same source or SQL name.
    ///
    /// The SQL type is then resolved through the type mapping.
    pub fn infer_with_schema(
        &self,
        column: &UpstreamColumnMeta,
        schema: &TableSchema,
    ) -> Result<InferredType, InferenceImpossible> {
        let err = match infer(column) {
            Ok(inferred) => return Ok(inferred),
            Err(err) => err,
        };
        if column.data_type != UpstreamDataType::Text || column.cached_contents.is_some() {
            return Err(err);
        }

        let name = column.field_name.as_deref().unwrap_or(&column.name);
        let declared = schema
            .ordered_columns
            .iter()
            .find(|c| c.source_name == name || c.effective_name() == name)
            .ok_or(err)?;
        let source_type = types::base_tag(&declared.source_type);
        let sql_type = self
            .types
            .sql_type(source_type)
            .ok_or_else(|| InferenceImpossible {
                column: column.name.clone(),
                reason: format!(
                    "declared source type '{}' is not in the type mapping",
                    declared.source_type
                ),
            })?;
        Ok(InferredType::new(source_type, sql_type))
    }
}
