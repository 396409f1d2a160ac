//! Loading table schemas from the schema definitions file.
//!
//! The file is a YAML mapping from table identifier to a table definition:
//!
//! ```yaml
//! state_daily:
//!   TABLE_NAME: covid_hosp_state_daily
//!   METADATA_ID: 6xf2-c3ie
//!   KEY_COLS: [state, date]
//!   AGGREGATE_KEY_COLS: [state, date]
//!   UNIQUE_INDEXES:
//!     state_and_date: [state, date]
//!   INDEXES: {}
//!   ORDERED_CSV_COLUMNS:
//!     - [state, null, str]
//!     - [reporting_cutoff_start, date, intdate]
//! ```
//!
//! Each column is a `[source_name, sql_name, source_type]` triple where a
//! `null` SQL name means "same as the source name".

use crate::error::CatalogError;
use crate::schema::{ColumnSpec, TableSchema};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct TableDefinition {
    table_name: String,
    #[serde(default)]
    aggregate_table_name: Option<String>,
    #[serde(default)]
    metadata_id: Option<String>,
    ordered_csv_columns: Vec<Vec<Option<String>>>,
    #[serde(default)]
    key_cols: Vec<String>,
    #[serde(default)]
    aggregate_key_cols: Vec<String>,
    #[serde(default)]
    unique_indexes: IndexMap<String, Vec<String>>,
    #[serde(default)]
    indexes: IndexMap<String, Vec<String>>,
}

impl TableDefinition {
    fn into_schema(self) -> Result<TableSchema, CatalogError> {
        let ordered_columns = self
            .ordered_csv_columns
            .into_iter()
            .enumerate()
            .map(|(position, column)| match column.as_slice() {
                [Some(source_name), sql_name, Some(source_type)] => Ok(ColumnSpec {
                    source_name: source_name.clone(),
                    sql_name: sql_name.clone(),
                    source_type: source_type.clone(),
                }),
                _ => Err(CatalogError::MalformedColumn {
                    table: self.table_name.clone(),
                    position,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TableSchema {
            table_name: self.table_name,
            aggregate_table_name: self.aggregate_table_name,
            metadata_id: self.metadata_id,
            ordered_columns,
            key_columns: self.key_cols.into_iter().collect::<BTreeSet<_>>(),
            aggregate_key_columns: self.aggregate_key_cols.into_iter().collect(),
            unique_indexes: self.unique_indexes,
            indexes: self.indexes,
        })
    }
}

/// All table schemas of a schema definitions file, keyed by table identifier.
///
/// Loaded once and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCatalog {
    tables: IndexMap<String, TableSchema>,
}

impl SchemaCatalog {
    pub fn new(tables: IndexMap<String, TableSchema>) -> Self {
        Self { tables }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let definitions: IndexMap<String, TableDefinition> = serde_yaml::from_str(yaml)?;
        let mut tables = IndexMap::with_capacity(definitions.len());
        for (id, definition) in definitions {
            let schema = definition.into_schema()?;
            debug!(
                "Loaded table '{id}' ({}) with {} columns",
                schema.table_name,
                schema.ordered_columns.len()
            );
            tables.insert(id, schema);
        }
        Ok(Self { tables })
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let yaml = std::fs::read_to_string(path).map_err(|error| CatalogError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn table(&self, id: &str) -> Result<&TableSchema, CatalogError> {
        self.tables.get(id).ok_or_else(|| CatalogError::UnknownTable {
            name: id.to_string(),
        })
    }

    /// Table identifiers in file order.
    pub fn table_ids(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&str, &TableSchema)> {
        self.tables.iter().map(|(id, schema)| (id.as_str(), schema))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
