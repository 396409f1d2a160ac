//! Declarative description of a table: columns, keys and indexes.

use crate::error::DdlError;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;

/// Columns every generated table starts with.
pub const GENERATED_COLUMNS: [&str; 2] = ["id", "issue"];

/// One column declared in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    /// Name of the column in the incoming raw data.
    pub source_name: String,
    /// Name of the column in the generated table, when it differs from
    /// `source_name`.
    pub sql_name: Option<String>,
    /// Tag selecting how values are parsed and which SQL type they get.
    pub source_type: String,
}

impl ColumnSpec {
    pub fn new(source_name: &str, source_type: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            sql_name: None,
            source_type: source_type.to_string(),
        }
    }

    pub fn with_sql_name(mut self, sql_name: &str) -> Self {
        self.sql_name = Some(sql_name.to_string());
        self
    }

    /// Column name in generated SQL: `sql_name` if set, `source_name` otherwise.
    pub fn effective_name(&self) -> &str {
        self.sql_name.as_deref().unwrap_or(&self.source_name)
    }
}

/// Schema of one logical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub table_name: String,
    /// Name of the derived "latest values" table. Falls back to `table_name`.
    pub aggregate_table_name: Option<String>,
    /// Upstream dataset identifier the table is populated from.
    pub metadata_id: Option<String>,
    /// Columns in DDL and CSV order.
    pub ordered_columns: Vec<ColumnSpec>,
    pub key_columns: BTreeSet<String>,
    pub aggregate_key_columns: BTreeSet<String>,
    pub unique_indexes: IndexMap<String, Vec<String>>,
    pub indexes: IndexMap<String, Vec<String>>,
}

impl TableSchema {
    pub fn new(table_name: &str, ordered_columns: Vec<ColumnSpec>) -> Self {
        Self {
            table_name: table_name.to_string(),
            aggregate_table_name: None,
            metadata_id: None,
            ordered_columns,
            key_columns: BTreeSet::new(),
            aggregate_key_columns: BTreeSet::new(),
            unique_indexes: IndexMap::new(),
            indexes: IndexMap::new(),
        }
    }

    pub fn with_key_columns(mut self, columns: &[&str]) -> Self {
        self.key_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_aggregate_key_columns(mut self, columns: &[&str]) -> Self {
        self.aggregate_key_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_unique_index(mut self, name: &str, columns: &[&str]) -> Self {
        self.unique_indexes.insert(
            name.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    pub fn with_index(mut self, name: &str, columns: &[&str]) -> Self {
        self.indexes.insert(
            name.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    pub fn aggregate_table_name(&self) -> &str {
        self.aggregate_table_name
            .as_deref()
            .unwrap_or(&self.table_name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.ordered_columns
            .iter()
            .find(|c| c.effective_name() == name)
    }

    /// Effective names of all declared columns.
    pub fn column_names(&self) -> BTreeSet<&str> {
        self.ordered_columns
            .iter()
            .map(ColumnSpec::effective_name)
            .collect()
    }

    pub fn is_key_column(&self, name: &str) -> bool {
        self.key_columns.contains(name)
    }

    pub fn is_aggregate_key_column(&self, name: &str) -> bool {
        self.aggregate_key_columns.contains(name)
    }

    /// Checks that every key, aggregate key and index column refers to a
    /// declared column, and that no declared column takes the name of a
    /// generated one.
    pub fn validate(&self) -> Result<(), DdlError> {
        let declared = self.column_names();
        if let Some(column) = GENERATED_COLUMNS.iter().find(|c| declared.contains(*c)) {
            return Err(DdlError::ReservedColumnName {
                table: self.table_name.clone(),
                column: column.to_string(),
            });
        }
        let dangling = |context: String, column: &String| DdlError::DanglingColumnReference {
            table: self.table_name.clone(),
            context,
            column: column.clone(),
        };

        if let Some(column) = self.key_columns.iter().find(|c| !declared.contains(c.as_str())) {
            return Err(dangling("key columns".to_string(), column));
        }
        if let Some(column) = self
            .aggregate_key_columns
            .iter()
            .find(|c| !declared.contains(c.as_str()))
        {
            return Err(dangling("aggregate key columns".to_string(), column));
        }
        for (kind, indexes) in [("unique index", &self.unique_indexes), ("index", &self.indexes)] {
            for (name, columns) in indexes {
                if let Some(column) = columns.iter().find(|c| !declared.contains(c.as_str())) {
                    return Err(dangling(format!("{kind} '{name}'"), column));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{ColumnSpec, TableSchema};
    use crate::error::DdlError;

    fn schema() -> TableSchema {
        TableSchema::new(
            "covid_hosp_state_daily",
            vec![
                ColumnSpec::new("state", "str"),
                ColumnSpec::new("reporting_cutoff_start", "intdate").with_sql_name("date"),
                ColumnSpec::new("inpatient_beds", "int"),
            ],
        )
        .with_key_columns(&["state", "date"])
    }

    #[test]
    fn effective_name_falls_back_to_source_name() {
        let schema = schema();
        assert_eq!(schema.ordered_columns[0].effective_name(), "state");
        assert_eq!(schema.ordered_columns[1].effective_name(), "date");
        assert!(schema.column("date").is_some());
        assert!(schema.column("reporting_cutoff_start").is_none());
        assert_eq!(schema.aggregate_table_name(), "covid_hosp_state_daily");
    }

    #[test]
    fn validate_accepts_declared_references() {
        let schema = schema()
            .with_aggregate_key_columns(&["state"])
            .with_unique_index("state_date", &["state", "date"])
            .with_index("beds", &["inpatient_beds"]);
        assert_eq!(schema.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_dangling_references() {
        let err = schema()
            .with_index("by_source", &["reporting_cutoff_start"])
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            DdlError::DanglingColumnReference {
                table: "covid_hosp_state_daily".to_string(),
                context: "index 'by_source'".to_string(),
                column: "reporting_cutoff_start".to_string(),
            }
        );

        let err = schema().with_key_columns(&["county"]).validate().unwrap_err();
        assert!(matches!(err, DdlError::DanglingColumnReference { column, .. } if column == "county"));

        let err = schema()
            .with_aggregate_key_columns(&["hospital_pk"])
            .validate()
            .unwrap_err();
        assert!(err.to_string().starts_with("aggregate key columns of table"));
    }

    #[test]
    fn validate_rejects_generated_column_names() {
        let mut schema = schema();
        schema
            .ordered_columns
            .push(ColumnSpec::new("issue_date", "intdate").with_sql_name("issue"));
        assert_eq!(
            schema.validate(),
            Err(DdlError::ReservedColumnName {
                table: "covid_hosp_state_daily".to_string(),
                column: "issue".to_string(),
            })
        );

        let mut schema = self::schema();
        schema.ordered_columns.push(ColumnSpec::new("id", "int"));
        assert!(matches!(
            schema.validate(),
            Err(DdlError::ReservedColumnName { column, .. }) if column == "id"
        ));
    }
}
