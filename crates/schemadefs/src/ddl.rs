//! `CREATE TABLE` generation.
//!
//! A [`TableSchema`] is compiled into a [`CreateTable`] value, a list of typed
//! clauses, which is rendered to SQL text only at the end. Two statements are
//! derived from every schema:
//!
//! * the full table, keeping one row per dataset issue (`issue` column), and
//! * the aggregate table, holding the latest known values of the aggregate key
//!   columns only.

use crate::error::DdlError;
use crate::schema::{ColumnSpec, TableSchema};
use crate::types::TypeMapping;
use log::debug;
use std::fmt::{self, Display};

/// Storage options appended to every statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub engine: String,
    pub charset: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            engine: "InnoDB".to_string(),
            charset: "utf8".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnClause {
    pub name: String,
    pub sql_type: String,
    pub not_null: bool,
    pub auto_increment: bool,
}

impl ColumnClause {
    fn surrogate_id() -> Self {
        Self {
            name: "id".to_string(),
            sql_type: "INT".to_string(),
            not_null: true,
            auto_increment: true,
        }
    }

    fn issue() -> Self {
        Self {
            name: "issue".to_string(),
            sql_type: "INT".to_string(),
            not_null: true,
            auto_increment: false,
        }
    }
}

impl Display for ColumnClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` {}", self.name, self.sql_type)?;
        if self.not_null {
            write!(f, " NOT NULL")?;
        }
        if self.auto_increment {
            write!(f, " AUTO_INCREMENT")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKind {
    Unique,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexClause {
    pub kind: IndexKind,
    pub name: String,
    pub columns: Vec<String>,
}

impl Display for IndexClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self.kind {
            IndexKind::Unique => "UNIQUE KEY",
            IndexKind::Plain => "KEY",
        };
        write!(
            f,
            "{keyword} `{}` ({})",
            self.name,
            quoted_list(&self.columns)
        )
    }
}

fn quoted_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("`{c}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A `CREATE TABLE` statement that has not been rendered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    pub table_name: String,
    pub columns: Vec<ColumnClause>,
    pub primary_key: Vec<String>,
    pub indexes: Vec<IndexClause>,
    pub options: TableOptions,
}

impl CreateTable {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn index(&self, name: &str) -> Option<&IndexClause> {
        self.indexes.iter().find(|i| i.name == name)
    }
}

impl Display for CreateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut clauses: Vec<String> = self.columns.iter().map(ToString::to_string).collect();
        clauses.push(format!("PRIMARY KEY ({})", quoted_list(&self.primary_key)));
        clauses.extend(self.indexes.iter().map(ToString::to_string));

        writeln!(f, "CREATE TABLE `{}` (", self.table_name)?;
        writeln!(f, "  {}", clauses.join(",\n  "))?;
        write!(
            f,
            ") ENGINE={} DEFAULT CHARSET={};",
            self.options.engine, self.options.charset
        )
    }
}

/// Compiles table schemas into `CREATE TABLE` statements.
#[derive(Debug, Clone, Default)]
pub struct DdlGenerator {
    types: TypeMapping,
    options: TableOptions,
}

impl DdlGenerator {
    pub fn new(types: TypeMapping) -> Self {
        Self {
            types,
            options: TableOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    pub fn types(&self) -> &TypeMapping {
        &self.types
    }

    /// Builds the full-history table: `id`, `issue`, then every declared column.
    pub fn table_statement(&self, schema: &TableSchema) -> Result<CreateTable, DdlError> {
        self.check(schema)?;
        debug!("Generating table statement for '{}'", schema.table_name);
        self.build(schema, &schema.table_name, true, |_| true)
    }

    /// Builds the aggregate table: `id`, then the aggregate key columns only.
    ///
    /// Index column lists are restricted to aggregate key columns and indexes
    /// left without any column are dropped.
    pub fn aggregate_statement(&self, schema: &TableSchema) -> Result<CreateTable, DdlError> {
        self.check(schema)?;
        debug!("Generating aggregate statement for '{}'", schema.table_name);
        self.build(schema, schema.aggregate_table_name(), false, |name| {
            schema.is_aggregate_key_column(name)
        })
    }

    pub fn generate_table_statement(&self, schema: &TableSchema) -> Result<String, DdlError> {
        Ok(self.table_statement(schema)?.to_string())
    }

    pub fn generate_aggregate_statement(&self, schema: &TableSchema) -> Result<String, DdlError> {
        Ok(self.aggregate_statement(schema)?.to_string())
    }

    /// Rejects the whole table if any reference dangles or any declared
    /// column, retained or not, has a tag outside the type mapping.
    fn check(&self, schema: &TableSchema) -> Result<(), DdlError> {
        schema.validate()?;
        match schema
            .ordered_columns
            .iter()
            .find(|c| !self.types.contains(&c.source_type))
        {
            Some(column) => Err(self.unknown_source_type(schema, column)),
            None => Ok(()),
        }
    }

    fn unknown_source_type(&self, schema: &TableSchema, column: &ColumnSpec) -> DdlError {
        DdlError::UnknownSourceType {
            table: schema.table_name.clone(),
            column: column.effective_name().to_string(),
            source_type: column.source_type.clone(),
        }
    }

    fn build<F>(
        &self,
        schema: &TableSchema,
        table_name: &str,
        with_issue: bool,
        retain: F,
    ) -> Result<CreateTable, DdlError>
    where
        F: Fn(&str) -> bool,
    {
        let mut columns = vec![ColumnClause::surrogate_id()];
        if with_issue {
            columns.push(ColumnClause::issue());
        }
        for column in &schema.ordered_columns {
            let name = column.effective_name();
            if !retain(name) {
                continue;
            }
            let sql_type = self
                .types
                .sql_type(&column.source_type)
                .ok_or_else(|| self.unknown_source_type(schema, column))?;
            columns.push(ColumnClause {
                name: name.to_string(),
                sql_type: sql_type.to_string(),
                not_null: schema.is_key_column(name),
                auto_increment: false,
            });
        }

        let retain = &retain;
        let indexes = [
            (IndexKind::Unique, &schema.unique_indexes),
            (IndexKind::Plain, &schema.indexes),
        ]
        .into_iter()
        .flat_map(|(kind, indexes)| {
            indexes.iter().filter_map(move |(name, index_columns)| {
                let retained: Vec<String> = index_columns
                    .iter()
                    .filter(|c| retain(c.as_str()))
                    .cloned()
                    .collect();
                (!retained.is_empty()).then(|| IndexClause {
                    kind,
                    name: name.clone(),
                    columns: retained,
                })
            })
        })
        .collect();

        Ok(CreateTable {
            table_name: table_name.to_string(),
            columns,
            primary_key: vec!["id".to_string()],
            indexes,
            options: self.options.clone(),
        })
    }
}

/// Full-history `CREATE TABLE` statement using the MySQL type mapping.
pub fn generate_table_statement(schema: &TableSchema) -> Result<String, DdlError> {
    DdlGenerator::default().generate_table_statement(schema)
}

/// Aggregate `CREATE TABLE` statement using the MySQL type mapping.
pub fn generate_aggregate_statement(schema: &TableSchema) -> Result<String, DdlError> {
    DdlGenerator::default().generate_aggregate_statement(schema)
}
