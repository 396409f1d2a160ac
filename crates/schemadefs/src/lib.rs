//! Schema definitions for tabular public-health datasets.
//!
//! A [`SchemaCatalog`] holds the declarative description of every table. From
//! it this crate
//!
//! * generates the `CREATE TABLE` statements of the full-history and the
//!   aggregate table ([`ddl`]), and
//! * compares the declared columns against the column metadata published
//!   upstream, proposing SQL names and types for columns that are not modeled
//!   yet ([`drift`]).

pub mod catalog;
pub mod ddl;
pub mod drift;
pub mod error;
pub mod inference;
pub mod normalize;
pub mod schema;
pub mod types;
pub mod upstream;

pub use catalog::SchemaCatalog;
pub use ddl::{generate_aggregate_statement, generate_table_statement, DdlGenerator};
pub use drift::{detect, DriftReport, ProposedColumn};
pub use error::{CatalogError, DdlError, InferenceImpossible, NameTooLong};
pub use inference::{infer, InferenceEngine, InferredType};
pub use normalize::normalize;
pub use schema::{ColumnSpec, TableSchema};
pub use types::TypeMapping;
pub use upstream::{UpstreamColumnMeta, UpstreamDataType, UpstreamMetadata};
