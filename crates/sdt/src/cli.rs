use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use std::fmt::Display;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sdt",
    about = "Generate DDL from schema definitions and check them against upstream column metadata.",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    /// The format in which the outputs should be displayed.
    #[arg(
        long,
        env = "SDT_OUTPUT_FORMAT",
        global = true,
        help_heading = "Global Options",
        default_value = "text"
    )]
    pub format: OutputFormat,
    /// The schema definitions file.
    #[arg(
        long,
        env = "SDT_SCHEMA_FILE",
        value_hint = ValueHint::FilePath,
        global = true,
        help_heading = "Global Options",
        default_value = "covid_hosp_schemadefs.yaml"
    )]
    pub schema_file: PathBuf,
    /// The open-data host serving the upstream column metadata.
    #[arg(
        long,
        env = "SDT_METADATA_HOST",
        value_hint = ValueHint::Url,
        global = true,
        help_heading = "Global Options",
        default_value_t = String::from("https://healthdata.gov")
    )]
    pub host: String,
    /// The client timeout for metadata requests in seconds.
    ///
    /// By default, no timeout is set.
    #[arg(
        long,
        env = "SDT_REQUEST_TIMEOUT",
        global = true,
        help_heading = "Global Options"
    )]
    pub timeout: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
#[value(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Return the output in a human-readable text format.
    Text,
    /// Return the output in JSON format.
    Json,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        };
        write!(f, "{}", output)
    }
}

/// Where the upstream column metadata of a table comes from.
#[derive(clap::Args, Debug, Clone)]
pub struct MetadataSource {
    /// Upstream dataset identifier, e.g. `6xf2-c3ie`.
    ///
    /// Defaults to the `METADATA_ID` of the table or to the well-known
    /// dataset of the table.
    #[arg(long, conflicts_with = "metadata_file")]
    pub dataset: Option<String>,
    /// Read the metadata document from a file instead of the network.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub metadata_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the tables of the schema definitions file.
    Tables,
    /// Print the CREATE TABLE statements of a table.
    Ddl {
        /// The table identifier in the schema definitions file.
        table: String,
        /// Only print the full-history table.
        #[arg(long, conflicts_with = "aggregate_only")]
        full_only: bool,
        /// Only print the aggregate table.
        #[arg(long)]
        aggregate_only: bool,
    },
    /// Propose SQL names and types for upstream columns missing from a table.
    Drift {
        /// The table identifier in the schema definitions file.
        table: String,
        #[command(flatten)]
        source: MetadataSource,
    },
    /// Infer a type for every upstream column of a table.
    Audit {
        /// The table identifier in the schema definitions file.
        table: String,
        #[command(flatten)]
        source: MetadataSource,
    },
}
