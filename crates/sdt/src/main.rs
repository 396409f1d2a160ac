//! A CLI for the schema definitions of the covid_hosp tables.

use anyhow::{Context, Result as AnyResult};
use clap::Parser;
use log::{debug, info};
use schemadefs::drift::{audit, ProposedColumn};
use schemadefs::{
    DdlGenerator, DriftReport, InferenceEngine, SchemaCatalog, TableSchema, TypeMapping,
    UpstreamMetadata,
};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

mod cli;
mod fetch;

use crate::cli::*;
use crate::fetch::{dataset_id, fetch_metadata, make_client, read_metadata};

/// Renders proposed columns as a table.
fn columns_table(columns: &[ProposedColumn]) -> String {
    let mut rows = vec![];
    rows.push([
        "upstream name".to_string(),
        "sql name".to_string(),
        "source type".to_string(),
        "sql type".to_string(),
        "notes".to_string(),
    ]);
    for column in columns {
        let notes = [
            column.name_error.as_ref().map(ToString::to_string),
            column.inference_error.as_ref().map(ToString::to_string),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("; ");
        rows.push([
            column.upstream_name.clone(),
            column.sql_name.clone(),
            column.source_type.clone().unwrap_or_default(),
            column.column_type().unwrap_or_default(),
            notes,
        ]);
    }
    Builder::from_iter(rows)
        .build()
        .with(Style::rounded())
        .to_string()
}

fn print_json<T: Serialize>(value: &T) -> AnyResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn load_metadata(
    cli_host: &str,
    timeout: Option<u64>,
    table: &str,
    schema: &TableSchema,
    source: MetadataSource,
) -> AnyResult<UpstreamMetadata> {
    match source.metadata_file {
        Some(path) => read_metadata(&path).await,
        None => {
            let dataset = dataset_id(source.dataset, table, schema)?;
            let client = make_client(timeout)?;
            fetch_metadata(&client, cli_host, &dataset).await
        }
    }
}

fn tables(catalog: &SchemaCatalog, format: OutputFormat) -> AnyResult<()> {
    match format {
        OutputFormat::Text => {
            let mut rows = vec![];
            rows.push([
                "table".to_string(),
                "sql table".to_string(),
                "columns".to_string(),
            ]);
            for (id, schema) in catalog.tables() {
                rows.push([
                    id.to_string(),
                    schema.table_name.clone(),
                    schema.ordered_columns.len().to_string(),
                ]);
            }
            println!(
                "{}",
                Builder::from_iter(rows).build().with(Style::rounded())
            );
            Ok(())
        }
        OutputFormat::Json => print_json(&catalog.table_ids().collect::<Vec<_>>()),
    }
}

#[derive(Serialize)]
struct Statements {
    table: Option<String>,
    aggregate: Option<String>,
}

/// Renders the requested statements; both are generated before anything is
/// rendered.
fn render_ddl(
    schema: &TableSchema,
    full_only: bool,
    aggregate_only: bool,
    format: OutputFormat,
) -> AnyResult<String> {
    let generator = DdlGenerator::new(TypeMapping::mysql());
    let statements = Statements {
        table: (!aggregate_only)
            .then(|| generator.generate_table_statement(schema))
            .transpose()?,
        aggregate: (!full_only)
            .then(|| generator.generate_aggregate_statement(schema))
            .transpose()?,
    };
    match format {
        OutputFormat::Text => Ok([statements.table, statements.aggregate]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("\n\n")),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&statements)?),
    }
}

async fn run(cli: Cli) -> AnyResult<()> {
    let catalog = SchemaCatalog::from_path(&cli.schema_file)
        .with_context(|| format!("failed to load {}", cli.schema_file.display()))?;
    debug!(
        "Loaded {} tables from {}",
        catalog.len(),
        cli.schema_file.display()
    );

    match cli.command {
        Commands::Tables => tables(&catalog, cli.format),
        Commands::Ddl {
            table,
            full_only,
            aggregate_only,
        } => {
            let rendered = render_ddl(catalog.table(&table)?, full_only, aggregate_only, cli.format)?;
            println!("{rendered}");
            Ok(())
        }
        Commands::Drift { table, source } => {
            let schema = catalog.table(&table)?;
            let metadata = load_metadata(&cli.host, cli.timeout, &table, schema, source).await?;
            let report = DriftReport::detect(schema, &metadata.columns);
            info!(
                "{} new columns for '{}', {} without an inferred type",
                report.columns().len(),
                report.table_name(),
                report.uninferred_count()
            );
            match cli.format {
                OutputFormat::Text if report.is_empty() => {
                    print!("{report}");
                    Ok(())
                }
                OutputFormat::Text => {
                    println!("{}", columns_table(report.columns()));
                    println!("{} new columns", report.columns().len());
                    Ok(())
                }
                OutputFormat::Json => print_json(&report),
            }
        }
        Commands::Audit { table, source } => {
            let schema = catalog.table(&table)?;
            let metadata = load_metadata(&cli.host, cli.timeout, &table, schema, source).await?;
            let engine = InferenceEngine::new(TypeMapping::mysql());
            let columns = audit(&engine, schema, &metadata.columns);
            match cli.format {
                OutputFormat::Text => {
                    println!("{}", columns_table(&columns));
                    Ok(())
                }
                OutputFormat::Json => print_json(&columns),
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let mut cli = Cli::parse();

    let _r = env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .format_target(false)
        .format_timestamp(None)
        .try_init();

    if cli.host.ends_with('/') {
        cli.host = cli.host.trim_end_matches('/').to_string();
    }

    if let Err(e) = run(cli).await {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
