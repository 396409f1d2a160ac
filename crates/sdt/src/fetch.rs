//! Retrieval of the upstream column metadata of a dataset.

use anyhow::{anyhow, Context, Result as AnyResult};
use log::debug;
use schemadefs::{TableSchema, UpstreamMetadata};
use std::path::Path;
use std::time::Duration;

/// Datasets on healthdata.gov backing the covid_hosp tables.
const KNOWN_DATASETS: [(&str, &str); 3] = [
    ("state_timeseries", "g62h-syeh"),
    ("state_daily", "6xf2-c3ie"),
    ("covid_hosp_facility", "anag-cw7u"),
];

/// Dataset identifier for table `table_id`: explicit choice first, then the
/// table's `METADATA_ID`, then the well-known datasets.
pub(crate) fn dataset_id(
    explicit: Option<String>,
    table_id: &str,
    schema: &TableSchema,
) -> AnyResult<String> {
    explicit
        .or_else(|| schema.metadata_id.clone())
        .or_else(|| {
            KNOWN_DATASETS
                .iter()
                .find(|(table, _)| *table == table_id)
                .map(|(_, id)| id.to_string())
        })
        .ok_or_else(|| {
            anyhow!("no upstream dataset known for table '{table_id}', use `--dataset` to set one")
        })
}

/// Create a client with the given timeout.
pub(crate) fn make_client(timeout: Option<u64>) -> AnyResult<reqwest::Client> {
    let mut client_builder = reqwest::ClientBuilder::new();
    if let Some(timeout) = timeout {
        client_builder = client_builder.timeout(Duration::from_secs(timeout));
    }
    Ok(client_builder.build()?)
}

/// Fetches `GET {host}/api/views/{dataset}.json`; `host` has no trailing `/`.
pub(crate) async fn fetch_metadata(
    client: &reqwest::Client,
    host: &str,
    dataset: &str,
) -> AnyResult<UpstreamMetadata> {
    let url = format!("{host}/api/views/{dataset}.json");
    debug!("Fetching column metadata from {url}");
    let metadata = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("failed to request {url}"))?
        .error_for_status()
        .with_context(|| format!("unexpected response from {url}"))?
        .json::<UpstreamMetadata>()
        .await
        .with_context(|| format!("unable to parse the column metadata returned by {url}"))?;
    debug!("Received {} columns for dataset {dataset}", metadata.columns.len());
    Ok(metadata)
}

pub(crate) async fn read_metadata(path: &Path) -> AnyResult<UpstreamMetadata> {
    let document = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read metadata file {}", path.display()))?;
    debug!("Read column metadata from file: {}", path.display());
    serde_json::from_str(&document)
        .with_context(|| format!("unable to parse metadata file {}", path.display()))
}
