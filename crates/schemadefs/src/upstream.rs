//! Column metadata published by the upstream open-data API.
//!
//! Only the fields needed for drift detection are modeled; everything else in
//! the document is ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::fmt::{self, Display};

/// The view document returned by `GET /api/views/<id>.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamMetadata {
    #[serde(default)]
    pub columns: Vec<UpstreamColumnMeta>,
}

impl UpstreamMetadata {
    /// Columns holding raw data, i.e. without a computation strategy.
    pub fn raw_columns(&self) -> impl Iterator<Item = &UpstreamColumnMeta> {
        self.columns.iter().filter(|c| !c.is_computed())
    }
}

/// Declared data type of an upstream column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UpstreamDataType {
    Text,
    CalendarDate,
    Number,
    Point,
    Checkbox,
    Other(String),
}

impl From<String> for UpstreamDataType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "text" => Self::Text,
            "calendar_date" => Self::CalendarDate,
            "number" => Self::Number,
            "point" => Self::Point,
            "checkbox" => Self::Checkbox,
            _ => Self::Other(name),
        }
    }
}

impl From<UpstreamDataType> for String {
    fn from(data_type: UpstreamDataType) -> Self {
        data_type.to_string()
    }
}

impl Display for UpstreamDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::CalendarDate => "calendar_date",
            Self::Number => "number",
            Self::Point => "point",
            Self::Checkbox => "checkbox",
            Self::Other(name) => name.as_str(),
        };
        write!(f, "{name}")
    }
}

/// Statistics sampled by the upstream service over a column's values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedContents {
    #[serde(default, deserialize_with = "string_or_number")]
    pub cardinality: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub smallest: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub largest: Option<String>,
}

/// One column descriptor of the upstream metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamColumnMeta {
    pub name: String,
    #[serde(default)]
    pub field_name: Option<String>,
    #[serde(rename = "dataTypeName")]
    pub data_type: UpstreamDataType,
    /// Present for columns derived by the upstream service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computation_strategy: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_contents: Option<CachedContents>,
}

impl UpstreamColumnMeta {
    pub fn new(name: &str, data_type: UpstreamDataType) -> Self {
        Self {
            name: name.to_string(),
            field_name: None,
            data_type,
            computation_strategy: None,
            cached_contents: None,
        }
    }

    pub fn with_cached_contents(
        mut self,
        cardinality: Option<&str>,
        smallest: &str,
        largest: &str,
    ) -> Self {
        self.cached_contents = Some(CachedContents {
            cardinality: cardinality.map(str::to_string),
            smallest: Some(smallest.to_string()),
            largest: Some(largest.to_string()),
        });
        self
    }

    pub fn is_computed(&self) -> bool {
        self.computation_strategy
            .as_ref()
            .is_some_and(|strategy| !strategy.is_null())
    }
}

/// Accepts a JSON string or number and keeps its textual form.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
