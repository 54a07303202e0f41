//! Query result shapes handed to the card by the host data layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::format::Meta;

/// One result row: field name → value, in the order the query returned them.
pub type Row = serde_json::Map<String, Value>;

/// Rows returned by a single query plus the host's status markers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    #[serde(default)]
    pub data: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub is_loading: bool,
}

impl ResultSet {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            data: rows,
            ..Self::default()
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Text of `field` on the first row, `None` when the row or value is missing or null.
    pub fn first_value(&self, field: &str) -> Option<String> {
        self.data.first()?.get(field).and_then(cell_text)
    }

    /// Field names in first-seen order across all rows.
    pub fn fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        for row in &self.data {
            for key in row.keys() {
                if !fields.iter().any(|existing| existing == key) {
                    fields.push(key.clone());
                }
            }
        }
        fields
    }
}

/// Render a JSON cell the way the host encodes it: numbers and strings as
/// text, `null` as absent.
pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}

/// The measure the card displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl MetricRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// A grouping field; when one is selected the card shows a category, not a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl DimensionRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
        }
    }
}

/// Comparison date range as supplied by the host's time filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_time_string: Option<String>,
}

impl TimeRange {
    pub fn has_end(&self) -> bool {
        self.to.as_deref().is_some_and(|to| !to.is_empty())
    }

    pub fn relative_label(&self) -> Option<&str> {
        self.relative_time_string
            .as_deref()
            .filter(|label| !label.is_empty())
    }
}
