//! CSV encoding of the card's result rows.

use tracing::{debug, info};

use super::download::{download_bytes, export_file_name, Delivery};
use super::error::ExportError;
use crate::kpi::data::{cell_text, ResultSet, Row};

/// Suffix appended to baseline (previous period) columns.
pub const BASELINE_SUFFIX: &str = "_prev";

/// Rows to export: one result set, or several concatenated in order.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Single(ResultSet),
    Many(Vec<ResultSet>),
}

impl TableSource {
    pub fn rows(&self) -> Vec<&Row> {
        match self {
            TableSource::Single(set) => set.data.iter().collect(),
            TableSource::Many(sets) => sets.iter().flat_map(|set| set.data.iter()).collect(),
        }
    }
}

impl From<ResultSet> for TableSource {
    fn from(set: ResultSet) -> Self {
        TableSource::Single(set)
    }
}

impl From<Vec<ResultSet>> for TableSource {
    fn from(sets: Vec<ResultSet>) -> Self {
        TableSource::Many(sets)
    }
}

fn union_fields<'a>(rows: impl IntoIterator<Item = &'a Row>) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !fields.contains(key) {
                fields.push(key.clone());
            }
        }
    }
    fields
}

/// Encode rows as CSV. Baseline rows are joined by position as extra
/// `<field>_prev` columns.
pub fn encode_csv(source: &TableSource, baseline: Option<&ResultSet>) -> Result<String, ExportError> {
    let rows = source.rows();
    let fields = union_fields(rows.iter().copied());
    let baseline_rows: Vec<&Row> = baseline.map(|set| set.data.iter().collect()).unwrap_or_default();
    let baseline_fields = union_fields(baseline_rows.iter().copied());

    if fields.is_empty() && baseline_fields.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());

    let header = fields
        .iter()
        .cloned()
        .chain(
            baseline_fields
                .iter()
                .map(|field| format!("{field}{BASELINE_SUFFIX}")),
        );
    writer.write_record(header)?;

    let row_count = rows.len().max(baseline_rows.len());
    for index in 0..row_count {
        let current = rows.get(index).copied();
        let previous = baseline_rows.get(index).copied();
        let record = fields
            .iter()
            .map(|field| cell(current, field))
            .chain(baseline_fields.iter().map(|field| cell(previous, field)));
        writer.write_record(record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

fn cell(row: Option<&Row>, field: &str) -> String {
    row.and_then(|row| row.get(field))
        .and_then(cell_text)
        .unwrap_or_default()
}

/// Encode and save the table as `<name>-<timestamp>.csv`.
pub fn export_table(
    source: Option<&TableSource>,
    baseline: Option<&ResultSet>,
    name: &str,
) -> Result<Delivery, ExportError> {
    let source = source.ok_or(ExportError::MissingRows)?;
    let csv = encode_csv(source, baseline)?;
    let filename = export_file_name(name, "csv");
    debug!(%filename, rows = source.rows().len(), "encoded table export");
    let delivery = download_bytes(&filename, "text/csv;charset=utf-8", csv.into_bytes())?;
    info!(%filename, ?delivery, "table export saved");
    Ok(delivery)
}
