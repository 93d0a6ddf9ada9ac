//! Raw upstream table types.

use serde::Deserialize;

use crate::error::SourceError;

/// The upstream table as delivered, before normalization.
///
/// Cells are positionally aligned with columns: the cell at index `i` of a row
/// belongs to column `i`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTable {
    /// Column descriptors.
    #[serde(rename = "cols")]
    pub columns: Vec<RawColumn>,
    /// Data rows.
    pub rows: Vec<RawRow>,
}

/// A column descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawColumn {
    /// Spreadsheet column id (`"A"`, `"B"`, ...).
    #[serde(default)]
    pub id: String,
    /// Header label.
    #[serde(default)]
    pub label: String,
}

impl RawColumn {
    /// Returns the key used for this column in normalized records.
    ///
    /// Unlabelled columns fall back to their spreadsheet id.
    pub fn key(&self) -> &str {
        if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}

/// A data row. Sparse rows may omit trailing cells or the cell list entirely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRow {
    /// Cells, `None` for blank cells.
    #[serde(rename = "c", default)]
    pub cells: Vec<Option<RawCell>>,
}

/// A single cell.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCell {
    /// The cell value.
    #[serde(rename = "v", default)]
    pub value: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct Envelope {
    table: RawTable,
}

/// Parses the JSON body of the upstream payload.
///
/// A body without `table`, without `rows`, or with non-array `cols` is
/// malformed.
pub fn parse_table(body: &str) -> Result<RawTable, SourceError> {
    serde_json::from_str::<Envelope>(body)
        .map(|envelope| envelope.table)
        .map_err(|e| SourceError::malformed_with_body(e.to_string(), body))
}
