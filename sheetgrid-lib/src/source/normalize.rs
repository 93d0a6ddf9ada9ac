//! Row normalization.

use std::sync::Arc;

use super::RawTable;
use crate::model::Record;
use crate::model::Value;

/// Converts a raw table into one record per row.
///
/// Every record carries every column. Null cells, missing cells and cells
/// whose value is null all become the empty string. When two columns share a
/// label the later column wins and the label keeps its first position.
pub fn normalize(raw: RawTable) -> Vec<Record> {
    let mut labels: Vec<String> = Vec::with_capacity(raw.columns.len());
    let mut slots: Vec<usize> = Vec::with_capacity(raw.columns.len());
    for column in &raw.columns {
        let key = column.key();
        match labels.iter().position(|l| l == key) {
            Some(slot) => slots.push(slot),
            None => {
                slots.push(labels.len());
                labels.push(key.to_string());
            }
        }
    }

    let columns: Arc<[String]> = labels.into();
    let width = columns.len();

    raw.rows
        .into_iter()
        .map(|row| {
            let mut values = vec![Value::empty(); width];
            let mut cells = row.cells.into_iter();
            for &slot in &slots {
                let value = cells
                    .next()
                    .flatten()
                    .and_then(|cell| cell.value)
                    .map(Value::from_json)
                    .filter(|v| !v.is_null())
                    .unwrap_or_else(Value::empty);
                values[slot] = value;
            }
            Record::from_parts(Arc::clone(&columns), values)
        })
        .collect()
}
