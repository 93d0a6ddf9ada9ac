//! Normalized table record

use std::sync::Arc;

use super::Value;

/// One normalized row of the upstream table.
///
/// A record is an ordered mapping from column label to [`Value`]. Records
/// produced by the source adapter always carry every column of their table,
/// with blank cells stored as the empty string rather than omitted. Records of
/// the same table share their column list.
///
/// Labels are unique within a record. Writing an existing label replaces its
/// value in place, so the column keeps its original position.
///
/// # Example
///
/// ```
/// use sheetgrid_lib::model::Record;
///
/// let record = Record::new()
///     .set("Name", "Acme")
///     .set("Domain", "acme.io")
///     .set("Employees", 120);
///
/// assert_eq!(record.get_text("Domain").as_deref(), Some("acme.io"));
/// assert_eq!(record.columns(), ["Name", "Domain", "Employees"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Column labels, shared between records of one table.
    columns: Arc<[String]>,
    /// Values, positionally aligned with `columns`.
    values: Vec<Value>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Self {
            columns: Arc::from(Vec::new()),
            values: Vec::new(),
        }
    }

    /// Creates a record over a shared column list.
    ///
    /// Missing trailing values are filled with blank cells and surplus values
    /// are dropped, so the record always has one value per column.
    pub fn from_parts(columns: Arc<[String]>, mut values: Vec<Value>) -> Self {
        values.resize_with(columns.len(), Value::empty);
        Self { columns, values }
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the value of a column, if it exists.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.position(column).map(|i| &self.values[i])
    }

    /// Returns the display text of a column, if it exists.
    pub fn get_text(&self, column: &str) -> Option<String> {
        self.get(column).map(|v| v.to_string())
    }

    /// Returns `true` if the record contains the given column.
    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    /// Returns the column labels in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the values in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Iterates `(label, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a column value (builder pattern).
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Sets a column value, replacing any previous value for that label.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.position(&column) {
            Some(i) => self.values[i] = value,
            None => {
                let mut columns = self.columns.to_vec();
                columns.push(column);
                self.columns = columns.into();
                self.values.push(value);
            }
        }
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}
