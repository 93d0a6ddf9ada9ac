//! Client-side sort of the loaded page.

use std::cmp::Ordering;

use sheetgrid_lib::model::Record;
use sheetgrid_lib::model::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Returns the opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Single-column sort state of a table.
///
/// Starts unsorted. Once a column has been clicked there is always a sort
/// column; only [`clear`](Self::clear) returns to the unsorted state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortState {
    /// Column label to sort by, `None` for source order.
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// Creates an unsorted state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state sorted by `column`.
    pub fn by(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: Some(column.into()),
            direction,
        }
    }

    /// Applies a header click on `column`.
    ///
    /// Clicking the sorted column flips the direction. Clicking any other
    /// column sorts by it ascending.
    pub fn toggle(&mut self, column: &str) {
        match &self.key {
            Some(key) if key == column => self.direction = self.direction.flipped(),
            _ => {
                self.key = Some(column.to_string());
                self.direction = SortDirection::Ascending;
            }
        }
    }

    /// Returns to source order.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Returns `true` if a sort column is set.
    pub fn is_sorted(&self) -> bool {
        self.key.is_some()
    }

    /// Returns the direction if `column` is the sort column.
    pub fn direction_of(&self, column: &str) -> Option<SortDirection> {
        (self.key.as_deref() == Some(column)).then_some(self.direction)
    }
}

/// Returns the positions of `items` in display order.
///
/// The sort is stable: records with equal keys keep their page order, in both
/// directions. A missing column sorts like a blank cell.
pub fn sorted_order(items: &[Record], sort: &SortState) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    let Some(key) = sort.key.as_deref() else {
        return order;
    };

    let blank = Value::empty();
    let value_of = |i: usize| items[i].get(key).unwrap_or(&blank);
    order.sort_by(|&a, &b| sort.direction.apply(value_of(a).cmp(value_of(b))));
    order
}
