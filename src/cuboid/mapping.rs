//! Grid-table layout mapping derived from a resolved cuboid
//!
//! A pure function of the cuboid's resolved id: each dimension column, in
//! row-key order, is assigned a grid column index. Opaque to the resolution
//! core; the storage layer consumes it when laying out physical rows. Built
//! lazily and memoized per cuboid instance.

use crate::model::ColumnRef;

/// Dimension-to-grid-column layout for one resolved cuboid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridTableMapping {
    columns: Vec<ColumnRef>,
}

impl GridTableMapping {
    /// Build the mapping from the cuboid's dimension columns
    ///
    /// `dimension_columns` must already be in canonical row-key order; grid
    /// column indices follow that order starting at 0.
    pub(crate) fn new(dimension_columns: &[ColumnRef]) -> Self {
        Self {
            columns: dimension_columns.to_vec(),
        }
    }

    /// Number of grid columns holding dimensions
    pub fn dimension_count(&self) -> usize {
        self.columns.len()
    }

    /// Grid column index of a dimension, if present in this cuboid
    pub fn index_of(&self, column: &ColumnRef) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Dimension columns in grid column order
    pub fn columns(&self) -> &[ColumnRef] {
        &self.columns
    }
}
