//! Cube metadata model consumed by cuboid resolution
//!
//! This module defines the descriptor types the resolution core reads:
//!
//! # Key Types
//!
//! - **`ColumnRef`**: Lightweight reference to a dimension column (table + name)
//! - **`RowKeyDesc`**: Ordered row-key columns with their bit-index assignments
//! - **`HierarchyMask`**: Cumulative level masks for one dimension hierarchy
//! - **`AggregationGroup`**: A group of hierarchies considered together
//! - **`CubeDesc`**: The cube descriptor tying all of the above together
//! - **`MeasureDesc`** / **`MeasureFunction`**: Aggregate metrics and their
//!   aggregation scope (see [`measure`])
//! - **`CuboidScheduler`**: External best-match resolver contract (see
//!   [`scheduler`])
//!
//! All descriptor types validate at construction: a malformed descriptor
//! (duplicate bit index, non-cumulative hierarchy masks) is a metadata
//! contract violation, never a recoverable condition downstream.
//!
//! # Example
//!
//! ```rust
//! use cube_core::model::{ColumnRef, CubeDesc, RowKeyColumn, RowKeyDesc};
//!
//! let row_key = RowKeyDesc::new(vec![
//!     RowKeyColumn::new(ColumnRef::new("SALES", "YEAR"), 0),
//!     RowKeyColumn::new(ColumnRef::new("SALES", "REGION"), 1),
//! ])
//! .unwrap();
//!
//! let cube = CubeDesc::new("sales_cube", row_key, vec![]).unwrap();
//! assert_eq!(cube.base_cuboid_id(), 0b11);
//! ```

pub mod measure;
pub mod scheduler;

pub use measure::{AggregationScope, MeasureDesc, MeasureFunction};
pub use scheduler::CuboidScheduler;

use crate::error::{MetadataError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Reference to a dimension column
///
/// Identifies one column of the cube's fact or lookup tables. Equality and
/// hashing are by table + name, so the same column referenced from different
/// call sites compares equal.
///
/// # Example
///
/// ```rust
/// use cube_core::model::ColumnRef;
///
/// let col = ColumnRef::new("SALES", "REGION");
/// assert_eq!(col.to_string(), "SALES.REGION");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Table the column belongs to
    pub table: String,
    /// Column name within the table
    pub name: String,
}

impl ColumnRef {
    /// Create a new column reference
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}

/// One row-key column: a dimension column and its assigned bit index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowKeyColumn {
    /// The dimension column
    pub column: ColumnRef,
    /// Bit position of this column in cuboid ids
    pub bit_index: u32,
}

impl RowKeyColumn {
    /// Create a new row-key column assignment
    pub fn new(column: ColumnRef, bit_index: u32) -> Self {
        Self { column, bit_index }
    }
}

/// Row-key definition: the cube's dimension columns and their bit indices
///
/// Validated at construction: at least one column, every bit index below 64,
/// no two columns sharing a bit index. Columns are stored in ascending
/// bit-index order, which is the canonical dimension order used everywhere
/// downstream (row-key layout order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RowKeyColumn>", into = "Vec<RowKeyColumn>")]
pub struct RowKeyDesc {
    columns: Vec<RowKeyColumn>,
    index: HashMap<ColumnRef, u32>,
    full_mask: u64,
}

impl RowKeyDesc {
    /// Create a row-key definition from column assignments
    ///
    /// The input order does not matter; columns are re-sorted by ascending
    /// bit index.
    pub fn new(mut columns: Vec<RowKeyColumn>) -> Result<Self> {
        if columns.is_empty() {
            return Err(MetadataError::EmptyRowKey.into());
        }
        columns.sort_by_key(|c| c.bit_index);

        let mut index = HashMap::with_capacity(columns.len());
        let mut full_mask = 0u64;
        for col in &columns {
            if col.bit_index >= 64 {
                return Err(MetadataError::BitIndexOutOfRange {
                    column: col.column.clone(),
                    bit_index: col.bit_index,
                }
                .into());
            }
            let bit = 1u64 << col.bit_index;
            if full_mask & bit != 0 {
                let first = columns
                    .iter()
                    .find(|c| c.bit_index == col.bit_index && c.column != col.column)
                    .map(|c| c.column.clone())
                    .unwrap_or_else(|| col.column.clone());
                return Err(MetadataError::DuplicateBitIndex {
                    bit_index: col.bit_index,
                    first,
                    second: col.column.clone(),
                }
                .into());
            }
            full_mask |= bit;
            index.insert(col.column.clone(), col.bit_index);
        }

        Ok(Self {
            columns,
            index,
            full_mask,
        })
    }

    /// Row-key columns in ascending bit-index order
    pub fn columns(&self) -> &[RowKeyColumn] {
        &self.columns
    }

    /// Number of declared dimension columns
    pub fn dimension_count(&self) -> usize {
        self.columns.len()
    }

    /// Bitmask with every declared row-key bit set (the base cuboid id)
    pub fn full_mask(&self) -> u64 {
        self.full_mask
    }

    /// Bit index of a column, if it is part of the row key
    pub fn bit_index_of(&self, column: &ColumnRef) -> Option<u32> {
        self.index.get(column).copied()
    }

    /// Bit index of a column, erroring if it has no assignment
    ///
    /// A missing assignment is a caller/metadata contract violation and
    /// propagates; it is never silently defaulted.
    pub fn column_bit_index(&self, column: &ColumnRef) -> Result<u32> {
        self.bit_index_of(column)
            .ok_or_else(|| {
                MetadataError::ColumnNotInRowKey {
                    column: column.clone(),
                }
                .into()
            })
    }
}

impl TryFrom<Vec<RowKeyColumn>> for RowKeyDesc {
    type Error = crate::error::Error;

    fn try_from(columns: Vec<RowKeyColumn>) -> Result<Self> {
        Self::new(columns)
    }
}

impl From<RowKeyDesc> for Vec<RowKeyColumn> {
    fn from(desc: RowKeyDesc) -> Self {
        desc.columns
    }
}

/// Cumulative level masks for one dimension hierarchy
///
/// Masks are ordered coarse to fine and cumulative: each mask carries all the
/// bits of the previous level plus the bits distinguishing the next finer
/// level (e.g. `[year, year|quarter, year|quarter|month]`). Validated at
/// construction to be non-empty and strictly cumulative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct HierarchyMask {
    level_masks: Vec<u64>,
}

impl HierarchyMask {
    /// Create a hierarchy from cumulative level masks
    pub fn new(level_masks: Vec<u64>) -> Result<Self> {
        if level_masks.is_empty() {
            return Err(MetadataError::EmptyHierarchy.into());
        }
        for (level, window) in level_masks.windows(2).enumerate() {
            let (coarser, finer) = (window[0], window[1]);
            if finer & coarser != coarser || finer == coarser {
                return Err(MetadataError::NonMonotonicHierarchy {
                    level: level + 1,
                    mask: finer,
                }
                .into());
            }
        }
        Ok(Self { level_masks })
    }

    /// The cumulative masks, coarse to fine
    pub fn level_masks(&self) -> &[u64] {
        &self.level_masks
    }

    /// The finest (largest) mask, covering every hierarchy bit
    pub fn full_mask(&self) -> u64 {
        *self
            .level_masks
            .last()
            .expect("hierarchy validated non-empty at construction")
    }
}

impl TryFrom<Vec<u64>> for HierarchyMask {
    type Error = crate::error::Error;

    fn try_from(level_masks: Vec<u64>) -> Result<Self> {
        Self::new(level_masks)
    }
}

impl From<HierarchyMask> for Vec<u64> {
    fn from(mask: HierarchyMask) -> Self {
        mask.level_masks
    }
}

/// A group of hierarchies whose redundancy is considered together
///
/// Mirrors the aggregation-group concept of the cube definition: hierarchy
/// elimination evaluates each group independently and takes the running
/// minimum across groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationGroup {
    /// Hierarchies declared by this group
    pub hierarchy_masks: Vec<HierarchyMask>,
}

impl AggregationGroup {
    /// Create a group from its hierarchies
    pub fn new(hierarchy_masks: Vec<HierarchyMask>) -> Self {
        Self { hierarchy_masks }
    }
}

/// Cube descriptor: row key plus aggregation-group definitions
///
/// Shared read-only by every `Cuboid` resolved against the cube (held behind
/// an `Arc`). Validated at construction: every hierarchy mask must stay within
/// the row-key full mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCubeDesc")]
pub struct CubeDesc {
    name: String,
    row_key: RowKeyDesc,
    aggregation_groups: Vec<AggregationGroup>,
}

impl CubeDesc {
    /// Create a validated cube descriptor
    pub fn new(
        name: impl Into<String>,
        row_key: RowKeyDesc,
        aggregation_groups: Vec<AggregationGroup>,
    ) -> Result<Self> {
        let full_mask = row_key.full_mask();
        for group in &aggregation_groups {
            for hierarchy in &group.hierarchy_masks {
                let mask = hierarchy.full_mask();
                if mask & !full_mask != 0 {
                    return Err(MetadataError::HierarchyOutsideRowKey { mask, full_mask }.into());
                }
            }
        }
        Ok(Self {
            name: name.into(),
            row_key,
            aggregation_groups,
        })
    }

    /// Cube name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Row-key definition
    pub fn row_key(&self) -> &RowKeyDesc {
        &self.row_key
    }

    /// Aggregation groups, in declaration order
    pub fn aggregation_groups(&self) -> &[AggregationGroup] {
        &self.aggregation_groups
    }

    /// Id of the base cuboid: every declared row-key bit set
    pub fn base_cuboid_id(&self) -> u64 {
        self.row_key.full_mask()
    }
}

/// Unvalidated deserialization shape for [`CubeDesc`]
#[derive(Deserialize)]
struct RawCubeDesc {
    name: String,
    row_key: RowKeyDesc,
    #[serde(default)]
    aggregation_groups: Vec<AggregationGroup>,
}

impl TryFrom<RawCubeDesc> for CubeDesc {
    type Error = crate::error::Error;

    fn try_from(raw: RawCubeDesc) -> Result<Self> {
        Self::new(raw.name, raw.row_key, raw.aggregation_groups)
    }
}
