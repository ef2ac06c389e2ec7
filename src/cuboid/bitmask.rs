//! Bitmask codec between dimension column sets and cuboid ids
//!
//! A cuboid id is a `u64` with one bit per row-key column, at the column's
//! declared bit index. Encoding is an OR-fold (duplicates are idempotent);
//! decoding walks the row-key definition in ascending bit-index order, which
//! is the canonical dimension order for row-key layout downstream, not the
//! caller's insertion order.

use crate::error::Result;
use crate::model::{ColumnRef, RowKeyDesc};

/// Encode a set of dimension columns into a cuboid id
///
/// Errors if any column has no bit-index assignment in the row key; that is
/// a metadata contract violation and is never defaulted.
///
/// # Example
///
/// ```rust
/// use cube_core::cuboid::bitmask;
/// use cube_core::model::{ColumnRef, RowKeyColumn, RowKeyDesc};
///
/// let year = ColumnRef::new("SALES", "YEAR");
/// let region = ColumnRef::new("SALES", "REGION");
/// let row_key = RowKeyDesc::new(vec![
///     RowKeyColumn::new(year.clone(), 0),
///     RowKeyColumn::new(region.clone(), 1),
/// ])
/// .unwrap();
///
/// let id = bitmask::encode([&region, &year], &row_key).unwrap();
/// assert_eq!(id, 0b11);
/// ```
pub fn encode<'a, I>(columns: I, row_key: &RowKeyDesc) -> Result<u64>
where
    I: IntoIterator<Item = &'a ColumnRef>,
{
    let mut cuboid_id = 0u64;
    for column in columns {
        let index = row_key.column_bit_index(column)?;
        cuboid_id |= 1u64 << index;
    }
    Ok(cuboid_id)
}

/// Decode a cuboid id into its dimension columns
///
/// Returns columns in ascending bit-index order. Bits outside the row-key
/// definition are ignored; this is a total function.
pub fn decode(cuboid_id: u64, row_key: &RowKeyDesc) -> Vec<ColumnRef> {
    row_key
        .columns()
        .iter()
        .filter(|col| cuboid_id & (1u64 << col.bit_index) != 0)
        .map(|col| col.column.clone())
        .collect()
}
