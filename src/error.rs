//! Error types for cuboid resolution
//!
//! The only failing class of operations in this crate is metadata contract
//! violation: a caller handed us a dimension or descriptor that does not match
//! the cube's row-key definition. Everything else (bitmask arithmetic,
//! hierarchy elimination, ordering, display formatting) is total over
//! well-formed inputs. Cache misses are never errors; they trigger
//! construction.

use crate::model::ColumnRef;
use thiserror::Error;

/// Main error type for cuboid resolution
#[derive(Error, Debug)]
pub enum Error {
    /// Cube metadata contract violation
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),
}

/// Metadata contract violations
///
/// These indicate a corrupt or mismatched cube definition and are fatal to
/// the calling resolution. They are never silently defaulted.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// A dimension column has no bit-index assignment in the row key
    #[error("Column {column} has no row-key bit index")]
    ColumnNotInRowKey {
        /// The unassigned column
        column: ColumnRef,
    },

    /// Two row-key columns were assigned the same bit index
    #[error("Bit index {bit_index} assigned to both {first} and {second}")]
    DuplicateBitIndex {
        /// The shared bit index
        bit_index: u32,
        /// First column holding the index
        first: ColumnRef,
        /// Second column holding the same index
        second: ColumnRef,
    },

    /// A bit index does not fit the 64-bit cuboid id space
    #[error("Bit index {bit_index} for column {column} exceeds the 64-bit id space")]
    BitIndexOutOfRange {
        /// The offending column
        column: ColumnRef,
        /// Its declared bit index
        bit_index: u32,
    },

    /// Row key declares no columns at all
    #[error("Row key declares no columns")]
    EmptyRowKey,

    /// Hierarchy declares no level masks
    #[error("Hierarchy declares no level masks")]
    EmptyHierarchy,

    /// Hierarchy level masks are not strictly cumulative
    #[error("Hierarchy level {level} mask {mask:#b} is not a strict superset of the previous level")]
    NonMonotonicHierarchy {
        /// Index of the offending level
        level: usize,
        /// The offending mask
        mask: u64,
    },

    /// Hierarchy mask references bits outside the cube's row key
    #[error("Hierarchy mask {mask:#b} has bits outside the row-key full mask {full_mask:#b}")]
    HierarchyOutsideRowKey {
        /// The offending mask
        mask: u64,
        /// The cube's full row-key mask
        full_mask: u64,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
