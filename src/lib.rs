//! cube-core - Cuboid identification, resolution, and caching
//!
//! This library is the translation layer of a multidimensional cube storage
//! engine: it resolves, for a query or build step, which pre-aggregated
//! combination of dimensions ("cuboid") should answer it, and computes the
//! bit-level relationship between the dimension set a caller needs and the
//! dimension set that was physically materialized. It provides:
//!
//! - Bitmask codec between dimension column sets and 64-bit cuboid ids
//! - Hierarchy elimination: collapsing dimension-hierarchy levels that a
//!   finer materialized level already subsumes
//! - Cuboid identification with base-cuboid short-circuit for measures that
//!   only aggregate at full granularity
//! - A concurrent registry memoizing resolved cuboids per cube generation
//! - The selection order query planning uses to prefer thinner cuboids
//!
//! Resolution of a requested id to a valid materialized one is delegated to
//! an external [`model::CuboidScheduler`]; this crate records and interprets
//! the answer but never decides materialization itself.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cuboid;
pub mod error;
pub mod model;

// Re-export main types
pub use cuboid::registry::CuboidRegistry;
pub use cuboid::{display_name, identify_cuboid_id, select_cmp, Cuboid};
pub use error::{Error, MetadataError, Result};
pub use model::{
    AggregationGroup, AggregationScope, ColumnRef, CubeDesc, CuboidScheduler, HierarchyMask,
    MeasureDesc, MeasureFunction, RowKeyColumn, RowKeyDesc,
};
