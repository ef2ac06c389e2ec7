//! Cuboid identification, resolution, and ordering
//!
//! This module is the translation layer between a logical request (a set of
//! dimension columns plus aggregate metrics) and the physical materialized
//! layout (a cuboid identified by an integer bitmask):
//!
//! ```text
//! (dimensions, metrics)
//!        │
//!        ▼
//! ┌────────────────┐
//! │   Identify     │  base-cuboid short-circuit, else bitmask encode
//! └───────┬────────┘
//!         │ requested id
//!         ▼
//! ┌────────────────┐
//! │   Resolve      │  scheduler picks the nearest valid materialized id
//! └───────┬────────┘
//!         │ resolved id
//!         ▼
//! ┌────────────────┐
//! │   Cuboid       │  immutable value object, cached in the registry
//! └────────────────┘
//! ```
//!
//! The resolved id may differ from the requested one; hierarchy elimination
//! decides whether that difference requires extra in-memory aggregation.

pub mod bitmask;
pub mod hierarchy;
pub mod mapping;
pub mod registry;

use crate::error::Result;
use crate::model::{AggregationScope, ColumnRef, CubeDesc};
use mapping::GridTableMapping;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

// =============================================================================
// Identification
// =============================================================================

/// Compute the cuboid id that should answer a request
///
/// If any metric's measure type aggregates only at the base cuboid, the base
/// cuboid id is returned immediately, regardless of the dimension set (even
/// an empty one). Otherwise the dimensions are encoded through the bitmask
/// codec. Errors if a dimension column has no row-key bit index.
pub fn identify_cuboid_id<'a, M>(
    cube_desc: &CubeDesc,
    dimensions: impl IntoIterator<Item = &'a ColumnRef>,
    metrics: impl IntoIterator<Item = &'a M>,
) -> Result<u64>
where
    M: AggregationScope + ?Sized + 'a,
{
    for metric in metrics {
        if metric.requires_full_cuboid_aggregation() {
            return Ok(cube_desc.base_cuboid_id());
        }
    }
    bitmask::encode(dimensions, cube_desc.row_key())
}

// =============================================================================
// Selection ordering and display
// =============================================================================

/// Total order over cuboid ids used by query planning; smaller is better
///
/// Primary key: population count ascending (fewer materialized dimensions
/// first). Secondary key: numeric value ascending.
///
/// # Example
///
/// ```rust
/// use cube_core::cuboid::select_cmp;
/// use std::cmp::Ordering;
///
/// assert_eq!(select_cmp(0b0001, 0b0011), Ordering::Less);
/// assert_eq!(select_cmp(0b0011, 0b0101), Ordering::Less);
/// ```
pub fn select_cmp(a: u64, b: u64) -> Ordering {
    a.count_ones().cmp(&b.count_ones()).then(a.cmp(&b))
}

/// Human-readable bit string for a cuboid id
///
/// One character per dimension index from 0 to `dimension_count - 1` (`'1'`
/// if set, else `'0'`), then the whole string reversed so the
/// most-significant relevant dimension prints first. Purely diagnostic;
/// never used in comparison or as a storage key.
pub fn display_name(cuboid_id: u64, dimension_count: usize) -> String {
    (0..dimension_count)
        .map(|i| {
            if i < 64 && cuboid_id >> i & 1 == 1 {
                '1'
            } else {
                '0'
            }
        })
        .rev()
        .collect()
}

// =============================================================================
// Cuboid value object
// =============================================================================

/// One resolved cuboid: the unit of pre-aggregated storage a request maps to
///
/// Immutable after construction. Records both the originally requested id
/// (which may be unmaterialized) and the id actually used, as certified by
/// the scheduler. Identity, equality, hashing, and ordering are defined
/// solely by the resolved id: two cuboids resolved from different requests to
/// the same physical cuboid are equal.
#[derive(Debug, Clone)]
pub struct Cuboid {
    cube_desc: Arc<CubeDesc>,
    requested_id: u64,
    resolved_id: u64,
    resolved_id_bytes: [u8; 8],
    dimension_columns: Vec<ColumnRef>,
    requires_post_aggregation: bool,
    grid_mapping: OnceLock<GridTableMapping>,
}

impl Cuboid {
    /// Construct from a requested id and the scheduler-certified resolved id
    pub(crate) fn new(cube_desc: Arc<CubeDesc>, requested_id: u64, resolved_id: u64) -> Self {
        let dimension_columns = bitmask::decode(resolved_id, cube_desc.row_key());
        let diff = resolved_id ^ requested_id;
        let requires_post_aggregation =
            hierarchy::eliminate_hierarchy(diff, requested_id, cube_desc.aggregation_groups()) != 0;
        Self {
            requested_id,
            resolved_id,
            resolved_id_bytes: resolved_id.to_be_bytes(),
            dimension_columns,
            requires_post_aggregation,
            grid_mapping: OnceLock::new(),
            cube_desc,
        }
    }

    /// Construct a cuboid known a priori to be exactly materialized
    ///
    /// Bypasses resolution entirely: requested and resolved ids are both
    /// `cuboid_id`, and no post-aggregation is ever required. Used for
    /// mandatory cuboids during cube build.
    pub fn find_for_mandatory(cube_desc: &Arc<CubeDesc>, cuboid_id: u64) -> Self {
        Self::new(Arc::clone(cube_desc), cuboid_id, cuboid_id)
    }

    /// Descriptor of the owning cube
    pub fn cube_desc(&self) -> &Arc<CubeDesc> {
        &self.cube_desc
    }

    /// The bitmask originally asked for; may be unmaterialized
    pub fn requested_id(&self) -> u64 {
        self.requested_id
    }

    /// The bitmask actually used, certified valid by the scheduler
    pub fn resolved_id(&self) -> u64 {
        self.resolved_id
    }

    /// Big-endian byte encoding of the resolved id, for storage keys
    pub fn id_bytes(&self) -> &[u8; 8] {
        &self.resolved_id_bytes
    }

    /// Dimension columns of the resolved cuboid, in ascending bit-index order
    ///
    /// This order is structurally significant: it is the row-key layout order
    /// downstream, not the caller's insertion order.
    pub fn dimension_columns(&self) -> &[ColumnRef] {
        &self.dimension_columns
    }

    /// True iff answering the original request from this cuboid needs extra
    /// in-memory aggregation
    ///
    /// Computed once at construction: the request/resolution difference,
    /// passed through hierarchy elimination, is non-zero.
    pub fn requires_post_aggregation(&self) -> bool {
        self.requires_post_aggregation
    }

    /// Columns that remain aggregation-relevant after hierarchy collapse
    ///
    /// Reduces the resolved id with the original request driving the
    /// membership test, then decodes the survivors.
    pub fn aggregation_columns(&self) -> Vec<ColumnRef> {
        let aggr_id = hierarchy::eliminate_hierarchy(
            self.resolved_id,
            self.requested_id,
            self.cube_desc.aggregation_groups(),
        );
        bitmask::decode(aggr_id, self.cube_desc.row_key())
    }

    /// Grid-table layout for this cuboid, computed once and memoized
    ///
    /// Safe under concurrent first access; the mapping is a pure function of
    /// the resolved id, so a racing recomputation yields the same value.
    pub fn grid_mapping(&self) -> &GridTableMapping {
        self.grid_mapping
            .get_or_init(|| GridTableMapping::new(&self.dimension_columns))
    }
}

impl PartialEq for Cuboid {
    fn eq(&self, other: &Self) -> bool {
        self.resolved_id == other.resolved_id
    }
}

impl Eq for Cuboid {}

impl Hash for Cuboid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.resolved_id.hash(state);
    }
}

impl PartialOrd for Cuboid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cuboid {
    fn cmp(&self, other: &Self) -> Ordering {
        self.resolved_id.cmp(&other.resolved_id)
    }
}

impl fmt::Display for Cuboid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cuboid [id={}]", self.resolved_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AggregationGroup, HierarchyMask, MeasureDesc, MeasureFunction, RowKeyColumn, RowKeyDesc,
    };

    fn col(name: &str) -> ColumnRef {
        ColumnRef::new("SALES", name)
    }

    /// year(b0) → quarter(b1) → month(b2), plus category(b3) and region(b4)
    fn cube() -> Arc<CubeDesc> {
        let row_key = RowKeyDesc::new(vec![
            RowKeyColumn::new(col("YEAR"), 0),
            RowKeyColumn::new(col("QUARTER"), 1),
            RowKeyColumn::new(col("MONTH"), 2),
            RowKeyColumn::new(col("CATEGORY"), 3),
            RowKeyColumn::new(col("REGION"), 4),
        ])
        .unwrap();
        let groups = vec![AggregationGroup::new(vec![
            HierarchyMask::new(vec![0b001, 0b011, 0b111]).unwrap(),
        ])];
        Arc::new(CubeDesc::new("sales_cube", row_key, groups).unwrap())
    }

    #[test]
    fn test_identify_encodes_dimensions() {
        let cube = cube();
        let dims = [col("MONTH"), col("REGION")];
        let metrics = [MeasureDesc::without_column("cnt", MeasureFunction::Count)];
        let id = identify_cuboid_id(&cube, dims.iter(), metrics.iter()).unwrap();
        assert_eq!(id, 0b10100);
    }

    #[test]
    fn test_identify_base_cuboid_short_circuit() {
        let cube = cube();
        let metrics = [
            MeasureDesc::without_column("cnt", MeasureFunction::Count),
            MeasureDesc::new("raw_amount", MeasureFunction::Raw, col("AMOUNT")),
        ];
        // Even an empty dimension set lands on the base cuboid.
        let id = identify_cuboid_id(&cube, [], metrics.iter()).unwrap();
        assert_eq!(id, cube.base_cuboid_id());
    }

    #[test]
    fn test_identify_propagates_unknown_column() {
        let cube = cube();
        let dims = [col("WEEK")];
        let metrics: [MeasureDesc; 0] = [];
        assert!(identify_cuboid_id(&cube, dims.iter(), metrics.iter()).is_err());
    }

    #[test]
    fn test_mandatory_path_bypasses_resolution() {
        let cube = cube();
        let cuboid = Cuboid::find_for_mandatory(&cube, 0b01010);
        assert_eq!(cuboid.requested_id(), 0b01010);
        assert_eq!(cuboid.resolved_id(), 0b01010);
        assert!(!cuboid.requires_post_aggregation());
    }

    #[test]
    fn test_post_aggregation_hierarchy_collapse() {
        let cube = cube();

        // Requested month+category, resolved carries year+quarter too: the
        // finer month level subsumes them, no post-aggregation.
        let subsumed = Cuboid::new(Arc::clone(&cube), 0b01100, 0b01111);
        assert!(!subsumed.requires_post_aggregation());

        // Requested year+category, resolved at the base: the extra month,
        // quarter, and region bits are not hierarchy-redundant for a
        // year-level grouping.
        let coarser = Cuboid::new(Arc::clone(&cube), 0b01001, 0b11111);
        assert!(coarser.requires_post_aggregation());
    }

    #[test]
    fn test_dimension_columns_in_bit_order() {
        let cube = cube();
        let cuboid = Cuboid::new(Arc::clone(&cube), 0b10001, 0b10001);
        assert_eq!(
            cuboid.dimension_columns(),
            &[col("YEAR"), col("REGION")]
        );
        assert_eq!(cuboid.id_bytes(), &0b10001u64.to_be_bytes());
    }

    #[test]
    fn test_aggregation_columns_collapse_hierarchy() {
        let cube = cube();
        // Requested month only, resolved at base: year and quarter collapse
        // out of the aggregation column set; the rest survive.
        let cuboid = Cuboid::new(Arc::clone(&cube), 0b00100, 0b11111);
        assert_eq!(
            cuboid.aggregation_columns(),
            &[col("MONTH"), col("CATEGORY"), col("REGION")]
        );
    }

    #[test]
    fn test_equality_by_resolved_id_only() {
        let cube = cube();
        let a = Cuboid::new(Arc::clone(&cube), 0b00100, 0b00111);
        let b = Cuboid::new(Arc::clone(&cube), 0b00111, 0b00111);
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_select_cmp_prefers_thinner_cuboids() {
        let mut ids = vec![0b0101, 0b0011, 0b0001, 0b0111];
        ids.sort_by(|a, b| select_cmp(*a, *b));
        assert_eq!(ids, vec![0b0001, 0b0011, 0b0101, 0b0111]);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(0b101, 3), "101");
        assert_eq!(display_name(0b001, 3), "001");
        assert_eq!(display_name(0b001, 5), "00001");
        assert_eq!(display_name(0, 4), "0000");
    }

    #[test]
    fn test_display_format() {
        let cube = cube();
        let cuboid = Cuboid::find_for_mandatory(&cube, 21);
        assert_eq!(cuboid.to_string(), "Cuboid [id=21]");
    }

    #[test]
    fn test_grid_mapping_memoized() {
        let cube = cube();
        let cuboid = Cuboid::find_for_mandatory(&cube, 0b00101);
        let first = cuboid.grid_mapping() as *const GridTableMapping;
        let second = cuboid.grid_mapping() as *const GridTableMapping;
        assert_eq!(first, second);
        assert_eq!(cuboid.grid_mapping().dimension_count(), 2);
        assert_eq!(cuboid.grid_mapping().index_of(&col("MONTH")), Some(1));
    }
}
