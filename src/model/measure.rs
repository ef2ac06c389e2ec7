//! Measure classification for cuboid identification
//!
//! Cuboid identification needs exactly one fact about a metric: whether its
//! measure type can only be aggregated at the base cuboid. That capability is
//! expressed as the [`AggregationScope`] trait so the resolution core stays
//! decoupled from the concrete measure-type library.

use super::ColumnRef;
use serde::{Deserialize, Serialize};

/// Capability interface: where can this measure be aggregated?
///
/// Implemented per measure-type variant. A measure that answers `true`
/// forces any query touching it onto the base cuboid, regardless of the
/// requested dimension set.
pub trait AggregationScope {
    /// True iff this measure aggregates only at the full (base) cuboid
    fn requires_full_cuboid_aggregation(&self) -> bool;
}

/// Built-in measure functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureFunction {
    /// Sum of a numeric column
    Sum,
    /// Row count
    Count,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
    /// Approximate distinct count
    CountDistinct,
    /// Top-N ranking measure
    TopN,
    /// Approximate percentile
    Percentile,
    /// Raw value capture; only meaningful against unaggregated rows
    Raw,
    /// Extended column lookup; rides along with the base cuboid rows
    ExtendedColumn,
}

impl AggregationScope for MeasureFunction {
    fn requires_full_cuboid_aggregation(&self) -> bool {
        // Raw and extended-column measures carry per-row payloads that any
        // pre-aggregated cuboid would have collapsed away.
        matches!(self, MeasureFunction::Raw | MeasureFunction::ExtendedColumn)
    }
}

/// An aggregate metric requested by a query or declared by the cube
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureDesc {
    /// Measure name, e.g. `"total_amount"`
    pub name: String,
    /// The aggregation function
    pub function: MeasureFunction,
    /// Input column; `None` for column-less functions such as `Count`
    pub column: Option<ColumnRef>,
}

impl MeasureDesc {
    /// Create a measure over a column
    pub fn new(name: impl Into<String>, function: MeasureFunction, column: ColumnRef) -> Self {
        Self {
            name: name.into(),
            function,
            column: Some(column),
        }
    }

    /// Create a column-less measure, e.g. a plain row count
    pub fn without_column(name: impl Into<String>, function: MeasureFunction) -> Self {
        Self {
            name: name.into(),
            function,
            column: None,
        }
    }
}

impl AggregationScope for MeasureDesc {
    fn requires_full_cuboid_aggregation(&self) -> bool {
        self.function.requires_full_cuboid_aggregation()
    }
}
