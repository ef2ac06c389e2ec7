//! Hierarchy elimination over cuboid ids
//!
//! A hierarchy (e.g. year → quarter → month) makes the coarser level's bit
//! redundant once the request touches a finer level: a cuboid that
//! materialized the finer level can answer the coarser grouping without the
//! coarser bit set. This module computes the minimal equivalent bitmask under
//! that rule.

use crate::model::AggregationGroup;

/// Collapse hierarchy-redundant bits out of `id`
///
/// `id` is the mask being reduced; `input_id` is the *originally requested*
/// id and drives the membership test — the two differ when reducing the
/// request/resolution difference or the resolved id itself. Walks every
/// hierarchy of every aggregation group from the finest level downward: where
/// the request touched the bit distinguishing two adjacent levels, the
/// coarser level's mask is dropped from the working value. The result is the
/// running unsigned minimum across all qualifying hierarchies and groups
/// (`temp` restarts from `id` per group, the minimum carries across groups);
/// lower numeric value means a more collapsed mask, and the exact value feeds
/// downstream row-key encoding, so the iteration shape is load-bearing.
///
/// Total and pure: never fails, never allocates.
pub fn eliminate_hierarchy(id: u64, input_id: u64, groups: &[AggregationGroup]) -> u64 {
    let mut final_id = id;

    for group in groups {
        let mut temp = id;
        for hierarchy in &group.hierarchy_masks {
            let masks = hierarchy.level_masks();
            for i in (1..masks.len()).rev() {
                let bit = masks[i] ^ masks[i - 1];
                if input_id & bit != 0 {
                    temp &= !masks[i - 1];
                    if temp < final_id {
                        final_id = temp;
                    }
                }
            }
        }
    }

    final_id
}
