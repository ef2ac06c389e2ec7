//! External best-match resolver contract
//!
//! The decision of which cuboids were actually materialized for a cube, and
//! how to resolve a requested cuboid to the nearest valid one, belongs to the
//! cube's scheduler. This crate consumes that decision through the
//! [`CuboidScheduler`] trait and trusts its answers.

use super::CubeDesc;
use std::sync::Arc;

/// Per-cube (or per-segment) cuboid resolver
///
/// One scheduler exists per cube/segment generation, identified by a stable
/// cache key. The registry keys its cache by `cache_key()`, so a metadata or
/// materialization change must surface as a new key (or an explicit cache
/// clear for the old one).
pub trait CuboidScheduler: Send + Sync {
    /// Stable identifier for this cube's current scheduler/metadata generation
    fn cache_key(&self) -> &str;

    /// Descriptor of the cube this scheduler resolves for
    fn cube_desc(&self) -> &Arc<CubeDesc>;

    /// Resolve a requested cuboid id to the nearest valid materialized one
    ///
    /// Precondition (not re-checked by this crate): the returned id is a
    /// materialized, valid cuboid able to answer `requested`, defaulting to
    /// the base cuboid when no closer match exists. The answer is used as
    /// given; a scheduler returning an unmaterialized id is a collaborator
    /// bug.
    fn find_best_match_cuboid(&self, requested: u64) -> u64;
}
