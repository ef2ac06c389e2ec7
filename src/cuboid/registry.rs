//! Cuboid registry: memoized resolution keyed by cube generation
//!
//! Resolution of a cuboid id is cheap but not free (a scheduler call plus
//! value-object construction), and query planning resolves the same handful
//! of ids over and over. The registry memoizes resolved cuboids behind a
//! two-level concurrent map: cache key (one per cube's scheduler/metadata
//! generation) → requested id → cuboid.
//!
//! The registry is an explicit object owned by the caller's session or
//! planning context; there is no process-global instance. Dropping it, or
//! clearing a cache key, is the invalidation boundary. Concurrent get-or-
//! create needs no external locking: on a racing miss both threads may
//! construct, and either value is acceptable since cuboids are equal by
//! resolved id (last write wins, no lost updates).

use super::Cuboid;
use crate::error::Result;
use crate::model::{AggregationScope, ColumnRef, CuboidScheduler};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Process-lifetime cache of resolved cuboids
///
/// # Example
///
/// ```rust,ignore
/// let registry = CuboidRegistry::new();
/// let cuboid = registry.identify(&scheduler, &dimensions, &metrics)?;
/// assert_eq!(cuboid, registry.find_by_id(&scheduler, cuboid.requested_id()));
/// ```
#[derive(Debug, Default)]
pub struct CuboidRegistry {
    cache: DashMap<String, Arc<DashMap<u64, Arc<Cuboid>>>>,
}

impl CuboidRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Resolve a logical request to a cuboid
    ///
    /// The sole entry point for query planning: identifies the requested id
    /// from the dimension and metric sets, then resolves and caches it.
    /// Errors only on a metadata contract violation in identification.
    pub fn identify<'a, M>(
        &self,
        scheduler: &dyn CuboidScheduler,
        dimensions: impl IntoIterator<Item = &'a ColumnRef>,
        metrics: impl IntoIterator<Item = &'a M>,
    ) -> Result<Arc<Cuboid>>
    where
        M: AggregationScope + ?Sized + 'a,
    {
        let requested_id = super::identify_cuboid_id(scheduler.cube_desc(), dimensions, metrics)?;
        Ok(self.find_by_id(scheduler, requested_id))
    }

    /// Get or create the cuboid for a requested id
    ///
    /// On a cache miss the scheduler is asked for the nearest valid
    /// materialized id and a new cuboid is constructed and cached. The
    /// scheduler call happens outside any map lock, so a racing miss may
    /// construct twice; both results are value-equal.
    pub fn find_by_id(&self, scheduler: &dyn CuboidScheduler, requested_id: u64) -> Arc<Cuboid> {
        let per_cube = {
            let entry = self
                .cache
                .entry(scheduler.cache_key().to_owned())
                .or_default();
            Arc::clone(entry.value())
        };

        if let Some(cuboid) = per_cube.get(&requested_id) {
            return Arc::clone(cuboid.value());
        }

        let resolved_id = scheduler.find_best_match_cuboid(requested_id);
        debug!(
            cache_key = scheduler.cache_key(),
            requested_id, resolved_id, "cuboid cache miss, constructing"
        );
        let cuboid = Arc::new(Cuboid::new(
            Arc::clone(scheduler.cube_desc()),
            requested_id,
            resolved_id,
        ));
        per_cube.insert(requested_id, Arc::clone(&cuboid));
        cuboid
    }

    /// Resolve the base cuboid: every declared row-key bit set
    pub fn base_cuboid(&self, scheduler: &dyn CuboidScheduler) -> Arc<Cuboid> {
        self.find_by_id(scheduler, scheduler.cube_desc().base_cuboid_id())
    }

    /// Drop every cached cuboid for every cube
    pub fn clear(&self) {
        debug!("clearing cuboid cache for all cubes");
        self.cache.clear();
    }

    /// Drop cached cuboids for one cache key; no-op if the key is absent
    pub fn clear_key(&self, cache_key: &str) {
        if self.cache.remove(cache_key).is_some() {
            debug!(cache_key, "cleared cuboid cache");
        }
    }

    /// Drop cached cuboids for a scheduler's current cache key
    pub fn clear_for(&self, scheduler: &dyn CuboidScheduler) {
        self.clear_key(scheduler.cache_key());
    }

    /// Total number of cached cuboids across all cubes
    pub fn entry_count(&self) -> usize {
        self.cache.iter().map(|per_cube| per_cube.len()).sum()
    }
}
