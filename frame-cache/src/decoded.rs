//! Paired raster/state cache populated after each decode

use decode_bridge::{ContentHashed, ReferenceSet};

use crate::LruCache;

/// Read-only view of the decoded caches.
///
/// This is the seam the seek planners consult: a dependency counts as
/// resolved exactly when the corresponding cache holds its hash. Lookups do
/// not touch recency order, so a planning pass leaves the caches untouched.
pub trait ReferenceLookup {
    fn has_raster(&self, hash: u64) -> bool;
    fn has_state(&self, hash: u64) -> bool;
}

/// The raster cache and decoder-state cache, kept in step.
///
/// After every decode, [`DecodedFrameCache::insert_decode`] publishes the
/// decoder's three reference rasters and its state in one call, so an
/// observer never sees one cache updated without the other.
pub struct DecodedFrameCache<R, S> {
    rasters: LruCache<R>,
    states: LruCache<S>,
}

impl<R, S> DecodedFrameCache<R, S>
where
    R: ContentHashed + Clone,
    S: ContentHashed + Clone,
{
    /// Create the pair with independent capacities.
    ///
    /// Rasters are much larger than states, so the two are bounded
    /// separately.
    pub fn new(raster_capacity: usize, state_capacity: usize) -> Self {
        Self {
            rasters: LruCache::new(raster_capacity),
            states: LruCache::new(state_capacity),
        }
    }

    /// Publish a decode's reference rasters and state under their hashes.
    pub fn insert_decode(&mut self, refs: &ReferenceSet<R>, state: &S) {
        self.rasters.put(refs.last.content_hash(), refs.last.clone());
        self.rasters.put(refs.golden.content_hash(), refs.golden.clone());
        self.rasters
            .put(refs.alternate.content_hash(), refs.alternate.clone());
        self.states.put(state.content_hash(), state.clone());
    }

    /// Publish a single raster (the shown output of a decode).
    pub fn insert_raster(&mut self, raster: &R) {
        self.rasters.put(raster.content_hash(), raster.clone());
    }

    pub fn rasters(&self) -> &LruCache<R> {
        &self.rasters
    }

    pub fn rasters_mut(&mut self) -> &mut LruCache<R> {
        &mut self.rasters
    }

    pub fn states(&self) -> &LruCache<S> {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut LruCache<S> {
        &mut self.states
    }

    /// Total number of cached rasters and states.
    pub fn size(&self) -> usize {
        self.rasters.len() + self.states.len()
    }

    /// Drop every cached raster and state.
    pub fn clear(&mut self) {
        self.rasters.clear();
        self.states.clear();
    }
}

impl<R, S> ReferenceLookup for DecodedFrameCache<R, S> {
    fn has_raster(&self, hash: u64) -> bool {
        self.rasters.has(hash)
    }

    fn has_state(&self, hash: u64) -> bool {
        self.states.has(hash)
    }
}
