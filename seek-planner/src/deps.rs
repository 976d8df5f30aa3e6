//! Unresolved-reference tracking for a tentative frame walk

use std::collections::{HashMap, HashSet};

use frame_cache::ReferenceLookup;
use video_metadata::FrameInfo;

/// Which kind of decoded object a dependency names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    Raster,
    State,
}

/// One reference a frame walk needs in cache before it can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DependencyVertex {
    pub kind: DependencyKind,
    pub hash: u64,
}

/// Reference counts over the dependencies of a tentative frame sequence.
///
/// The same raster hash is often consumed by many frames in a window;
/// counting keeps its fetch from being charged twice and keeps a vertex
/// unresolved until its last dependent is satisfied. Invariant: a vertex is
/// in the unresolved set exactly when its count is positive.
///
/// Plan attempts each own a fresh `FrameDependency`; abandoning an attempt
/// leaves no counters behind.
#[derive(Debug, Clone, Default)]
pub struct FrameDependency {
    ref_counts: HashMap<DependencyVertex, usize>,
    unresolved: HashSet<DependencyVertex>,
}

impl FrameDependency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Charge one more dependent of `hash`. Returns the new count.
    pub fn increase_count(&mut self, kind: DependencyKind, hash: u64) -> usize {
        let vertex = DependencyVertex { kind, hash };
        let count = self.ref_counts.entry(vertex).or_insert(0);
        *count += 1;
        self.unresolved.insert(vertex);
        *count
    }

    /// Relieve one dependent of `hash`. Returns the new count.
    ///
    /// Counts never go negative; reaching zero resolves the vertex and
    /// removes it from the unresolved set.
    pub fn decrease_count(&mut self, kind: DependencyKind, hash: u64) -> usize {
        let vertex = DependencyVertex { kind, hash };
        match self.ref_counts.get_mut(&vertex) {
            Some(count) if *count > 1 => {
                *count -= 1;
                *count
            }
            Some(_) => {
                self.ref_counts.remove(&vertex);
                self.unresolved.remove(&vertex);
                0
            }
            None => 0,
        }
    }

    /// Current count for `hash`, zero when untracked.
    pub fn count(&self, kind: DependencyKind, hash: u64) -> usize {
        self.ref_counts
            .get(&DependencyVertex { kind, hash })
            .copied()
            .unwrap_or(0)
    }

    /// Account one frame visited while walking *backward* toward a seek
    /// origin.
    ///
    /// The frame's targets are resolved (this frame will produce them
    /// earlier in the executed sequence than anything charged so far), then
    /// each source reference missing from the cache is charged.
    pub fn update_dependencies(&mut self, frame: &FrameInfo, cache: &(impl ReferenceLookup + ?Sized)) {
        self.resolve(DependencyKind::Raster, frame.target_hashes.output);
        self.resolve(DependencyKind::State, frame.target_hashes.state);

        for hash in frame.source_hashes.rasters().into_iter().flatten() {
            if !cache.has_raster(hash) {
                self.increase_count(DependencyKind::Raster, hash);
            }
        }
        if let Some(hash) = frame.source_hashes.state {
            if !cache.has_state(hash) {
                self.increase_count(DependencyKind::State, hash);
            }
        }
    }

    /// Account one frame decoded while *executing* a plan forward.
    ///
    /// Mirrors the backward pass: each source reference still missing from
    /// the cache was charged during planning and is now being consumed from
    /// a just-produced output, so its count is relieved. This lets one
    /// `FrameDependency` flow through chained plans (residual track path,
    /// then switch path).
    pub fn update_dependencies_forward(&mut self, frame: &FrameInfo, cache: &(impl ReferenceLookup + ?Sized)) {
        for hash in frame.source_hashes.rasters().into_iter().flatten() {
            if !cache.has_raster(hash) {
                self.decrease_count(DependencyKind::Raster, hash);
            }
        }
        if let Some(hash) = frame.source_hashes.state {
            if !cache.has_state(hash) {
                self.decrease_count(DependencyKind::State, hash);
            }
        }
    }

    /// Whether every charged dependency has been resolved.
    pub fn all_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Number of vertices still unresolved.
    pub fn unresolved_len(&self) -> usize {
        self.unresolved.len()
    }

    /// Resolve a vertex outright, dropping its count.
    fn resolve(&mut self, kind: DependencyKind, hash: u64) {
        let vertex = DependencyVertex { kind, hash };
        self.ref_counts.remove(&vertex);
        self.unresolved.remove(&vertex);
    }
}
