//! Player state and seek surfaces

use std::collections::HashMap;

use bytes::Bytes;
use decode_bridge::{DecoderBackend, ReferenceSet};
use frame_cache::{DecodedFrameCache, LruCache};
use seek_planner::{min_switch_seek, min_track_seek, FrameDependency, SwitchSeek, TrackPath};
use video_metadata::{
    ChunkFetcher, FrameInfo, MetadataService, RasterHash, TrackId, MAX_NUM_FRAMES,
};

use crate::config::PlayerConfig;
use crate::error::PlayerError;
use crate::sequence::FrameInfoWrapper;

/// Which planner a seek is allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    /// Track-only backward walk.
    Track,
    /// Switch sequence, with a residual track walk if needed.
    Switch,
    /// Whichever of the two costs fewer bytes; ties go to the track plan.
    Minimum,
}

/// Sizes of the player's caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub rasters: usize,
    pub states: usize,
    pub chunks: usize,
}

/// Adaptive player over one multi-track video.
///
/// Owns every piece of mutable playback state; the metadata service, chunk
/// fetcher and decoder backend are collaborators the player only reads
/// through. All methods are called from a single thread.
pub struct Player<M, F, D: DecoderBackend> {
    pub(crate) metadata: M,
    pub(crate) fetcher: F,
    pub(crate) backend: D,

    pub(crate) cache: DecodedFrameCache<D::Raster, D::State>,
    pub(crate) chunk_cache: LruCache<Bytes>,

    /// Full frame listing per track, fetched once at construction.
    pub(crate) track_frames: HashMap<TrackId, Vec<FrameInfo>>,
    /// `(approximate raster, dri) -> SSIM`, from the metadata quality table.
    pub(crate) quality: HashMap<RasterHash, HashMap<u64, f64>>,

    pub(crate) current_frame_seq: Vec<FrameInfoWrapper>,
    /// Next frame of the sequence to fetch.
    pub(crate) current_download_pt_index: usize,
    /// Next frame of the sequence to decode.
    pub(crate) current_playhead_index: usize,
    pub(crate) downloaded_frame_bytes: u64,
}

impl<M, F, D> Player<M, F, D>
where
    M: MetadataService,
    F: ChunkFetcher,
    D: DecoderBackend,
{
    /// Build a player from one metadata query batch.
    ///
    /// Fetches every track's frame listing (paged by [`MAX_NUM_FRAMES`]) and
    /// the precomputed quality table up front.
    pub fn new(metadata: M, fetcher: F, backend: D, config: &PlayerConfig) -> Result<Self, PlayerError> {
        let mut track_frames = HashMap::new();
        for track_id in metadata.track_ids()? {
            let size = metadata.track_size(track_id)?;
            let mut frames = Vec::with_capacity(size);
            while frames.len() < size {
                let from = frames.len();
                let to = (from + MAX_NUM_FRAMES).min(size);
                let batch = metadata.frames(track_id, from, to)?;
                if batch.is_empty() {
                    break;
                }
                frames.extend(batch);
            }
            track_frames.insert(track_id, frames);
        }

        let mut quality: HashMap<RasterHash, HashMap<u64, f64>> = HashMap::new();
        for record in metadata.quality_records()? {
            quality
                .entry(record.approximate_raster)
                .or_default()
                .insert(record.original_raster_dri, record.quality);
        }

        let url = metadata.url()?;
        tracing::info!(
            tracks = track_frames.len(),
            width = metadata.video_width()?,
            height = metadata.video_height()?,
            url = %url,
            "player initialized"
        );

        Ok(Self {
            metadata,
            fetcher,
            backend,
            cache: DecodedFrameCache::new(
                config.raster_cache_capacity,
                config.state_cache_capacity,
            ),
            chunk_cache: LruCache::new(config.chunk_cache_capacity),
            track_frames,
            quality,
            current_frame_seq: Vec::new(),
            current_download_pt_index: 0,
            current_playhead_index: 0,
            downloaded_frame_bytes: 0,
        })
    }

    /// Materialize the raster with this output hash, planning over the
    /// allowed path type. `None` means no plan reaches the hash.
    pub fn get_raster(
        &mut self,
        output_hash: RasterHash,
        path_type: PathType,
    ) -> Result<Option<D::Raster>, PlayerError> {
        match path_type {
            PathType::Track => {
                match min_track_seek(&self.metadata, &self.cache, output_hash)? {
                    Some((path, deps)) => self.execute_track_seek(output_hash, path, deps).map(Some),
                    None => Ok(None),
                }
            }
            PathType::Switch => {
                match min_switch_seek(&self.metadata, &self.cache, output_hash)? {
                    Some(seek) => self.execute_switch_seek(output_hash, seek).map(Some),
                    None => Ok(None),
                }
            }
            PathType::Minimum => {
                let track = min_track_seek(&self.metadata, &self.cache, output_hash)?;
                let switch = min_switch_seek(&self.metadata, &self.cache, output_hash)?;
                if let Some((path, _)) = &track {
                    tracing::debug!(plan = %path, "track seek available");
                }
                if let Some(seek) = &switch {
                    tracing::debug!(plan = %seek.switch_path, "switch seek available");
                }
                match (track, switch) {
                    (Some((path, deps)), Some(seek)) => {
                        if path.cost <= seek.switch_path.cost {
                            self.execute_track_seek(output_hash, path, deps).map(Some)
                        } else {
                            self.execute_switch_seek(output_hash, seek).map(Some)
                        }
                    }
                    (Some((path, deps)), None) => {
                        self.execute_track_seek(output_hash, path, deps).map(Some)
                    }
                    (None, Some(seek)) => self.execute_switch_seek(output_hash, seek).map(Some),
                    (None, None) => Ok(None),
                }
            }
        }
    }

    fn execute_track_seek(
        &mut self,
        output_hash: RasterHash,
        path: TrackPath,
        dependencies: FrameDependency,
    ) -> Result<D::Raster, PlayerError> {
        tracing::debug!(plan = %path, "following track path");
        self.follow_track_path(&path, dependencies)?;
        Ok(self.raster_from_cache(output_hash))
    }

    fn execute_switch_seek(
        &mut self,
        output_hash: RasterHash,
        seek: SwitchSeek,
    ) -> Result<D::Raster, PlayerError> {
        tracing::debug!(plan = %seek.switch_path, "following switch path");
        let mut dependencies = seek.dependencies;
        if let Some(residual) = seek.residual {
            dependencies = self.follow_track_path(&residual, dependencies)?;
        }
        self.follow_switch_path(&seek.switch_path, dependencies)?;
        Ok(self.raster_from_cache(output_hash))
    }

    fn raster_from_cache(&mut self, output_hash: RasterHash) -> D::Raster {
        self.cache
            .rasters_mut()
            .get(output_hash)
            .expect("executed seek plan left the requested raster cached")
            .clone()
    }

    /// Cache-resolved decoder inputs for one frame.
    ///
    /// Absent source hashes mean the backend's defaults for the configured
    /// dimensions. A present hash missing from cache is a planner invariant
    /// violation: plans only reference what they resolve.
    pub(crate) fn decoder_inputs(&mut self, frame: &FrameInfo) -> (D::State, ReferenceSet<D::Raster>) {
        let mut refs = ReferenceSet::filled(self.backend.blank_raster());

        if let Some(hash) = frame.source_hashes.last {
            refs.last = self
                .cache
                .rasters_mut()
                .get(hash)
                .expect("last reference resolved by planner")
                .clone();
        }
        if let Some(hash) = frame.source_hashes.golden {
            refs.golden = self
                .cache
                .rasters_mut()
                .get(hash)
                .expect("golden reference resolved by planner")
                .clone();
        }
        if let Some(hash) = frame.source_hashes.alt {
            refs.alternate = self
                .cache
                .rasters_mut()
                .get(hash)
                .expect("alternate reference resolved by planner")
                .clone();
        }

        let state = match frame.source_hashes.state {
            Some(hash) => self
                .cache
                .states_mut()
                .get(hash)
                .expect("decoder state resolved by planner")
                .clone(),
            None => self.backend.initial_state(),
        };

        (state, refs)
    }

    /// SSIM of showing `hash` at displayed raster index `dri`. Pairs absent
    /// from the quality table score zero.
    pub(crate) fn quality_for(&self, hash: RasterHash, dri: u64) -> f64 {
        self.quality
            .get(&hash)
            .and_then(|by_dri| by_dri.get(&dri))
            .copied()
            .unwrap_or(0.0)
    }

    /// Read access to the decoded caches.
    pub fn cache(&self) -> &DecodedFrameCache<D::Raster, D::State> {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            rasters: self.cache.rasters().len(),
            states: self.cache.states().len(),
            chunks: self.chunk_cache.len(),
        }
    }

    /// Drop every decoded raster and state.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Total compressed bytes fetched through the download pipeline.
    pub fn downloaded_frame_bytes(&self) -> u64 {
        self.downloaded_frame_bytes
    }
}
