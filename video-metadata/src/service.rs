//! Query surface answered by a metadata backend

use crate::error::MetadataError;
use crate::types::{
    FrameId, FrameInfo, QualityRecord, RasterHash, SwitchInfo, TrackId, TrackPosition,
};

/// Upper bound on the number of frames returned by a single metadata query.
///
/// Callers page longer ranges; backends truncate oversized requests so a
/// single response stays bounded regardless of the caller.
pub const MAX_NUM_FRAMES: usize = 1000;

/// The metadata queries the player and its planners consume.
///
/// Implementations may block (a networked backend is expected to); every
/// other part of the player core is synchronous and non-blocking. Errors
/// propagate to the caller unchanged; the core performs no retries.
pub trait MetadataService {
    /// All track identifiers in the video.
    fn track_ids(&self) -> Result<Vec<TrackId>, MetadataError>;

    /// Number of frames in a track.
    fn track_size(&self, track_id: TrackId) -> Result<usize, MetadataError>;

    /// Frames of `track_id` in `[from, to)`, at most [`MAX_NUM_FRAMES`].
    fn frames(
        &self,
        track_id: TrackId,
        from: usize,
        to: usize,
    ) -> Result<Vec<FrameInfo>, MetadataError>;

    /// Frames of `track_id` from index `from` down to `to`, both inclusive,
    /// in decreasing index order. Callers page using [`MAX_NUM_FRAMES`].
    fn frames_reverse(
        &self,
        track_id: TrackId,
        from: usize,
        to: usize,
    ) -> Result<Vec<FrameInfo>, MetadataError>;

    /// Switch frames in `[switch_start, switch_end)` of the switch leaving
    /// `from_track_id` at `from_frame_index` toward `to_track_id`.
    fn switch_frames(
        &self,
        from_track_id: TrackId,
        to_track_id: TrackId,
        from_frame_index: usize,
        switch_start: usize,
        switch_end: usize,
    ) -> Result<Vec<FrameInfo>, MetadataError>;

    /// Every frame whose decode produces the raster with this hash.
    fn frames_by_output_hash(&self, hash: RasterHash) -> Result<Vec<FrameInfo>, MetadataError>;

    /// Every switch whose frame sequence produces (or contains) this frame.
    fn switches_with_frame(&self, frame_id: FrameId) -> Result<Vec<SwitchInfo>, MetadataError>;

    /// Switches leaving `track_id` whose departure index lies in `[lo, hi]`.
    fn switches_in_window(
        &self,
        track_id: TrackId,
        lo: usize,
        hi: usize,
    ) -> Result<Vec<SwitchInfo>, MetadataError>;

    /// Every `(track, index)` position at which this frame occurs.
    fn track_positions_by_frame_id(
        &self,
        frame_id: FrameId,
    ) -> Result<Vec<TrackPosition>, MetadataError>;

    /// Index of the frame of `track_id` that displays raster `dri`, or
    /// `None` when the track has no such displayed raster.
    fn frame_index_by_dri(
        &self,
        track_id: TrackId,
        dri: u64,
    ) -> Result<Option<usize>, MetadataError>;

    /// Tracks reachable from `track_id` through at least one switch.
    fn connected_track_ids(&self, track_id: TrackId) -> Result<Vec<TrackId>, MetadataError>;

    /// The full precomputed quality table.
    fn quality_records(&self) -> Result<Vec<QualityRecord>, MetadataError>;

    fn video_width(&self) -> Result<u32, MetadataError>;

    fn video_height(&self) -> Result<u32, MetadataError>;

    /// Location of the compressed frame store, identifying the fetcher
    /// endpoint out-of-band.
    fn url(&self) -> Result<String, MetadataError>;
}
