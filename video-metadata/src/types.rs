//! Frame, track and switch descriptors

/// Identifier of one track (quality level).
pub type TrackId = u64;

/// Unique identifier of one compressed frame.
pub type FrameId = u64;

/// 64-bit content fingerprint of a decoded raster.
pub type RasterHash = u64;

/// 64-bit content fingerprint of a decoder state.
pub type StateHash = u64;

/// The references a frame consumes, by content hash.
///
/// Each slot is present or absent; an absent slot means the decoder's default
/// reference (or fresh state) for the configured dimensions is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceHashes {
    pub last: Option<RasterHash>,
    pub golden: Option<RasterHash>,
    pub alt: Option<RasterHash>,
    pub state: Option<StateHash>,
}

impl SourceHashes {
    /// The three raster slots in decoder order (last, golden, alternate).
    pub fn rasters(&self) -> [Option<RasterHash>; 3] {
        [self.last, self.golden, self.alt]
    }
}

/// What decoding a frame produces, by content hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetHashes {
    pub output: RasterHash,
    pub state: StateHash,
}

/// Immutable descriptor of one compressed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub frame_id: FrameId,
    /// Compressed length in bytes.
    pub length: u64,
    /// Whether decoding this frame contributes a displayed raster.
    pub shown: bool,
    pub source_hashes: SourceHashes,
    pub target_hashes: TargetHashes,
}

/// A short frame sequence that carries a decoder between tracks.
///
/// Starting from the state produced at `from_track_id[from_frame_index]`,
/// decoding `frames` yields the raster and state of
/// `to_track_id[to_frame_index]`. `switch_start_index` is the position of
/// `frames[0]` within the switch's full frame sequence (normally 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchInfo {
    pub from_track_id: TrackId,
    pub to_track_id: TrackId,
    pub from_frame_index: usize,
    pub to_frame_index: usize,
    pub switch_start_index: usize,
    pub frames: Vec<FrameInfo>,
}

/// One occurrence of a frame within a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackPosition {
    pub track_id: TrackId,
    pub frame_index: usize,
}

/// Precomputed quality of an approximate raster against the original
/// displayed raster at one position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityRecord {
    /// Displayed raster index of the original frame.
    pub original_raster_dri: u64,
    /// Content hash of the approximating raster.
    pub approximate_raster: RasterHash,
    /// SSIM score in `[0, 1]`.
    pub quality: f64,
}
