//! Plans produced by the seek planners

use std::fmt;

use video_metadata::TrackId;

use crate::deps::FrameDependency;

/// A contiguous run of one track to fetch and decode.
///
/// `cost` is the total compressed length of the covered frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackPath {
    pub track_id: TrackId,
    /// First frame to decode, inclusive.
    pub start_index: usize,
    /// One past the last frame to decode.
    pub end_index: usize,
    pub cost: u64,
}

impl fmt::Display for TrackPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "track {} [{}, {}) {} bytes",
            self.track_id, self.start_index, self.end_index, self.cost
        )
    }
}

/// A run of switch frames carrying the decoder onto another track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchPath {
    pub from_track_id: TrackId,
    pub to_track_id: TrackId,
    pub from_frame_index: usize,
    pub to_frame_index: usize,
    /// First switch frame to decode, inclusive.
    pub switch_start_index: usize,
    /// One past the last switch frame to decode.
    pub switch_end_index: usize,
    /// Total bytes for the whole plan, residual track path included.
    pub cost: u64,
}

impl fmt::Display for SwitchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "switch track {}[{}] -> track {}[{}], frames [{}, {}), {} bytes",
            self.from_track_id,
            self.from_frame_index,
            self.to_track_id,
            self.to_frame_index,
            self.switch_start_index,
            self.switch_end_index,
            self.cost
        )
    }
}

/// A resolved backward walk on one track.
#[derive(Debug, Clone)]
pub struct TrackSeek {
    /// Index at which the walk found every dependency resolvable.
    pub start_index: usize,
    /// Dependency state to hand to the execution driver.
    pub dependencies: FrameDependency,
    /// Bytes covered by the walk.
    pub cost: u64,
}

/// A resolved switch plan: the switch itself plus any residual track walk
/// needed to cover dependencies the switch frames left open.
#[derive(Debug, Clone)]
pub struct SwitchSeek {
    pub switch_path: SwitchPath,
    /// Executed before the switch when present.
    pub residual: Option<TrackPath>,
    /// Dependency state to hand to the execution driver.
    pub dependencies: FrameDependency,
}
