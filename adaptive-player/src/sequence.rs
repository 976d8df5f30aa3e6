//! Planned frame sequences for continuous playback

use video_metadata::{FrameInfo, TrackId};

/// One frame of a planned playback sequence.
#[derive(Debug, Clone)]
pub struct FrameInfoWrapper {
    pub frame: FrameInfo,
    /// Track the frame belongs to; `None` for frames owned by a switch.
    pub origin: Option<TrackId>,
    /// Cumulative displayed raster index at this point in the plan. A shown
    /// frame contributes this index; hidden frames carry the next one along.
    pub dri: u64,
}

/// A candidate playback plan and its worst-case quality.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    pub frames: Vec<FrameInfoWrapper>,
    /// Minimum SSIM over the plan's shown frames; infinite when none are
    /// shown.
    pub min_ssim: f64,
}
