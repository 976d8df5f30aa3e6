//! Error types for metadata queries

use crate::types::TrackId;

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Unknown track: {0}")]
    UnknownTrack(TrackId),

    #[error("Unknown switch: track {from_track_id} index {from_frame_index} -> track {to_track_id}")]
    UnknownSwitch {
        from_track_id: TrackId,
        to_track_id: TrackId,
        from_frame_index: usize,
    },

    #[error("Metadata backend error: {0}")]
    Backend(String),
}
