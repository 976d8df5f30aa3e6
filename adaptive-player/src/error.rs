//! Error types for the player core

use decode_bridge::DecodeError;
use video_metadata::{FetchError, MetadataError};

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Playhead already past displayed raster index {requested} (next is {next})")]
    PlayheadPassed { requested: u64, next: u64 },

    #[error("Frame sequence exhausted before displayed raster index {0}")]
    SequenceExhausted(u64),
}
