//! Compressed chunk retrieval seam

use bytes::Bytes;

use crate::types::{FrameId, FrameInfo};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Unknown frame: {0}")]
    UnknownFrame(FrameId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch backend error: {0}")]
    Backend(String),
}

/// Turns a frame descriptor into its compressed bytes.
///
/// This is one of the two operations in the player core that may block; the
/// core issues one fetch at a time and has no retry policy.
pub trait ChunkFetcher {
    fn chunk(&self, frame: &FrameInfo) -> Result<Bytes, FetchError>;
}
