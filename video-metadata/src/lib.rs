//! Metadata model for multi-track encoded video
//!
//! A video here is a corpus of encoded *tracks* (one per quality level) plus
//! *switch* frame sequences that carry a decoder from one track onto another
//! without a full re-decode. This crate defines:
//!
//! - the frame/track/switch data model ([`FrameInfo`], [`SwitchInfo`], …)
//! - [`MetadataService`], the query surface a metadata backend must answer
//! - [`ChunkFetcher`], the seam that turns a frame descriptor into its
//!   compressed bytes
//! - [`MemoryMetadata`], a complete in-memory service used for tests and
//!   local corpora

mod error;
mod fetch;
mod memory;
mod service;
mod types;

pub use error::MetadataError;
pub use fetch::{ChunkFetcher, FetchError};
pub use memory::MemoryMetadata;
pub use service::{MetadataService, MAX_NUM_FRAMES};
pub use types::{
    FrameId, FrameInfo, QualityRecord, RasterHash, SourceHashes, StateHash, SwitchInfo,
    TargetHashes, TrackId, TrackPosition,
};
