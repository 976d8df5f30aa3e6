//! Decoder backend seam for the player
//!
//! The player never decodes anything itself: it hands a decoder backend a
//! starting state, a set of reference rasters, and one compressed chunk, and
//! gets back the produced raster plus the post-decode references and state.
//! Backends are constructed for a fixed video width/height; the player treats
//! rasters and decoder states as opaque handles identified by content hash.

use thiserror::Error;

/// Anything identified by a 64-bit content fingerprint.
///
/// Equality of hashes is equality of content as far as the player cares;
/// there is no ordering beyond hash-table use.
pub trait ContentHashed {
    fn content_hash(&self) -> u64;
}

/// The three reference rasters a VP8-family decoder consumes.
#[derive(Debug, Clone)]
pub struct ReferenceSet<R> {
    pub last: R,
    pub golden: R,
    pub alternate: R,
}

impl<R: Clone> ReferenceSet<R> {
    /// A reference set with all three slots holding the same raster.
    ///
    /// Used to seed decoding when some source references are absent: absent
    /// slots keep the backend's blank raster.
    pub fn filled(raster: R) -> Self {
        Self {
            last: raster.clone(),
            golden: raster.clone(),
            alternate: raster,
        }
    }
}

/// Everything one decode call produces.
#[derive(Debug, Clone)]
pub struct DecodeOutput<R, S> {
    /// Whether the produced raster contributes a displayed frame.
    pub shown: bool,
    /// The decoded raster.
    pub output: R,
    /// Reference rasters after this decode (the next frame's potential sources).
    pub refs: ReferenceSet<R>,
    /// Decoder state after this decode.
    pub state: S,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Corrupt frame data: {0}")]
    CorruptFrame(String),

    #[error("Decoder backend error: {0}")]
    Backend(String),
}

/// A decoder implementation the player can drive.
///
/// Implementations are constructed for a fixed width/height; `blank_raster`
/// and `initial_state` return the defaults for those dimensions, used when a
/// frame's source hashes are absent.
pub trait DecoderBackend {
    type Raster: ContentHashed + Clone;
    type State: ContentHashed + Clone;

    /// Default reference raster for the configured dimensions.
    fn blank_raster(&self) -> Self::Raster;

    /// Fresh decoder state for the configured dimensions.
    fn initial_state(&self) -> Self::State;

    /// Decode one compressed chunk against the given state and references.
    fn decode(
        &self,
        state: Self::State,
        refs: ReferenceSet<Self::Raster>,
        chunk: &[u8],
    ) -> Result<DecodeOutput<Self::Raster, Self::State>, DecodeError>;
}
