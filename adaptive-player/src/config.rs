//! Player configuration

use serde::{Deserialize, Serialize};

/// Cache sizing for one player instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Decoded rasters kept in memory (default: 256)
    #[serde(default = "default_raster_capacity")]
    pub raster_cache_capacity: usize,

    /// Decoder states kept in memory (default: 256)
    #[serde(default = "default_state_capacity")]
    pub state_cache_capacity: usize,

    /// Compressed chunks kept for the download pipeline (default: 8192)
    #[serde(default = "default_chunk_capacity")]
    pub chunk_cache_capacity: usize,
}

fn default_raster_capacity() -> usize {
    256
}

fn default_state_capacity() -> usize {
    256
}

fn default_chunk_capacity() -> usize {
    8192
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            raster_cache_capacity: default_raster_capacity(),
            state_cache_capacity: default_state_capacity(),
            chunk_cache_capacity: default_chunk_capacity(),
        }
    }
}
