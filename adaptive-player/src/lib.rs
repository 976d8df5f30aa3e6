//! Adaptive playback over multi-track encoded video
//!
//! The player owns the decoded caches, the compressed chunk cache and the
//! playback cursors, and drives two surfaces:
//!
//! - **Seeks**: [`Player::get_raster`] plans the cheapest way (in bytes
//!   fetched) to materialize a requested output raster, via a track-only
//!   walk, a switch sequence, or whichever of the two is cheaper
//! - **Continuous playback**: [`Player::set_current_frame_seq`] enumerates
//!   continuations of the current plan (stay, jump tracks, take a switch),
//!   drops the ones the estimated throughput cannot sustain, and adopts the
//!   one with the best worst-case SSIM
//!
//! All state is owned by the player and mutated single-threaded; the
//! metadata service and the chunk fetcher are the only operations that may
//! block.

mod config;
mod driver;
mod error;
mod playback;
mod player;
mod sequence;

#[cfg(test)]
mod testutil;

pub use config::PlayerConfig;
pub use error::PlayerError;
pub use playback::WINDOW_SIZE;
pub use player::{CacheStats, PathType, Player};
pub use sequence::{FrameInfoWrapper, FrameSequence};
