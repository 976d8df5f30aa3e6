//! Seek planning over multi-track encoded video
//!
//! Reaching an arbitrary frame of a pre-encoded corpus means assembling a
//! sequence of compressed frames whose inter-frame references all resolve:
//! every reference raster and decoder state a frame consumes must either be
//! cached already or be produced earlier in the same sequence. This crate
//! finds the cheapest such sequence, measured in bytes fetched:
//!
//! - [`FrameDependency`] tracks which references a tentative walk still
//!   leaves unresolved
//! - [`track_seek`] walks a single track backward from a target frame until
//!   the cache covers everything
//! - [`min_switch_seek`] enumerates inter-track switch sequences reaching
//!   the target, recursing into the track planner for residual dependencies
//!
//! Planners never mutate the caches; each plan attempt owns its
//! `FrameDependency` and is cheap to discard.

mod deps;
mod plan;
mod switch;
mod track;

pub use deps::{DependencyKind, DependencyVertex, FrameDependency};
pub use plan::{SwitchPath, SwitchSeek, TrackPath, TrackSeek};
pub use switch::min_switch_seek;
pub use track::{min_track_seek, track_seek};
