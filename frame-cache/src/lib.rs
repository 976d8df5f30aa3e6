//! Recency-bounded caches for decoded video data
//!
//! This crate provides the two caching layers the player builds on:
//!
//! - [`LruCache`]: a bounded map from 64-bit content hash to value with
//!   least-recently-used eviction
//! - [`DecodedFrameCache`]: a raster cache and a decoder-state cache kept in
//!   step, populated together after every decode
//!
//! Planners consult the caches through [`ReferenceLookup`], a read-only seam
//! that answers "is this reference already resolvable" without touching
//! recency order.

mod decoded;
mod lru;

pub use decoded::{DecodedFrameCache, ReferenceLookup};
pub use lru::LruCache;
