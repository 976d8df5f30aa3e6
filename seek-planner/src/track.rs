//! Backward seek planning on a single track

use frame_cache::ReferenceLookup;
use video_metadata::{MetadataError, MetadataService, RasterHash, TrackId, MAX_NUM_FRAMES};

use crate::deps::FrameDependency;
use crate::plan::{TrackPath, TrackSeek};

/// Walk `track_id` backward from `from_frame_index` (inclusive) until every
/// dependency is resolvable from cache.
///
/// Frames are paged [`MAX_NUM_FRAMES`] at a time. Returns `None` when no
/// resolution point exists: the walk exhausted index 0 with dependencies
/// still open, or the backward range was empty to begin with.
///
/// `dependencies` seeds the walk: the switch planner passes in the residue
/// its switch frames left open, plain track seeks start empty.
pub fn track_seek<M, C>(
    metadata: &M,
    cache: &C,
    track_id: TrackId,
    from_frame_index: usize,
    mut dependencies: FrameDependency,
) -> Result<Option<TrackSeek>, MetadataError>
where
    M: MetadataService + ?Sized,
    C: ReferenceLookup + ?Sized,
{
    let mut cost = 0u64;
    let mut cursor = from_frame_index as i64;

    while cursor >= 0 {
        let hi = cursor as usize;
        let lo = (cursor - (MAX_NUM_FRAMES as i64 - 1)).max(0) as usize;
        let batch = metadata.frames_reverse(track_id, hi, lo)?;
        if batch.is_empty() {
            return Ok(None);
        }

        for frame in &batch {
            cost += frame.length;
            dependencies.update_dependencies(frame, cache);
            if dependencies.all_resolved() {
                return Ok(Some(TrackSeek {
                    start_index: cursor as usize,
                    dependencies,
                    cost,
                }));
            }
            cursor -= 1;
        }
    }

    Ok(None)
}

/// Cheapest track-only plan reaching a frame whose decode outputs `output_hash`.
///
/// Every `(track, index)` occurrence of every matching frame is a candidate;
/// the minimum byte cost wins, first-found on ties.
pub fn min_track_seek<M, C>(
    metadata: &M,
    cache: &C,
    output_hash: RasterHash,
) -> Result<Option<(TrackPath, FrameDependency)>, MetadataError>
where
    M: MetadataService + ?Sized,
    C: ReferenceLookup + ?Sized,
{
    let mut best: Option<(TrackPath, FrameDependency)> = None;

    for frame in metadata.frames_by_output_hash(output_hash)? {
        for position in metadata.track_positions_by_frame_id(frame.frame_id)? {
            let seek = match track_seek(
                metadata,
                cache,
                position.track_id,
                position.frame_index,
                FrameDependency::new(),
            )? {
                Some(seek) => seek,
                None => continue,
            };

            tracing::debug!(
                track_id = position.track_id,
                start = seek.start_index,
                target = position.frame_index,
                cost = seek.cost,
                "track seek candidate"
            );

            if best.as_ref().map_or(true, |(path, _)| seek.cost < path.cost) {
                let path = TrackPath {
                    track_id: position.track_id,
                    start_index: seek.start_index,
                    end_index: position.frame_index + 1,
                    cost: seek.cost,
                };
                best = Some((path, seek.dependencies));
            }
        }
    }

    Ok(best)
}
