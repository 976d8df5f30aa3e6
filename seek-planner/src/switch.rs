//! Seek planning through inter-track switch sequences

use frame_cache::ReferenceLookup;
use video_metadata::{MetadataError, MetadataService, RasterHash};

use crate::deps::FrameDependency;
use crate::plan::{SwitchPath, SwitchSeek, TrackPath};
use crate::track::track_seek;

/// Cheapest switch plan reaching a frame whose decode outputs `output_hash`.
///
/// Every `(target frame, switch)` pair is a candidate: the switch's frames
/// are walked forward, charging their dependencies, stopping as soon as
/// everything is resolvable; whatever the switch frames leave open is handed
/// to the track planner on the switch's source track. Candidates whose
/// residue has no resolution point are skipped. The minimum total byte cost
/// wins, first-found on ties.
pub fn min_switch_seek<M, C>(
    metadata: &M,
    cache: &C,
    output_hash: RasterHash,
) -> Result<Option<SwitchSeek>, MetadataError>
where
    M: MetadataService + ?Sized,
    C: ReferenceLookup + ?Sized,
{
    let mut best: Option<SwitchSeek> = None;

    for target in metadata.frames_by_output_hash(output_hash)? {
        for switch in metadata.switches_with_frame(target.frame_id)? {
            let mut dependencies = FrameDependency::new();
            let mut cost = 0u64;
            let mut consumed = 0usize;

            for frame in &switch.frames {
                cost += frame.length;
                dependencies.update_dependencies(frame, cache);
                consumed += 1;
                if dependencies.all_resolved() {
                    break;
                }
            }

            let mut residual = None;
            if !dependencies.all_resolved() {
                let seek = match track_seek(
                    metadata,
                    cache,
                    switch.from_track_id,
                    switch.from_frame_index,
                    dependencies,
                )? {
                    Some(seek) => seek,
                    None => continue,
                };
                cost += seek.cost;
                residual = Some(TrackPath {
                    track_id: switch.from_track_id,
                    start_index: seek.start_index,
                    end_index: switch.from_frame_index + 1,
                    cost: seek.cost,
                });
                dependencies = seek.dependencies;
            }

            tracing::debug!(
                from = switch.from_track_id,
                to = switch.to_track_id,
                frames = consumed,
                cost,
                "switch seek candidate"
            );

            if best
                .as_ref()
                .map_or(true, |b| cost < b.switch_path.cost)
            {
                best = Some(SwitchSeek {
                    switch_path: SwitchPath {
                        from_track_id: switch.from_track_id,
                        to_track_id: switch.to_track_id,
                        from_frame_index: switch.from_frame_index,
                        to_frame_index: switch.to_frame_index,
                        switch_start_index: 0,
                        switch_end_index: switch.switch_start_index + consumed,
                        cost,
                    },
                    residual,
                    dependencies,
                });
            }
        }
    }

    Ok(best)
}
