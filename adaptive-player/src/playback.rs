//! Continuous playback planning
//!
//! Candidate continuations of the current plan are enumerated, filtered by a
//! buffer-feasibility check against the estimated throughput, and scored by
//! their worst shown-frame SSIM. The winner replaces the undownloaded tail
//! of the current sequence.

use decode_bridge::DecoderBackend;
use seek_planner::{track_seek, FrameDependency};
use video_metadata::{ChunkFetcher, FrameInfo, MetadataService, SwitchInfo, TrackId};

use crate::error::PlayerError;
use crate::player::Player;
use crate::sequence::{FrameInfoWrapper, FrameSequence};

/// Forward horizon, in frames, over which switch departures are considered
/// from the current position (one minute at 24 fps).
pub const WINDOW_SIZE: usize = 24 * 60;

impl<M, F, D> Player<M, F, D>
where
    M: MetadataService,
    F: ChunkFetcher,
    D: DecoderBackend,
{
    /// Re-plan the playback sequence.
    ///
    /// With `dri_to_seek` set this is a user seek: one candidate per track,
    /// no feasibility filtering, and the winner replaces the whole sequence
    /// with both cursors reset. Otherwise candidates continue the current
    /// plan and the winner is appended after the download cursor.
    ///
    /// `throughput_estimate` is a per-frame byte credit. When nothing
    /// feasible exists the current sequence is left intact.
    pub fn set_current_frame_seq(
        &mut self,
        dri_to_seek: Option<u64>,
        throughput_estimate: u64,
    ) -> Result<(), PlayerError> {
        let mut options = match dri_to_seek {
            Some(dri) => self.random_seek_play_options(dri)?,
            None => self.sequential_play_options(throughput_estimate)?,
        };

        if options.is_empty() {
            tracing::warn!(
                throughput_estimate,
                "no playback continuation available; keeping current sequence"
            );
            return Ok(());
        }

        let mut best_index = 0;
        for (index, option) in options.iter().enumerate().skip(1) {
            if option.min_ssim > options[best_index].min_ssim {
                best_index = index;
            }
        }
        let chosen = options.swap_remove(best_index);

        tracing::info!(
            min_ssim = chosen.min_ssim,
            frames = chosen.frames.len(),
            seek = dri_to_seek.is_some(),
            "adopting playback sequence"
        );

        if dri_to_seek.is_some() {
            self.current_frame_seq = chosen.frames;
            self.current_download_pt_index = 0;
            self.current_playhead_index = 0;
        } else {
            self.current_frame_seq.truncate(self.current_download_pt_index);
            self.current_frame_seq.extend(chosen.frames);
        }
        Ok(())
    }

    /// Candidate continuations for sequential play.
    ///
    /// - the tail of the current sequence ("stay"), kept unconditionally
    /// - a fresh seek onto every other track, feasibility-checked
    /// - per connected track, the earliest feasible switch departing within
    ///   [`WINDOW_SIZE`] frames
    ///
    /// While the tail sits inside a switch only stay and track jumps are
    /// offered: a switch may not chain into another switch.
    pub(crate) fn sequential_play_options(
        &self,
        throughput_estimate: u64,
    ) -> Result<Vec<FrameSequence>, PlayerError> {
        let mut options = Vec::new();

        // Nothing adopted yet: pick among whole tracks from the start.
        if self.current_frame_seq.is_empty() {
            for track_id in self.metadata.track_ids()? {
                if let Some(sequence) = self.track_sequence(track_id, 0)? {
                    if self.determine_feasibility(&sequence.frames, throughput_estimate) {
                        options.push(sequence);
                    }
                }
            }
            return Ok(options);
        }

        // Everything is already queued for download.
        if self.current_download_pt_index >= self.current_frame_seq.len() {
            return Ok(options);
        }

        let next = &self.current_frame_seq[self.current_download_pt_index];
        let dri = next.dri;
        let current_track = next.origin;

        options.push(self.stay_sequence());

        for track_id in self.metadata.track_ids()? {
            if Some(track_id) == current_track {
                continue;
            }
            if let Some(sequence) = self.track_sequence(track_id, dri)? {
                if self.determine_feasibility(&sequence.frames, throughput_estimate) {
                    options.push(sequence);
                }
            }
        }

        if self.current_download_pt_index == 0 {
            return Ok(options);
        }
        let Some(previous_track) = self.current_frame_seq[self.current_download_pt_index - 1].origin
        else {
            // Inside a switch; only a track jump can leave it.
            return Ok(options);
        };

        let Some(frame_index) = self.metadata.frame_index_by_dri(previous_track, dri)? else {
            return Ok(options);
        };
        let track_len = self
            .track_frames
            .get(&previous_track)
            .map(|track| track.len())
            .unwrap_or(0);
        let window_end = (frame_index + WINDOW_SIZE).min(track_len);

        let mut switches = self
            .metadata
            .switches_in_window(previous_track, frame_index, window_end)?;
        switches.sort_by_key(|switch| switch.from_frame_index);

        for to_track_id in self.metadata.connected_track_ids(previous_track)? {
            for switch in switches.iter().filter(|sw| sw.to_track_id == to_track_id) {
                let sequence = self.switch_sequence(switch, dri, frame_index);
                if self.determine_feasibility(&sequence.frames, throughput_estimate) {
                    options.push(sequence);
                    break;
                }
            }
        }

        Ok(options)
    }

    /// One candidate per track reaching `dri`, with no feasibility check:
    /// the user demanded the seek.
    pub(crate) fn random_seek_play_options(
        &self,
        dri: u64,
    ) -> Result<Vec<FrameSequence>, PlayerError> {
        let mut options = Vec::new();
        for track_id in self.metadata.track_ids()? {
            if let Some(sequence) = self.track_sequence(track_id, dri)? {
                options.push(sequence);
            }
        }
        Ok(options)
    }

    /// Simulate the download buffer over the committed window plus a
    /// prospective tail.
    ///
    /// Each frame slot credits `throughput_estimate` bytes and debits the
    /// frame's length unless its chunk is already cached. Infeasible as soon
    /// as the buffer goes negative.
    pub(crate) fn determine_feasibility(
        &self,
        prospective: &[FrameInfoWrapper],
        throughput_estimate: u64,
    ) -> bool {
        let mut buffer = self.downloaded_frame_bytes as i64;
        let committed = if self.current_playhead_index < self.current_download_pt_index {
            &self.current_frame_seq[self.current_playhead_index..self.current_download_pt_index]
        } else {
            &[]
        };

        for wrapper in committed.iter().chain(prospective) {
            buffer += throughput_estimate as i64;
            if !self.chunk_cache.has(wrapper.frame.frame_id) {
                buffer -= wrapper.frame.length as i64;
            }
            if buffer < 0 {
                return false;
            }
        }
        true
    }

    /// The not-yet-downloaded tail of the current sequence.
    fn stay_sequence(&self) -> FrameSequence {
        let frames = self.current_frame_seq[self.current_download_pt_index..].to_vec();
        let mut min_ssim = f64::INFINITY;
        for wrapper in &frames {
            if wrapper.frame.shown {
                min_ssim =
                    min_ssim.min(self.quality_for(wrapper.frame.target_hashes.output, wrapper.dri));
            }
        }
        FrameSequence { frames, min_ssim }
    }

    /// A fresh seek onto `track_id` at `dri`, then that track to its end.
    ///
    /// `None` when the track never displays `dri` or its backward walk has
    /// no resolution point.
    fn track_sequence(
        &self,
        track_id: TrackId,
        dri: u64,
    ) -> Result<Option<FrameSequence>, PlayerError> {
        let Some(frame_index) = self.metadata.frame_index_by_dri(track_id, dri)? else {
            return Ok(None);
        };
        let Some(seek) = track_seek(
            &self.metadata,
            &self.cache,
            track_id,
            frame_index,
            FrameDependency::new(),
        )?
        else {
            return Ok(None);
        };
        let Some(track) = self.track_frames.get(&track_id) else {
            return Ok(None);
        };

        let mut frames = Vec::with_capacity(track.len() - seek.start_index);
        let mut min_ssim = f64::INFINITY;
        let mut dri_cursor = dri;
        self.extend_scored(
            &mut frames,
            &mut min_ssim,
            &mut dri_cursor,
            &track[seek.start_index..],
            Some(track_id),
        );
        Ok(Some(FrameSequence { frames, min_ssim }))
    }

    /// Current-track prefix up to the switch departure, the switch frames,
    /// then the target track from the arrival index.
    fn switch_sequence(&self, switch: &SwitchInfo, dri: u64, frame_index: usize) -> FrameSequence {
        let mut frames = Vec::new();
        let mut min_ssim = f64::INFINITY;
        let mut dri_cursor = dri;

        if let Some(track) = self.track_frames.get(&switch.from_track_id) {
            let lo = frame_index.min(track.len());
            let hi = switch.from_frame_index.min(track.len());
            if lo < hi {
                self.extend_scored(
                    &mut frames,
                    &mut min_ssim,
                    &mut dri_cursor,
                    &track[lo..hi],
                    Some(switch.from_track_id),
                );
            }
        }

        self.extend_scored(&mut frames, &mut min_ssim, &mut dri_cursor, &switch.frames, None);

        if let Some(track) = self.track_frames.get(&switch.to_track_id) {
            let lo = switch.to_frame_index.min(track.len());
            self.extend_scored(
                &mut frames,
                &mut min_ssim,
                &mut dri_cursor,
                &track[lo..],
                Some(switch.to_track_id),
            );
        }

        FrameSequence { frames, min_ssim }
    }

    /// Append wrapped frames, folding shown-frame quality into `min_ssim`
    /// and advancing the dri cursor.
    fn extend_scored(
        &self,
        out: &mut Vec<FrameInfoWrapper>,
        min_ssim: &mut f64,
        dri: &mut u64,
        frames: &[FrameInfo],
        origin: Option<TrackId>,
    ) {
        for frame in frames {
            out.push(FrameInfoWrapper {
                frame: frame.clone(),
                origin,
                dri: *dri,
            });
            if frame.shown {
                *min_ssim = min_ssim.min(self.quality_for(frame.target_hashes.output, *dri));
                *dri += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{
        add_flat_quality, chained_track, keyframe, output_hash, player_with, predicted,
        sequence_on_track, state_hash, TestBackend, TestFetcher,
    };
    use video_metadata::MemoryMetadata;

    type TestPlayer = Player<MemoryMetadata, TestFetcher, TestBackend>;

    fn wrappers(frames: &[FrameInfo]) -> Vec<FrameInfoWrapper> {
        let mut dri = 0u64;
        frames
            .iter()
            .map(|frame| {
                let wrapper = FrameInfoWrapper {
                    frame: frame.clone(),
                    origin: Some(0),
                    dri,
                };
                if frame.shown {
                    dri += 1;
                }
                wrapper
            })
            .collect()
    }

    fn empty_player() -> TestPlayer {
        let mut meta = MemoryMetadata::new(640, 480, "mem://test");
        meta.add_track(0, chained_track(0, 3, 100));
        player_with(meta).0
    }

    #[test]
    fn test_feasibility_rejects_oversized_first_frame() {
        let player = empty_player();
        let prospective = wrappers(&[
            keyframe(10, 5000),
            predicted(11, 10, 100),
            predicted(12, 11, 100),
        ]);

        // 0 + 1000 - 5000 goes negative on the first frame.
        assert!(!player.determine_feasibility(&prospective, 1000));
    }

    #[test]
    fn test_feasibility_is_monotone_in_throughput() {
        let player = empty_player();
        let prospective = wrappers(&[
            keyframe(10, 5000),
            predicted(11, 10, 100),
            predicted(12, 11, 100),
        ]);

        let mut last = false;
        for throughput in [100, 1000, 4999, 5000, 20_000] {
            let feasible = player.determine_feasibility(&prospective, throughput);
            assert!(!last || feasible, "feasible at lower throughput but not at {throughput}");
            last = feasible;
        }
        assert!(last);
    }

    #[test]
    fn test_feasibility_skips_cached_chunks() {
        let mut player = empty_player();
        let prospective = wrappers(&[keyframe(10, 5000), predicted(11, 10, 100)]);
        assert!(!player.determine_feasibility(&prospective, 1000));

        // Once the big frame's chunk is cached its length is never debited.
        player.chunk_cache.put(10, bytes::Bytes::from_static(b"x"));
        assert!(player.determine_feasibility(&prospective, 1000));
    }

    #[test]
    fn test_bootstrap_picks_best_feasible_track() {
        let mut meta = MemoryMetadata::new(640, 480, "mem://test");
        let low = chained_track(0, 5, 100);
        let high = chained_track(100, 5, 100);
        add_flat_quality(&mut meta, &low, 10, 0.82);
        add_flat_quality(&mut meta, &high, 10, 0.91);
        meta.add_track(0, low);
        meta.add_track(1, high);
        let (mut player, _calls) = player_with(meta);

        player.set_current_frame_seq(None, 1_000_000).unwrap();

        assert_eq!(player.current_frame_seq.len(), 5);
        assert_eq!(player.current_frame_seq[0].origin, Some(1));
        assert_eq!(player.current_download_pt_index, 0);
        assert_eq!(player.current_playhead_index, 0);
    }

    #[test]
    fn test_bootstrap_with_no_feasible_track_stays_empty() {
        let mut meta = MemoryMetadata::new(640, 480, "mem://test");
        meta.add_track(0, chained_track(0, 5, 100));
        let (mut player, _calls) = player_with(meta);

        player.set_current_frame_seq(None, 0).unwrap();
        assert!(player.current_frame_seq.is_empty());
    }

    #[test]
    fn test_quality_pick_replaces_tail_and_keeps_cursors() {
        let mut meta = MemoryMetadata::new(640, 480, "mem://test");
        let low = chained_track(0, 5, 100);
        let high = chained_track(100, 5, 100);
        add_flat_quality(&mut meta, &low, 10, 0.82);
        add_flat_quality(&mut meta, &high, 10, 0.91);
        meta.add_track(0, low);
        meta.add_track(1, high);
        let (mut player, _calls) = player_with(meta);
        sequence_on_track(&mut player, 0);
        player.get_next_chunk().unwrap();
        player.get_next_chunk().unwrap();

        player.set_current_frame_seq(None, 1_000_000).unwrap();

        // The first two frames stay; the tail is the 0.91 track.
        assert_eq!(player.current_download_pt_index, 2);
        assert_eq!(player.current_frame_seq[0].origin, Some(0));
        assert_eq!(player.current_frame_seq[1].origin, Some(0));
        assert_eq!(player.current_frame_seq[2].origin, Some(1));
        assert_eq!(player.current_frame_seq[2].frame.frame_id, 100);
        assert_eq!(player.current_frame_seq[2].dri, 2);
    }

    #[test]
    fn test_random_seek_resets_cursors() {
        let mut meta = MemoryMetadata::new(640, 480, "mem://test");
        let low = chained_track(0, 5, 100);
        let high = chained_track(100, 5, 100);
        add_flat_quality(&mut meta, &low, 10, 0.82);
        add_flat_quality(&mut meta, &high, 10, 0.91);
        meta.add_track(0, low);
        meta.add_track(1, high);
        let (mut player, _calls) = player_with(meta);
        sequence_on_track(&mut player, 0);
        player.get_next_chunk().unwrap();
        player.get_raster_sequential(0).unwrap();

        // Throughput is irrelevant for a demanded seek.
        player.set_current_frame_seq(Some(1), 0).unwrap();

        assert_eq!(player.current_download_pt_index, 0);
        assert_eq!(player.current_playhead_index, 0);
        assert_eq!(player.current_frame_seq[0].origin, Some(1));
        assert_eq!(player.current_frame_seq[0].dri, 1);
    }

    fn switch_fixture() -> MemoryMetadata {
        let mut meta = MemoryMetadata::new(640, 480, "mem://test");
        let from = chained_track(0, 10, 100);
        let to = chained_track(100, 10, 100);
        // One switch frame: consumes the outputs of track 0's frame 2 (the
        // last frame played before departing at index 3) and reproduces the
        // outputs of track 1's frame 102, so track 1 chains on from index 3.
        let sw = vec![FrameInfo {
            frame_id: 300,
            length: 50,
            shown: true,
            source_hashes: video_metadata::SourceHashes {
                last: Some(output_hash(2)),
                golden: None,
                alt: None,
                state: Some(state_hash(2)),
            },
            target_hashes: video_metadata::TargetHashes {
                output: output_hash(102),
                state: state_hash(102),
            },
        }];
        add_flat_quality(&mut meta, &from, 20, 0.5);
        add_flat_quality(&mut meta, &to, 20, 0.6);
        add_flat_quality(&mut meta, &sw, 20, 0.55);
        meta.add_track(0, from);
        meta.add_track(1, to);
        meta.add_switch(video_metadata::SwitchInfo {
            from_track_id: 0,
            to_track_id: 1,
            from_frame_index: 3,
            to_frame_index: 3,
            switch_start_index: 0,
            frames: sw,
        });
        meta
    }

    #[test]
    fn test_switch_candidates_are_offered_on_a_track() {
        let (mut player, _calls) = player_with(switch_fixture());
        sequence_on_track(&mut player, 0);
        player.get_next_chunk().unwrap();

        let options = player.sequential_play_options(1_000_000).unwrap();

        // Stay, jump to track 1, and the switch continuation.
        assert_eq!(options.len(), 3);
        let switch_option = options
            .iter()
            .find(|option| option.frames.iter().any(|w| w.origin.is_none()))
            .expect("switch candidate offered");
        // Prefix on track 0, one switch frame, then track 1 from index 3.
        assert_eq!(switch_option.frames[0].origin, Some(0));
        let arrival = switch_option
            .frames
            .iter()
            .position(|w| w.origin == Some(1))
            .expect("arrival track frames present");
        assert_eq!(switch_option.frames[arrival].frame.frame_id, 103);
    }

    #[test]
    fn test_no_switch_candidates_while_inside_a_switch() {
        let (mut player, _calls) = player_with(switch_fixture());
        sequence_on_track(&mut player, 0);
        // The frame just before the download cursor belongs to a switch.
        player.current_frame_seq[0].origin = None;
        player.current_download_pt_index = 1;

        let options = player.sequential_play_options(1_000_000).unwrap();

        // Stay and the track-1 jump only.
        assert_eq!(options.len(), 2);
        for option in &options {
            assert!(option.frames.iter().all(|w| w.origin.is_some()));
        }
    }

    #[test]
    fn test_fully_downloaded_sequence_offers_nothing() {
        let mut meta = MemoryMetadata::new(640, 480, "mem://test");
        meta.add_track(0, chained_track(0, 2, 100));
        let (mut player, _calls) = player_with(meta);
        sequence_on_track(&mut player, 0);
        player.get_next_chunk().unwrap();
        player.get_next_chunk().unwrap();

        assert!(player.sequential_play_options(1_000_000).unwrap().is_empty());

        // And re-planning leaves the sequence alone.
        let before = player.current_frame_seq.len();
        player.set_current_frame_seq(None, 1_000_000).unwrap();
        assert_eq!(player.current_frame_seq.len(), before);
        assert_eq!(player.current_download_pt_index, 2);
    }
}
