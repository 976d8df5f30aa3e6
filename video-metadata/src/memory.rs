//! In-memory metadata service
//!
//! Holds a whole corpus' tracks, switches and quality table in process and
//! derives the lookup indices (output hash, frame position, displayed raster
//! index, connectivity) at insertion time. Serves as the fixture layer for
//! planner and player tests and as the backend for local corpora.

use std::collections::{BTreeMap, HashMap};

use crate::error::MetadataError;
use crate::service::{MetadataService, MAX_NUM_FRAMES};
use crate::types::{
    FrameId, FrameInfo, QualityRecord, RasterHash, SwitchInfo, TrackId, TrackPosition,
};

#[derive(Default)]
pub struct MemoryMetadata {
    width: u32,
    height: u32,
    url: String,
    tracks: BTreeMap<TrackId, Vec<FrameInfo>>,
    switches: Vec<SwitchInfo>,
    quality: Vec<QualityRecord>,

    // Derived indices, maintained by add_track / add_switch.
    by_output_hash: HashMap<RasterHash, Vec<FrameInfo>>,
    positions: HashMap<FrameId, Vec<TrackPosition>>,
    dri_index: HashMap<TrackId, HashMap<u64, usize>>,
}

impl MemoryMetadata {
    pub fn new(width: u32, height: u32, url: impl Into<String>) -> Self {
        Self {
            width,
            height,
            url: url.into(),
            ..Self::default()
        }
    }

    /// Add one track's frames, in track order.
    ///
    /// Tracks are added once, at construction; re-adding an id is not
    /// supported.
    pub fn add_track(&mut self, track_id: TrackId, frames: Vec<FrameInfo>) {
        let mut dri = 0u64;
        for (index, frame) in frames.iter().enumerate() {
            self.index_frame(frame);
            self.positions
                .entry(frame.frame_id)
                .or_default()
                .push(TrackPosition {
                    track_id,
                    frame_index: index,
                });
            if frame.shown {
                self.dri_index
                    .entry(track_id)
                    .or_default()
                    .insert(dri, index);
                dri += 1;
            }
        }
        self.tracks.insert(track_id, frames);
    }

    /// Add one switch. Its frames become queryable by output hash, so a
    /// switch that produces a raster is discoverable from that raster's hash.
    pub fn add_switch(&mut self, switch: SwitchInfo) {
        for frame in &switch.frames {
            self.index_frame(frame);
        }
        self.switches.push(switch);
    }

    pub fn add_quality(&mut self, record: QualityRecord) {
        self.quality.push(record);
    }

    fn index_frame(&mut self, frame: &FrameInfo) {
        let indexed = self
            .by_output_hash
            .entry(frame.target_hashes.output)
            .or_default();
        if !indexed.iter().any(|f| f.frame_id == frame.frame_id) {
            indexed.push(frame.clone());
        }
    }

    fn track(&self, track_id: TrackId) -> Result<&Vec<FrameInfo>, MetadataError> {
        self.tracks
            .get(&track_id)
            .ok_or(MetadataError::UnknownTrack(track_id))
    }
}

impl MetadataService for MemoryMetadata {
    fn track_ids(&self) -> Result<Vec<TrackId>, MetadataError> {
        Ok(self.tracks.keys().copied().collect())
    }

    fn track_size(&self, track_id: TrackId) -> Result<usize, MetadataError> {
        Ok(self.track(track_id)?.len())
    }

    fn frames(
        &self,
        track_id: TrackId,
        from: usize,
        to: usize,
    ) -> Result<Vec<FrameInfo>, MetadataError> {
        let track = self.track(track_id)?;
        let from = from.min(track.len());
        let to = to.min(track.len()).min(from + MAX_NUM_FRAMES);
        Ok(track[from..to.max(from)].to_vec())
    }

    fn frames_reverse(
        &self,
        track_id: TrackId,
        from: usize,
        to: usize,
    ) -> Result<Vec<FrameInfo>, MetadataError> {
        let track = self.track(track_id)?;
        if track.is_empty() || from >= track.len() || from < to {
            return Ok(Vec::new());
        }
        Ok(track[to..=from]
            .iter()
            .rev()
            .take(MAX_NUM_FRAMES)
            .cloned()
            .collect())
    }

    fn switch_frames(
        &self,
        from_track_id: TrackId,
        to_track_id: TrackId,
        from_frame_index: usize,
        switch_start: usize,
        switch_end: usize,
    ) -> Result<Vec<FrameInfo>, MetadataError> {
        let switch = self
            .switches
            .iter()
            .find(|sw| {
                sw.from_track_id == from_track_id
                    && sw.to_track_id == to_track_id
                    && sw.from_frame_index == from_frame_index
            })
            .ok_or(MetadataError::UnknownSwitch {
                from_track_id,
                to_track_id,
                from_frame_index,
            })?;

        // Requested bounds are in switch-sequence coordinates; `frames[0]`
        // sits at `switch.switch_start_index`.
        let base = switch.switch_start_index;
        let lo = switch_start.saturating_sub(base).min(switch.frames.len());
        let hi = switch_end.saturating_sub(base).min(switch.frames.len());
        Ok(switch.frames[lo..hi.max(lo)].to_vec())
    }

    fn frames_by_output_hash(&self, hash: RasterHash) -> Result<Vec<FrameInfo>, MetadataError> {
        Ok(self.by_output_hash.get(&hash).cloned().unwrap_or_default())
    }

    fn switches_with_frame(&self, frame_id: FrameId) -> Result<Vec<SwitchInfo>, MetadataError> {
        Ok(self
            .switches
            .iter()
            .filter(|sw| sw.frames.iter().any(|f| f.frame_id == frame_id))
            .cloned()
            .collect())
    }

    fn switches_in_window(
        &self,
        track_id: TrackId,
        lo: usize,
        hi: usize,
    ) -> Result<Vec<SwitchInfo>, MetadataError> {
        Ok(self
            .switches
            .iter()
            .filter(|sw| {
                sw.from_track_id == track_id
                    && sw.from_frame_index >= lo
                    && sw.from_frame_index <= hi
            })
            .cloned()
            .collect())
    }

    fn track_positions_by_frame_id(
        &self,
        frame_id: FrameId,
    ) -> Result<Vec<TrackPosition>, MetadataError> {
        Ok(self.positions.get(&frame_id).cloned().unwrap_or_default())
    }

    fn frame_index_by_dri(
        &self,
        track_id: TrackId,
        dri: u64,
    ) -> Result<Option<usize>, MetadataError> {
        self.track(track_id)?;
        Ok(self
            .dri_index
            .get(&track_id)
            .and_then(|index| index.get(&dri))
            .copied())
    }

    fn connected_track_ids(&self, track_id: TrackId) -> Result<Vec<TrackId>, MetadataError> {
        let mut connected: Vec<TrackId> = self
            .switches
            .iter()
            .filter(|sw| sw.from_track_id == track_id)
            .map(|sw| sw.to_track_id)
            .collect();
        connected.sort_unstable();
        connected.dedup();
        Ok(connected)
    }

    fn quality_records(&self) -> Result<Vec<QualityRecord>, MetadataError> {
        Ok(self.quality.clone())
    }

    fn video_width(&self) -> Result<u32, MetadataError> {
        Ok(self.width)
    }

    fn video_height(&self) -> Result<u32, MetadataError> {
        Ok(self.height)
    }

    fn url(&self) -> Result<String, MetadataError> {
        Ok(self.url.clone())
    }
}
