//! Plan execution: fetch, decode, publish

use bytes::Bytes;
use decode_bridge::{DecodeOutput, DecoderBackend};
use seek_planner::{FrameDependency, SwitchPath, TrackPath};
use video_metadata::{ChunkFetcher, FrameInfo, MetadataService, MAX_NUM_FRAMES};

use crate::error::PlayerError;
use crate::player::Player;

impl<M, F, D> Player<M, F, D>
where
    M: MetadataService,
    F: ChunkFetcher,
    D: DecoderBackend,
{
    /// Decode a planned track run, publishing every output to the caches.
    ///
    /// Frames are paged [`MAX_NUM_FRAMES`] at a time; the forward dependency
    /// pass relieves whatever the planning walk charged, so the returned
    /// `FrameDependency` can flow into a chained plan.
    pub(crate) fn follow_track_path(
        &mut self,
        path: &TrackPath,
        mut dependencies: FrameDependency,
    ) -> Result<FrameDependency, PlayerError> {
        let mut from = path.start_index;
        while from < path.end_index {
            let to = (from + MAX_NUM_FRAMES).min(path.end_index);
            let batch = self.metadata.frames(path.track_id, from, to)?;
            if batch.is_empty() {
                break;
            }
            from += batch.len();

            for frame in &batch {
                let chunk = self.chunk_for(frame)?;
                self.decode_and_publish(frame, &chunk)?;
                dependencies.update_dependencies_forward(frame, &self.cache);
            }
        }
        Ok(dependencies)
    }

    /// Decode a planned switch run, publishing every output to the caches.
    pub(crate) fn follow_switch_path(
        &mut self,
        path: &SwitchPath,
        mut dependencies: FrameDependency,
    ) -> Result<FrameDependency, PlayerError> {
        let frames = self.metadata.switch_frames(
            path.from_track_id,
            path.to_track_id,
            path.from_frame_index,
            path.switch_start_index,
            path.switch_end_index,
        )?;

        for frame in &frames {
            let chunk = self.chunk_for(frame)?;
            self.decode_and_publish(frame, &chunk)?;
            dependencies.update_dependencies_forward(frame, &self.cache);
        }
        Ok(dependencies)
    }

    /// Fetch the next unfetched frame of the current sequence.
    ///
    /// Caches its compressed bytes, advances the download cursor and
    /// accounts the bytes toward the feasibility buffer. `None` once the
    /// sequence is fully fetched.
    pub fn get_next_chunk(&mut self) -> Result<Option<Bytes>, PlayerError> {
        let Some(wrapper) = self.current_frame_seq.get(self.current_download_pt_index) else {
            return Ok(None);
        };
        let frame = wrapper.frame.clone();

        let chunk = self.fetcher.chunk(&frame)?;
        self.chunk_cache.put(frame.frame_id, chunk.clone());
        self.downloaded_frame_bytes += frame.length;
        self.current_download_pt_index += 1;

        Ok(Some(chunk))
    }

    /// Decode forward from the playhead until the shown frame carrying `dri`
    /// is produced, and return its raster.
    ///
    /// Fails when the playhead has already passed `dri`, or when the current
    /// sequence ends before producing it.
    pub fn get_raster_sequential(&mut self, dri: u64) -> Result<D::Raster, PlayerError> {
        let next = self
            .current_frame_seq
            .get(self.current_playhead_index)
            .ok_or(PlayerError::SequenceExhausted(dri))?;
        if next.dri > dri {
            return Err(PlayerError::PlayheadPassed {
                requested: dri,
                next: next.dri,
            });
        }

        loop {
            let wrapper = self
                .current_frame_seq
                .get(self.current_playhead_index)
                .ok_or(PlayerError::SequenceExhausted(dri))?
                .clone();
            self.current_playhead_index += 1;

            let chunk = self.chunk_for(&wrapper.frame)?;
            let output = self.decode_and_publish(&wrapper.frame, &chunk)?;
            if output.shown && wrapper.dri == dri {
                return Ok(output.output);
            }
        }
    }

    /// Compressed bytes for one frame: the chunk cache when the download
    /// pipeline already fetched it, the fetcher otherwise.
    pub(crate) fn chunk_for(&mut self, frame: &FrameInfo) -> Result<Bytes, PlayerError> {
        if let Some(chunk) = self.chunk_cache.get(frame.frame_id) {
            return Ok(chunk.clone());
        }
        Ok(self.fetcher.chunk(frame)?)
    }

    /// Decode one frame and publish its outputs to the decoded caches.
    pub(crate) fn decode_and_publish(
        &mut self,
        frame: &FrameInfo,
        chunk: &[u8],
    ) -> Result<DecodeOutput<D::Raster, D::State>, PlayerError> {
        let (state, refs) = self.decoder_inputs(frame);
        let output = self.backend.decode(state, refs, chunk)?;
        self.cache.insert_decode(&output.refs, &output.state);
        self.cache.insert_raster(&output.output);
        Ok(output)
    }
}
