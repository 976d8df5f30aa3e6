//! Shared fixtures for player tests
//!
//! The scripted decoder backend reads a chunk layout the test fetcher
//! produces from the frame descriptor itself: output hash, state hash, shown
//! flag. Decoding therefore "produces" exactly what the metadata promised,
//! which is all the planner and driver logic cares about.

use std::cell::Cell;
use std::rc::Rc;

use bytes::Bytes;
use decode_bridge::{ContentHashed, DecodeError, DecodeOutput, DecoderBackend, ReferenceSet};
use video_metadata::{
    ChunkFetcher, FetchError, FrameInfo, MemoryMetadata, QualityRecord, SourceHashes, SwitchInfo,
    TargetHashes, TrackId,
};

use crate::config::PlayerConfig;
use crate::player::Player;
use crate::sequence::FrameInfoWrapper;

pub const BLANK_RASTER_HASH: u64 = 0xB1A2;
pub const INITIAL_STATE_HASH: u64 = 0x51A7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRaster(pub u64);

impl ContentHashed for TestRaster {
    fn content_hash(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestState(pub u64);

impl ContentHashed for TestState {
    fn content_hash(&self) -> u64 {
        self.0
    }
}

pub struct TestBackend;

impl DecoderBackend for TestBackend {
    type Raster = TestRaster;
    type State = TestState;

    fn blank_raster(&self) -> TestRaster {
        TestRaster(BLANK_RASTER_HASH)
    }

    fn initial_state(&self) -> TestState {
        TestState(INITIAL_STATE_HASH)
    }

    fn decode(
        &self,
        _state: TestState,
        refs: ReferenceSet<TestRaster>,
        chunk: &[u8],
    ) -> Result<DecodeOutput<TestRaster, TestState>, DecodeError> {
        if chunk.len() < 17 {
            return Err(DecodeError::CorruptFrame(format!(
                "chunk too short: {} bytes",
                chunk.len()
            )));
        }
        let output = TestRaster(u64::from_be_bytes(chunk[0..8].try_into().unwrap()));
        let state = TestState(u64::from_be_bytes(chunk[8..16].try_into().unwrap()));
        let shown = chunk[16] == 1;

        Ok(DecodeOutput {
            shown,
            output: output.clone(),
            refs: ReferenceSet {
                last: output,
                golden: refs.golden,
                alternate: refs.alternate,
            },
            state,
        })
    }
}

/// Fetcher that synthesizes the scripted chunk layout and counts calls.
pub struct TestFetcher {
    pub calls: Rc<Cell<usize>>,
}

impl ChunkFetcher for TestFetcher {
    fn chunk(&self, frame: &FrameInfo) -> Result<Bytes, FetchError> {
        self.calls.set(self.calls.get() + 1);
        let mut buf = Vec::with_capacity(17);
        buf.extend_from_slice(&frame.target_hashes.output.to_be_bytes());
        buf.extend_from_slice(&frame.target_hashes.state.to_be_bytes());
        buf.push(frame.shown as u8);
        Ok(Bytes::from(buf))
    }
}

/// Player over the given metadata, plus the fetch-call counter.
pub fn player_with(
    meta: MemoryMetadata,
) -> (
    Player<MemoryMetadata, TestFetcher, TestBackend>,
    Rc<Cell<usize>>,
) {
    let calls = Rc::new(Cell::new(0));
    let fetcher = TestFetcher {
        calls: Rc::clone(&calls),
    };
    let player = Player::new(meta, fetcher, TestBackend, &PlayerConfig::default())
        .expect("fixture metadata is well-formed");
    (player, calls)
}

pub fn output_hash(frame_id: u64) -> u64 {
    0x1_0000 + frame_id
}

pub fn state_hash(frame_id: u64) -> u64 {
    0x2_0000 + frame_id
}

pub fn keyframe(frame_id: u64, length: u64) -> FrameInfo {
    FrameInfo {
        frame_id,
        length,
        shown: true,
        source_hashes: SourceHashes::default(),
        target_hashes: TargetHashes {
            output: output_hash(frame_id),
            state: state_hash(frame_id),
        },
    }
}

pub fn predicted(frame_id: u64, prev_id: u64, length: u64) -> FrameInfo {
    FrameInfo {
        frame_id,
        length,
        shown: true,
        source_hashes: SourceHashes {
            last: Some(output_hash(prev_id)),
            golden: None,
            alt: None,
            state: Some(state_hash(prev_id)),
        },
        target_hashes: TargetHashes {
            output: output_hash(frame_id),
            state: state_hash(frame_id),
        },
    }
}

/// A track of chained frames: keyframe first, each later frame referencing
/// the previous one.
pub fn chained_track(base_id: u64, len: usize, frame_length: u64) -> Vec<FrameInfo> {
    (0..len as u64)
        .map(|i| {
            if i == 0 {
                keyframe(base_id, frame_length)
            } else {
                predicted(base_id + i, base_id + i - 1, frame_length)
            }
        })
        .collect()
}

/// Switch frames leaning on the source track's references at the departure
/// point, the last one producing `target_output`.
pub fn switch_frames(ids: &[u64], source_id: u64, target_output: u64, length: u64) -> Vec<FrameInfo> {
    ids.iter()
        .enumerate()
        .map(|(i, &frame_id)| FrameInfo {
            frame_id,
            length,
            shown: true,
            source_hashes: SourceHashes {
                last: Some(output_hash(source_id)),
                golden: None,
                alt: None,
                state: Some(state_hash(source_id)),
            },
            target_hashes: TargetHashes {
                output: if i + 1 == ids.len() {
                    target_output
                } else {
                    0x5_0000 + frame_id
                },
                state: 0x6_0000 + frame_id,
            },
        })
        .collect()
}

/// Two tracks joined by a three-frame switch: the expensive track holds the
/// target output at index 30, the switch leaves the cheap track at index 2.
pub fn two_track_fixture() -> (MemoryMetadata, u64) {
    let mut meta = MemoryMetadata::new(640, 480, "mem://test");
    meta.add_track(0, chained_track(0, 5, 50));
    meta.add_track(1, chained_track(200, 31, 1000));
    let target = output_hash(230);
    meta.add_switch(SwitchInfo {
        from_track_id: 0,
        to_track_id: 1,
        from_frame_index: 2,
        to_frame_index: 30,
        switch_start_index: 0,
        frames: switch_frames(&[300, 301, 302], 2, target, 20),
    });
    (meta, target)
}

/// Quality records scoring every shown frame's output at every dri below
/// `max_dri`, so candidates stay comparable wherever their dri numbering
/// starts.
pub fn add_flat_quality(meta: &mut MemoryMetadata, frames: &[FrameInfo], max_dri: u64, quality: f64) {
    for frame in frames.iter().filter(|frame| frame.shown) {
        for dri in 0..max_dri {
            meta.add_quality(QualityRecord {
                original_raster_dri: dri,
                approximate_raster: frame.target_hashes.output,
                quality,
            });
        }
    }
}

/// Point the player's current sequence at one whole track, cursors at zero.
pub fn sequence_on_track(
    player: &mut Player<MemoryMetadata, TestFetcher, TestBackend>,
    track_id: TrackId,
) {
    let frames = player.track_frames[&track_id].clone();
    let mut dri = 0u64;
    let mut sequence = Vec::with_capacity(frames.len());
    for frame in frames {
        let shown = frame.shown;
        sequence.push(FrameInfoWrapper {
            frame,
            origin: Some(track_id),
            dri,
        });
        if shown {
            dri += 1;
        }
    }
    player.current_frame_seq = sequence;
    player.current_download_pt_index = 0;
    player.current_playhead_index = 0;
}
