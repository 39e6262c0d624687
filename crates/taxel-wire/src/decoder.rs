use std::time::{Duration, Instant, SystemTime};

use bytes::{Buf, BytesMut};
use taxel_layout::SensorLayout;

use crate::frame::Frame;
use crate::packet::{crc16, FRAME_INDEX_OFFSET, HEADER_LEN, MAGIC, ROW_INDEX_OFFSET};
use crate::ring::FrameQueue;

/// Minimum spacing between emitted frames.
///
/// Completed frames arriving faster than this are staged but never queued,
/// protecting downstream consumers from oversampling.
pub const MINIMUM_INTERVAL: Duration = Duration::from_millis(10);

/// Running decode counters, readable at any time via [`FrameDecoder::stats`].
///
/// The structured replacement for an in-band warning string: every warning
/// logged through `tracing` is also reflected here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Row packets that passed CRC and sequence validation.
    pub packets_accepted: u64,
    /// Candidate packets discarded for a CRC mismatch.
    pub crc_errors: u64,
    /// Packets discarded for a row/frame sequence mismatch, plus frames
    /// abandoned incomplete at a new frame start.
    pub sequence_errors: u64,
    /// Frames reconstructed and pushed to the queue.
    pub frames_completed: u64,
    /// Frames completed but discarded by the minimum-interval throttle.
    pub frames_throttled: u64,
    /// Queued frames evicted unread by newer ones.
    pub frames_evicted: u64,
}

/// Streaming frame decoder for the tactile sensor wire protocol.
///
/// Single-writer by construction: `ingest` takes `&mut self`, so exactly one
/// producer thread (the one owning the physical transport) can drive it.
/// The only state shared with other threads is the finished-frame queue,
/// obtained via [`frames`](FrameDecoder::frames).
///
/// `ingest` never blocks, never sleeps, and never fails: corrupted or
/// out-of-sequence bytes are logged, counted, and resynchronized past,
/// because the decoder must run unattended against a noisy physical link.
pub struct FrameDecoder {
    layout: SensorLayout,
    residual: BytesMut,
    /// In-progress frame, one buffer per sample byte-plane.
    preparing: Vec<Vec<u8>>,
    /// Staging copy of the last completed frame, so the next frame can keep
    /// writing into `preparing` while this one is reconstructed.
    finished: Vec<Vec<u8>>,
    last_frame_index: Option<u8>,
    last_row_index: Option<u8>,
    last_emit: Option<Instant>,
    min_interval: Duration,
    queue: FrameQueue,
    stats: DecoderStats,
}

impl FrameDecoder {
    /// Decoder with the standard 10 ms emission throttle.
    pub fn new(layout: SensorLayout) -> Self {
        Self::with_min_interval(layout, MINIMUM_INTERVAL)
    }

    /// Decoder with an explicit emission throttle.
    ///
    /// Offline replay and tests pass [`Duration::ZERO`] so every completed
    /// frame is emitted regardless of wall-clock pacing.
    pub fn with_min_interval(layout: SensorLayout, min_interval: Duration) -> Self {
        let cells = layout.rows() * layout.cols();
        let planes = layout.sample_width().bytes();
        let queue = FrameQueue::with_capacity(layout.ring_capacity());
        Self {
            preparing: vec![vec![0u8; cells]; planes],
            finished: vec![vec![0u8; cells]; planes],
            residual: BytesMut::new(),
            last_frame_index: None,
            last_row_index: None,
            last_emit: None,
            min_interval,
            queue,
            stats: DecoderStats::default(),
            layout,
        }
    }

    /// The layout this decoder was built for.
    pub fn layout(&self) -> &SensorLayout {
        &self.layout
    }

    /// Cloneable handle to the finished-frame queue, for the consumer thread.
    pub fn frames(&self) -> FrameQueue {
        self.queue.clone()
    }

    /// Running decode counters.
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Pop the oldest finished frame (FIFO), or `None` when nothing is ready.
    pub fn pop(&self) -> Option<Frame> {
        self.queue.pop()
    }

    /// Pop the newest finished frame and discard everything older.
    pub fn pop_latest(&self) -> Option<Frame> {
        self.queue.pop_latest()
    }

    /// Feed newly received bytes, at whatever granularity the transport
    /// delivers them.
    ///
    /// Scans the accumulated residual for complete packets, validates each
    /// against CRC and row sequence, assembles rows into frames, and queues
    /// completed frames. Unparsed trailing bytes carry over to the next
    /// call, capped at `layout.max_residual()`.
    pub fn ingest(&mut self, bytes: &[u8]) {
        self.residual.extend_from_slice(bytes);

        let packet_len = self.layout.packet_len();
        let payload_len = self.layout.payload_len();
        let mut offset = 0usize;

        while offset + packet_len <= self.residual.len() {
            if self.residual[offset..offset + MAGIC.len()] != MAGIC {
                // Not a header. Slide one byte so noise can never wedge us.
                offset += 1;
                continue;
            }

            let frame_index = self.residual[offset + FRAME_INDEX_OFFSET];
            let row_index = self.residual[offset + ROW_INDEX_OFFSET];
            let body_end = offset + HEADER_LEN + payload_len;

            let received = u16::from_be_bytes([
                self.residual[body_end],
                self.residual[body_end + 1],
            ]);
            let computed = crc16(&self.residual[offset..body_end]);
            if received != computed {
                self.stats.crc_errors += 1;
                tracing::warn!(received, computed, "CRC check failed");
                // A false header match may hide a real packet one byte on.
                offset += 1;
                continue;
            }

            if self.validate(frame_index, row_index) {
                self.stats.packets_accepted += 1;
                write_row(
                    &self.layout,
                    &mut self.preparing,
                    &self.residual[offset + HEADER_LEN..body_end],
                    row_index,
                );
                offset += packet_len;
            } else {
                offset += 1;
            }
        }

        self.residual.advance(offset);
        let max_residual = self.layout.max_residual();
        if self.residual.len() > max_residual {
            self.residual.advance(self.residual.len() - max_residual);
        }
    }

    /// Row-sequence state machine.
    ///
    /// Accepting a packet means its payload will be written into the
    /// in-progress frame. A `row_index` of 0 both finalizes the previous
    /// frame (when it reached its last row) and starts a new one; mid-frame
    /// gaps drop packets until the next row 0 arrives.
    fn validate(&mut self, frame_index: u8, row_index: u8) -> bool {
        let final_row = (self.layout.rows() - 1) as u8;

        let Some(last_frame) = self.last_frame_index else {
            // Waiting for the first frame start; anything else is mid-frame
            // traffic from before we attached.
            if row_index == 0 {
                self.last_frame_index = Some(frame_index);
                self.last_row_index = Some(0);
                return true;
            }
            return false;
        };

        if row_index == 0 {
            if self.last_row_index == Some(final_row) {
                self.finalize();
            } else {
                self.stats.sequence_errors += 1;
                tracing::warn!(
                    last_frame,
                    last_row = ?self.last_row_index,
                    new_frame = frame_index,
                    "frame incomplete at new frame start, dropping it"
                );
            }
            // Either way the new frame starts fresh; stalling on a broken
            // frame would wedge the stream forever.
            self.last_frame_index = Some(frame_index);
            self.last_row_index = Some(0);
            return true;
        }

        let contiguous = self.last_row_index.map(|row| row.wrapping_add(1)) == Some(row_index)
            && frame_index == last_frame;
        if contiguous {
            self.last_row_index = Some(row_index);
            true
        } else {
            self.stats.sequence_errors += 1;
            tracing::warn!(
                last_frame,
                last_row = ?self.last_row_index,
                frame = frame_index,
                row = row_index,
                "row sequence mismatch, packet dropped"
            );
            false
        }
    }

    /// Stage the completed frame and, throttle permitting, reconstruct and
    /// queue it.
    ///
    /// A throttled frame still counts as consumed for sequencing; only its
    /// emission is skipped.
    fn finalize(&mut self) {
        for (staged, live) in self.finished.iter_mut().zip(&self.preparing) {
            staged.copy_from_slice(live);
        }

        let now = Instant::now();
        if let Some(last) = self.last_emit {
            if now.duration_since(last) < self.min_interval {
                self.stats.frames_throttled += 1;
                return;
            }
        }
        self.last_emit = Some(now);

        let frame = Frame::reconstruct(&self.layout, &self.finished, SystemTime::now());
        if self.queue.push(frame) {
            self.stats.frames_evicted += 1;
        }
        self.stats.frames_completed += 1;
    }
}

/// Write one row payload into the in-progress byte-planes.
///
/// The payload interleaves one byte per plane per sample in wire order.
/// Each plane's strided sub-sequence is gathered through `column_order` and
/// scattered to the output row `row_order[wire_row]`, rectifying arbitrary
/// physical wiring into the canonical frame.
fn write_row(layout: &SensorLayout, planes: &mut [Vec<u8>], payload: &[u8], wire_row: u8) {
    let cols = layout.cols();
    let width = planes.len();
    let base = layout.row_order()[wire_row as usize] * cols;

    for (plane_index, plane) in planes.iter_mut().enumerate() {
        let row_out = &mut plane[base..base + cols];
        for (col, cell) in row_out.iter_mut().enumerate() {
            *cell = payload[layout.column_order()[col] * width + plane_index];
        }
    }
}
