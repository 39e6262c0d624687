use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use taxel_wire::{FrameDecoder, FrameQueue};

use crate::chunk::ChunkSource;
use crate::error::{Result, SourceError};

/// Bytes requested from the source per read.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// The dedicated producer thread of the acquisition pipeline.
///
/// Owns the transport and the decoder; loops read → ingest until the source
/// ends or [`stop`](SourcePump::stop) is called. Consumers poll the
/// [`FrameQueue`] handle from any thread.
///
/// `stop` only takes effect at the next chunk boundary — a source blocked
/// in `read_chunk` with no incoming bytes keeps the thread parked until
/// the transport delivers or closes.
pub struct SourcePump {
    handle: JoinHandle<(FrameDecoder, Result<()>)>,
    stop: Arc<AtomicBool>,
    frames: FrameQueue,
}

impl SourcePump {
    /// Move `source` and `decoder` onto a new producer thread and start
    /// pumping.
    pub fn spawn<S>(mut source: S, mut decoder: FrameDecoder) -> Result<Self>
    where
        S: ChunkSource + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let frames = decoder.frames();
        let stop_flag = Arc::clone(&stop);

        let handle = std::thread::Builder::new()
            .name("taxel-pump".into())
            .spawn(move || {
                let mut chunk = [0u8; READ_CHUNK_SIZE];
                let result = loop {
                    if stop_flag.load(Ordering::SeqCst) {
                        break Ok(());
                    }
                    match source.read_chunk(&mut chunk) {
                        Ok(0) => {
                            tracing::debug!("source ended");
                            break Ok(());
                        }
                        Ok(read) => decoder.ingest(&chunk[..read]),
                        Err(err) => {
                            tracing::warn!(error = %err, "source read failed, stopping pump");
                            break Err(err);
                        }
                    }
                };
                (decoder, result)
            })
            .map_err(SourceError::Io)?;

        Ok(Self {
            handle,
            stop,
            frames,
        })
    }

    /// Handle to the finished-frame queue.
    pub fn frames(&self) -> FrameQueue {
        self.frames.clone()
    }

    /// Request the pump loop to exit at the next chunk boundary.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// True once the pump thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the thread to exit and recover the decoder (for its final
    /// stats and any still-buffered frames).
    pub fn join(self) -> Result<FrameDecoder> {
        let (decoder, result) = self.handle.join().map_err(|_| SourceError::Worker)?;
        result?;
        Ok(decoder)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use bytes::BytesMut;
    use taxel_layout::{LayoutDescriptor, SensorLayout};
    use taxel_wire::{encode_packet, pack_samples};

    use super::*;
    use crate::chunk::ReaderSource;

    fn layout() -> SensorLayout {
        LayoutDescriptor::from_json_str(
            r#"{
                "row_array": [0, 1],
                "column_array": [0, 1],
                "bytes_per_point": 1,
                "buffer_length": 8
            }"#,
        )
        .unwrap()
        .try_into()
        .unwrap()
    }

    fn capture(layout: &SensorLayout, frames: u8) -> Vec<u8> {
        let mut wire = BytesMut::new();
        for frame in 0..frames {
            for row in 0..layout.rows() as u8 {
                let samples: Vec<i16> =
                    (0..layout.cols() as i16).map(|col| frame as i16 + col).collect();
                let payload = pack_samples(layout, &samples).unwrap();
                encode_packet(layout, frame, row, &payload, &mut wire).unwrap();
            }
        }
        wire.to_vec()
    }

    #[test]
    fn pumps_capture_to_completion() {
        let layout = layout();
        let decoder = FrameDecoder::with_min_interval(layout.clone(), Duration::ZERO);
        let source = ReaderSource::new(Cursor::new(capture(&layout, 4)));

        let pump = SourcePump::spawn(source, decoder).unwrap();
        let decoder = pump.join().unwrap();

        // Frame 3 has no successor packet, so it is still in progress.
        assert_eq!(decoder.stats().frames_completed, 3);
        let frames = decoder.frames();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames.pop().unwrap().row(0), &[0, 1]);
    }

    #[test]
    fn consumer_polls_while_pumping() {
        let layout = layout();
        let decoder = FrameDecoder::with_min_interval(layout.clone(), Duration::ZERO);
        let source = ReaderSource::new(Cursor::new(capture(&layout, 6)));

        let pump = SourcePump::spawn(source, decoder).unwrap();
        let frames = pump.frames();

        let mut drained = 0;
        while !pump.is_finished() || !frames.is_empty() {
            if frames.pop().is_some() {
                drained += 1;
            } else {
                std::thread::sleep(Duration::from_millis(1));
            }
        }
        assert_eq!(drained, 5);
        pump.join().unwrap();
    }

    #[test]
    fn stop_is_idempotent() {
        let layout = layout();
        let decoder = FrameDecoder::with_min_interval(layout.clone(), Duration::ZERO);
        let source = ReaderSource::new(Cursor::new(Vec::new()));

        let pump = SourcePump::spawn(source, decoder).unwrap();
        pump.stop();
        pump.stop();
        let decoder = pump.join().unwrap();
        assert_eq!(decoder.stats().frames_completed, 0);
    }
}
