use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::frame::Frame;

/// Bounded FIFO of completed frames, shared between the decoding thread and
/// a consumer thread.
///
/// This is the only cross-thread state in the pipeline. Pushing when full
/// evicts the oldest frame, so the producer never blocks; popping when
/// empty returns `None`, so the consumer never blocks. Live visualization
/// wants the freshest data, not completeness.
#[derive(Clone)]
pub struct FrameQueue {
    inner: Arc<Mutex<Ring>>,
}

struct Ring {
    frames: VecDeque<Frame>,
    capacity: usize,
}

impl FrameQueue {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Ring {
                frames: VecDeque::with_capacity(capacity),
                capacity,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ring> {
        // A poisoned queue only means a consumer panicked mid-pop; the
        // frames themselves are still consistent.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Push a frame, evicting the oldest when full. Returns `true` if a
    /// frame was evicted.
    pub(crate) fn push(&self, frame: Frame) -> bool {
        let mut ring = self.lock();
        let evicted = ring.frames.len() == ring.capacity;
        if evicted {
            ring.frames.pop_front();
        }
        ring.frames.push_back(frame);
        evicted
    }

    /// Pop the oldest buffered frame, or `None` when nothing is ready.
    pub fn pop(&self) -> Option<Frame> {
        self.lock().frames.pop_front()
    }

    /// Pop the newest buffered frame and discard everything older.
    ///
    /// Skip-stale policy for consumers that only want the current state,
    /// e.g. a live heatmap.
    pub fn pop_latest(&self) -> Option<Frame> {
        let mut ring = self.lock();
        let newest = ring.frames.pop_back();
        ring.frames.clear();
        newest
    }

    /// Buffered frame count.
    pub fn len(&self) -> usize {
        self.lock().frames.len()
    }

    /// True when no frames are buffered.
    pub fn is_empty(&self) -> bool {
        self.lock().frames.is_empty()
    }

    /// Maximum buffered frames before eviction.
    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use taxel_layout::{LayoutDescriptor, SensorLayout};

    use super::*;

    fn frame(value: u8) -> Frame {
        let layout: SensorLayout = LayoutDescriptor::from_json_str(
            r#"{"row_array": [0], "column_array": [0], "bytes_per_point": 1}"#,
        )
        .unwrap()
        .try_into()
        .unwrap();
        Frame::reconstruct(&layout, &[vec![value]], SystemTime::now())
    }

    #[test]
    fn fifo_order() {
        let queue = FrameQueue::with_capacity(4);
        assert!(queue.is_empty());

        queue.push(frame(1));
        queue.push(frame(2));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().unwrap().as_slice(), &[1]);
        assert_eq!(queue.pop().unwrap().as_slice(), &[2]);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn overflow_evicts_oldest() {
        let queue = FrameQueue::with_capacity(2);
        assert!(!queue.push(frame(1)));
        assert!(!queue.push(frame(2)));
        assert!(queue.push(frame(3)));

        assert_eq!(queue.pop().unwrap().as_slice(), &[2]);
        assert_eq!(queue.pop().unwrap().as_slice(), &[3]);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn pop_latest_discards_older() {
        let queue = FrameQueue::with_capacity(4);
        queue.push(frame(1));
        queue.push(frame(2));
        queue.push(frame(3));

        assert_eq!(queue.pop_latest().unwrap().as_slice(), &[3]);
        assert!(queue.pop().is_none());
        assert!(queue.pop_latest().is_none());
    }

    #[test]
    fn shared_across_threads() {
        let queue = FrameQueue::with_capacity(8);
        let producer = queue.clone();

        let handle = std::thread::spawn(move || {
            for i in 0..5 {
                producer.push(frame(i));
            }
        });
        handle.join().unwrap();

        let mut drained = 0;
        while queue.pop().is_some() {
            drained += 1;
        }
        assert_eq!(drained, 5);
    }
}
