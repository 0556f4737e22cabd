//! Admission control in front of the detection pipeline.
//!
//! Two pieces of state are shared between the frame-producing thread and the
//! worker: the timestamp of the last accepted frame and a single-flight busy
//! flag. Both are only ever changed by compare-and-set, so two frames arriving
//! together can never both pass.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const NEVER: u64 = u64::MAX;

#[derive(Debug)]
pub struct InferenceThrottle {
    min_interval_ms: u64,
    epoch: Instant,
    last_accepted_ms: AtomicU64,
    busy: AtomicBool,
}

impl InferenceThrottle {
    pub fn new(min_interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            min_interval_ms: min_interval.as_millis() as u64,
            epoch: Instant::now(),
            last_accepted_ms: AtomicU64::new(NEVER),
            busy: AtomicBool::new(false),
        })
    }

    /// Milliseconds since this throttle was created.
    pub fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    pub fn try_admit(self: &Arc<Self>) -> Option<InferenceSlot> {
        self.try_admit_at(self.now_ms())
    }

    /// Claims the pipeline for one frame arriving at `now_ms`.
    ///
    /// Returns `None` (a silent drop) when the frame is too early, when another
    /// frame won the timestamp race, or when an inference is still in flight.
    pub fn try_admit_at(self: &Arc<Self>, now_ms: u64) -> Option<InferenceSlot> {
        let last = self.last_accepted_ms.load(Ordering::Acquire);
        if last != NEVER && now_ms.saturating_sub(last) < self.min_interval_ms {
            return None;
        }
        if self
            .last_accepted_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::trace!("Frame dropped: inference still in flight");
            return None;
        }
        Some(InferenceSlot {
            throttle: Arc::clone(self),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Force-clears the busy flag, used when the pipeline is shut down with
    /// work still in flight.
    pub fn release(&self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Proof that the holder owns the single in-flight inference.
/// Dropping it frees the pipeline for the next eligible frame.
#[derive(Debug)]
pub struct InferenceSlot {
    throttle: Arc<InferenceThrottle>,
}

impl Drop for InferenceSlot {
    fn drop(&mut self) {
        self.throttle.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn first_frame_is_admitted() {
        let throttle = InferenceThrottle::new(Duration::from_millis(250));
        assert!(throttle.try_admit_at(0).is_some());
    }

    #[test]
    fn frames_inside_interval_are_dropped() {
        let throttle = InferenceThrottle::new(Duration::from_millis(250));
        drop(throttle.try_admit_at(1_000).unwrap());
        assert!(throttle.try_admit_at(1_100).is_none());
        assert!(throttle.try_admit_at(1_249).is_none());
        assert!(throttle.try_admit_at(1_250).is_some());
    }

    #[test]
    fn busy_pipeline_drops_eligible_frame() {
        let throttle = InferenceThrottle::new(Duration::from_millis(250));
        let slot = throttle.try_admit_at(0).unwrap();
        assert!(throttle.is_busy());
        assert!(throttle.try_admit_at(500).is_none());
        drop(slot);
        assert!(!throttle.is_busy());
        assert!(throttle.try_admit_at(1_000).is_some());
    }

    #[test]
    fn slot_released_on_panic() {
        let throttle = InferenceThrottle::new(Duration::from_millis(0));
        let slot = throttle.try_admit_at(0).unwrap();
        let result = thread::spawn(move || {
            let _slot = slot;
            panic!("inference failed");
        })
        .join();
        assert!(result.is_err());
        assert!(!throttle.is_busy());
    }

    #[test]
    fn concurrent_burst_admits_once() {
        let throttle = InferenceThrottle::new(Duration::from_millis(250));
        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let throttle = Arc::clone(&throttle);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    // slots are released here, so only the interval guard can hold the others back
                    throttle.try_admit_at(5_000).is_some()
                })
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|admitted| *admitted)
            .count();
        assert_eq!(admitted, 1);
    }

    #[test]
    fn burst_admits_once_per_window() {
        let throttle = InferenceThrottle::new(Duration::from_millis(250));
        // 100 frames, one every 10 ms, each finishing instantly
        let admitted = (0..100u64)
            .filter(|i| throttle.try_admit_at(i * 10).is_some())
            .count();
        assert_eq!(admitted, 4);
    }
}
