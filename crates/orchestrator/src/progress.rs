use std::sync::Mutex;
use tokio::sync::watch;

/// Snapshot of job progress, published through a `watch` channel.
///
/// Counters are monotonically non-decreasing within a job; consumers only
/// ever observe the latest snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// Requests with a terminal result so far.
    pub current_index: usize,

    /// Total requests in the job.
    pub total: usize,

    /// Batch currently being processed (1-based, 0 before the first).
    pub current_batch: usize,

    /// Total batches the job packed into.
    pub total_batches: usize,

    /// Whether the auxiliary fee payment is in flight.
    pub processing_fee: bool,
}

/// Publisher side of the progress channel, held by the orchestrator.
pub struct ProgressTracker {
    tx: watch::Sender<Progress>,
    state: Mutex<Progress>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Progress::default());
        Self {
            tx,
            state: Mutex::new(Progress::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.tx.subscribe()
    }

    /// Reset counters at the start of a new job.
    pub fn reset(&self, total: usize) {
        let mut state = self.state.lock().unwrap();
        *state = Progress {
            total,
            ..Progress::default()
        };
        let _ = self.tx.send(*state);
    }

    pub fn set_total_batches(&self, total_batches: usize) {
        self.update(|p| p.total_batches = total_batches);
    }

    pub fn start_batch(&self, batch_number: usize) {
        self.update(|p| p.current_batch = batch_number);
    }

    /// Record one more request reaching a terminal result.
    pub fn bump(&self) {
        self.update(|p| p.current_index += 1);
    }

    pub fn set_processing_fee(&self, processing: bool) {
        self.update(|p| p.processing_fee = processing);
    }

    fn update(&self, f: impl FnOnce(&mut Progress)) {
        let mut state = self.state.lock().unwrap();
        f(&mut state);
        // Receivers may all have been dropped; the job does not care.
        let _ = self.tx.send(*state);
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let tracker = ProgressTracker::new();
        let rx = tracker.subscribe();

        tracker.reset(5);
        tracker.set_total_batches(2);
        tracker.start_batch(1);
        tracker.bump();
        tracker.bump();
        tracker.bump();

        let snapshot = *rx.borrow();
        assert_eq!(snapshot.current_index, 3);
        assert_eq!(snapshot.total, 5);
        assert_eq!(snapshot.current_batch, 1);
        assert_eq!(snapshot.total_batches, 2);
    }

    #[test]
    fn test_reset_starts_a_fresh_job() {
        let tracker = ProgressTracker::new();
        tracker.reset(3);
        tracker.bump();
        tracker.bump();
        tracker.reset(7);

        let rx = tracker.subscribe();
        let snapshot = *rx.borrow();
        assert_eq!(snapshot.current_index, 0);
        assert_eq!(snapshot.total, 7);
    }

    #[test]
    fn test_publish_survives_dropped_receiver() {
        let tracker = ProgressTracker::new();
        let rx = tracker.subscribe();
        drop(rx);
        tracker.reset(1);
        tracker.bump();
    }

    #[test]
    fn test_fee_flag_toggles() {
        let tracker = ProgressTracker::new();
        let rx = tracker.subscribe();
        tracker.set_processing_fee(true);
        assert!(rx.borrow().processing_fee);
        tracker.set_processing_fee(false);
        assert!(!rx.borrow().processing_fee);
    }
}
