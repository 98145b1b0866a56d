//! Cooperative cancellation and progress reporting for the filter stage.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

/// Progress sample emitted while the mean-shift filter runs.
#[derive(Clone, Copy, Debug)]
pub struct FilterProgress {
    pub completed: usize,
    pub total: usize,
}

/// Shared handle the caller keeps while a decomposition runs. Cancellation
/// is a one-way latch; progress updates are optional and lossy on the
/// receiving side by design.
#[derive(Debug, Default)]
pub struct FilterControl {
    cancelled: Arc<AtomicBool>,
    completed: AtomicUsize,
    progress: Option<Mutex<Sender<FilterProgress>>>,
}

impl FilterControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(sender: Sender<FilterProgress>) -> Self {
        Self {
            progress: Some(Mutex::new(sender)),
            ..Self::default()
        }
    }

    /// Flag shared with the worker; flip it from any thread to stop.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Record `delta` finished pixels and push a progress sample if a
    /// receiver is attached. Send failures mean the receiver is gone and
    /// are ignored.
    pub fn advance(&self, delta: usize, total: usize) {
        let completed = self.completed.fetch_add(delta, Ordering::Relaxed) + delta;
        if let Some(sender) = &self.progress {
            if let Ok(sender) = sender.lock() {
                let _ = sender.send(FilterProgress { completed, total });
            }
        }
    }
}
