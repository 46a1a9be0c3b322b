//! External stop signal for a running navigation loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable, thread-safe stop flag.
///
/// The loop checks it between iterations; the wait engine and the action
/// executor check it between polls and retries so a stop request does not
/// sit through the remaining attempts of the state in flight.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Clear the flag before a new run.
    pub fn reset(&self) {
        self.stopped.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_observe_stop() {
        let handle = StopHandle::new();
        let remote = handle.clone();
        assert!(!handle.is_stopped());

        remote.stop();
        assert!(handle.is_stopped());

        handle.reset();
        assert!(!remote.is_stopped());
    }

    #[test]
    fn stop_crosses_threads() {
        let handle = StopHandle::new();
        let remote = handle.clone();
        std::thread::spawn(move || remote.stop()).join().unwrap();
        assert!(handle.is_stopped());
    }
}
