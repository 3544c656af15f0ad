use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

#[derive(Debug, Default)]
struct StopSignal {
    listening: AtomicBool,
    timed_out: AtomicBool,
}

/// Cloneable handle that asks a running consumer to stop
///
/// The consumer checks the handle before every claim, so a request made
/// while it waits for an item takes effect once that wait ends.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    signal: Arc<StopSignal>,
}

impl StopHandle {
    /// Ask the consumer to stop after the item it's currently on
    pub fn request_stop(&self) {
        if self.signal.listening.swap(false, Ordering::SeqCst) {
            info!("Consumer stop requested");
        }
    }

    /// Stop because no item arrived in time
    pub fn on_idle_timeout(&self) {
        info!("Idle timeout reached");
        self.signal.timed_out.store(true, Ordering::SeqCst);
        self.signal.listening.store(false, Ordering::SeqCst);
    }

    pub fn is_listening(&self) -> bool {
        self.signal.listening.load(Ordering::SeqCst)
    }

    pub(crate) fn timed_out(&self) -> bool {
        self.signal.timed_out.load(Ordering::SeqCst)
    }

    pub(crate) fn start(&self) {
        self.signal.timed_out.store(false, Ordering::SeqCst);
        self.signal.listening.store(true, Ordering::SeqCst);
    }

    pub(crate) fn halt(&self) {
        self.signal.listening.store(false, Ordering::SeqCst);
    }
}
