use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use sysinfo::{Pid, System};
use tracing::{info, warn};

/// Has the consumer handled as many items as it was allowed to?
pub fn hit_iterations_limit(max_iterations: u64, iteration_count: u64) -> bool {
    if max_iterations > 0 && iteration_count >= max_iterations {
        info!(
            max_iterations,
            iteration_count, "Consumer has reached max number of iterations, exiting"
        );
        return true;
    }
    false
}

/// Has peak memory use reached the limit? A limit of zero or less never triggers.
pub fn hit_memory_limit(memory_limit_bytes: i64, peak_usage_bytes: u64) -> bool {
    if memory_limit_bytes <= 0 {
        return false;
    }
    if peak_usage_bytes >= memory_limit_bytes as u64 {
        info!(
            memory_limit_bytes,
            peak_usage_bytes, "Consumer has reached or exceeded its memory limit, exiting"
        );
        return true;
    }
    false
}

/// Has the consumer gone without items for longer than allowed?
pub fn hit_idle_timeout(idle_timeout: Option<Duration>, idle_for: Duration) -> bool {
    match idle_timeout {
        Some(timeout) if idle_for >= timeout => {
            info!(
                idle_timeout_secs = timeout.as_secs(),
                "Consumer has been idle for too long, exiting"
            );
            true
        }
        _ => false,
    }
}

/// Source of the process' peak memory use
pub trait MemoryGauge: Send + Sync {
    fn peak_usage_bytes(&self) -> u64;
}

/// Samples the resident set of the current process
///
/// The operating system only reports the current usage, so the gauge keeps
/// the highest value it has seen.
pub struct ProcessMemory {
    system: Mutex<System>,
    pid: Option<Pid>,
    peak: AtomicU64,
}

impl ProcessMemory {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                warn!(error = %e, "Can't resolve own process id, memory limit is disabled");
                None
            }
        };

        Self {
            system: Mutex::new(System::new()),
            pid,
            peak: AtomicU64::new(0),
        }
    }

    fn sample(&self) -> Option<u64> {
        let pid = self.pid?;
        let mut system = self.system.lock().ok()?;
        if !system.refresh_process(pid) {
            return None;
        }
        system.process(pid).map(|process| process.memory())
    }
}

impl Default for ProcessMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGauge for ProcessMemory {
    fn peak_usage_bytes(&self) -> u64 {
        if let Some(current) = self.sample() {
            self.peak.fetch_max(current, Ordering::Relaxed);
        }
        self.peak.load(Ordering::Relaxed)
    }
}
