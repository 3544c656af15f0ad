use std::time::Duration;

/// Configuration options for a Consumer
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Longest single wait for an item; also bounds how quickly a stop request is noticed
    poll_timeout: Duration,

    /// How long to back off after a failed queue call
    polling_interval: Duration,

    /// Maximum number of consecutive errors before stopping
    max_consecutive_errors: usize,

    /// Whether failed items go back to the queue or are set aside
    reject_requeue: bool,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(1),
            polling_interval: Duration::from_millis(100),
            max_consecutive_errors: 3,
            reject_requeue: true,
        }
    }
}

impl ConsumerConfig {
    pub fn new() -> ConsumerConfig {
        ConsumerConfig::default()
    }

    pub fn poll_timeout(mut self, poll_timeout: Duration) -> ConsumerConfig {
        self.poll_timeout = poll_timeout;
        self
    }
    pub fn get_poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    pub fn polling_interval(mut self, polling_interval: Duration) -> ConsumerConfig {
        self.polling_interval = polling_interval;
        self
    }
    pub fn get_polling_interval(&self) -> Duration {
        self.polling_interval
    }

    pub fn max_consecutive_errors(mut self, max_consecutive_errors: usize) -> ConsumerConfig {
        self.max_consecutive_errors = max_consecutive_errors;
        self
    }
    pub fn get_max_consecutive_errors(&self) -> usize {
        self.max_consecutive_errors
    }

    pub fn reject_requeue(mut self, reject_requeue: bool) -> ConsumerConfig {
        self.reject_requeue = reject_requeue;
        self
    }
    pub fn get_reject_requeue(&self) -> bool {
        self.reject_requeue
    }
}
