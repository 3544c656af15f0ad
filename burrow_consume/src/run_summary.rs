use crate::Outcome;

/// Why a consume run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopReason {
    /// Someone called `request_stop` on the consumer or a handle
    #[default]
    Requested,
    IdleTimeout,
    IterationLimit,
    MemoryLimit,

    /// The worker asked to suspend the queue
    Suspended,
}

/// Tally of a finished consume run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items that counted against the iteration limit
    pub iterations: u64,
    pub acknowledged: u64,
    pub requeued: u64,
    pub rejected: u64,
    pub stop_reason: StopReason,
}

impl RunSummary {
    pub(crate) fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Acknowledged => self.acknowledged += 1,
            Outcome::Requeued | Outcome::Suspended => self.requeued += 1,
            Outcome::Rejected => self.rejected += 1,
        }
    }
}
