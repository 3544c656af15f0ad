use burrow_core::{BurrowError, Context, Queue, QueueItem, RedisQueue, Result};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::consumer_config::ConsumerConfig;
use crate::decoder::{Decoder, resolve_decoder};
use crate::limits::{
    MemoryGauge, ProcessMemory, hit_idle_timeout, hit_iterations_limit, hit_memory_limit,
};
use crate::options::{ConsumerOption, ConsumerOptions, OptionSource};
use crate::{Outcome, RunSummary, StopHandle, StopReason, WorkSummary, Worker, Workload};

/// Bookkeeping of a single consume run
struct ConsumerState {
    iteration_count: u64,
    run_started_at: Instant,
    idle_since: Instant,
}

impl ConsumerState {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            iteration_count: 0,
            run_started_at: now,
            idle_since: now,
        }
    }
}

/// Interface for claiming, processing and resolving items from a queue.
pub struct Consumer<Q: Queue, W: Worker> {
    queue: Q,
    worker: W,
    config: ConsumerConfig,
    options: Box<dyn OptionSource>,
    decoder: Option<Decoder>,
    resolved_decoder: Option<Decoder>,
    memory: Box<dyn MemoryGauge>,
    stop: StopHandle,
}

impl<W: Worker> Consumer<RedisQueue, W> {
    pub fn with_context(context: Context, worker: W) -> Self {
        Self::with_queue(RedisQueue::with_context(context), worker)
    }
}

impl<Q: Queue, W: Worker> Consumer<Q, W> {
    pub fn with_queue(queue: Q, worker: W) -> Self {
        Self {
            queue,
            worker,
            config: ConsumerConfig::default(),
            options: Box::new(ConsumerOptions::default()),
            decoder: None,
            resolved_decoder: None,
            memory: Box::new(ProcessMemory::new()),
            stop: StopHandle::default(),
        }
    }

    pub fn with_config(mut self, config: ConsumerConfig) -> Self {
        self.config = config;
        self
    }

    /// Where run options are read from at the start of every run
    pub fn with_options(mut self, options: impl OptionSource + 'static) -> Self {
        self.options = Box::new(options);
        self
    }

    /// Decode item bodies with this instead of the worker's or the JSON decoder
    pub fn with_decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = Some(decoder);
        self.resolved_decoder = None;
        self
    }

    pub fn with_memory_gauge(mut self, memory: impl MemoryGauge + 'static) -> Self {
        self.memory = Box::new(memory);
        self
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn worker(&self) -> &W {
        &self.worker
    }

    /// Handle for stopping a running consumer from another task
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    pub fn is_listening(&self) -> bool {
        self.stop.is_listening()
    }

    /// The decoder for item bodies, resolved on first use
    pub fn decoder(&mut self) -> &Decoder {
        self.resolved_decoder
            .get_or_insert_with(|| resolve_decoder(self.decoder.as_ref(), &self.worker))
    }

    /// Validate the run options against what the queue can do
    pub fn preflight_check(&self) -> Result<ConsumerOptions> {
        if self.config.get_poll_timeout().is_zero() {
            return Err(BurrowError::Configuration(
                "poll timeout must be longer than zero".to_string(),
            ));
        }

        let options = ConsumerOptions::from_source(self.options.as_ref())?;
        if options.get_idle_timeout().is_some() && !self.queue.supports_claim_timeout() {
            return Err(BurrowError::Configuration(format!(
                "option {} is not available for queue {}, it can't bound how long a claim waits",
                ConsumerOption::IdleTimeout,
                self.queue.name()
            )));
        }

        Ok(options)
    }

    /// Process items until a limit is hit, a stop is requested or the worker suspends
    pub async fn consume(&mut self) -> Result<RunSummary> {
        let options = self.preflight_check()?;
        self.queue
            .create_queue()
            .await
            .map_err(BurrowError::into_transport)?;

        let decoder = resolve_decoder(self.decoder.as_ref(), &self.worker);
        self.resolved_decoder = Some(decoder.clone());
        self.log_start(&options, &decoder);

        let mut state = ConsumerState::new();
        let mut summary = RunSummary::default();
        let mut consecutive_errors = 0;
        self.stop.start();

        let result = loop {
            if !self.stop.is_listening() {
                break Ok(if self.stop.timed_out() {
                    StopReason::IdleTimeout
                } else {
                    StopReason::Requested
                });
            }

            let wait = self.claim_wait(&options, &state);
            let item = match self.queue.claim_item(Some(wait)).await {
                Ok(item) => item,
                Err(e) => match self.note_error(&mut consecutive_errors, e).await {
                    Ok(()) => continue,
                    Err(e) => break Err(e),
                },
            };

            let Some(item) = item else {
                consecutive_errors = 0;
                if hit_idle_timeout(options.get_idle_timeout(), state.idle_since.elapsed()) {
                    self.stop.on_idle_timeout();
                }
                continue;
            };

            let processed = self.process_item(&item, &decoder).await;
            state.idle_since = Instant::now();
            let outcome = match processed {
                Ok(outcome) => outcome,
                Err(e) => {
                    // never claim the next item while this one is still held
                    if let Err(e) = self.release_held(&item).await {
                        break Err(e);
                    }
                    match self.note_error(&mut consecutive_errors, e).await {
                        Ok(()) => continue,
                        Err(e) => break Err(e),
                    }
                }
            };
            consecutive_errors = 0;

            summary.record(outcome);
            if outcome.completes_iteration() {
                state.iteration_count += 1;
            }

            if outcome == Outcome::Suspended {
                break Ok(StopReason::Suspended);
            }
            let memory_limit = options.get_memory_limit_bytes();
            if memory_limit > 0 && hit_memory_limit(memory_limit, self.memory.peak_usage_bytes()) {
                break Ok(StopReason::MemoryLimit);
            }
            if hit_iterations_limit(options.get_max_iterations(), state.iteration_count) {
                break Ok(StopReason::IterationLimit);
            }
        };

        self.stop.halt();
        summary.iterations = state.iteration_count;
        let elapsed_ms = state.run_started_at.elapsed().as_millis() as u64;

        match result {
            Ok(stop_reason) => {
                summary.stop_reason = stop_reason;
                info!(
                    queue = %self.queue.name(),
                    iterations = summary.iterations,
                    reason = ?stop_reason,
                    elapsed_ms,
                    "Consumer stopped"
                );
                Ok(summary)
            }
            Err(e) => {
                error!(
                    queue = %self.queue.name(),
                    iterations = summary.iterations,
                    error = %e,
                    elapsed_ms,
                    "Consumer stopped on errors"
                );
                Err(e)
            }
        }
    }

    /// Claim and process at most one item without waiting for one
    pub async fn run_next(&mut self) -> Result<Option<Outcome>> {
        let decoder = self.decoder().clone();
        let Some(item) = self.queue.claim_item(None).await? else {
            return Ok(None);
        };
        match self.process_item(&item, &decoder).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) => {
                self.release_held(&item).await?;
                Err(e)
            }
        }
    }

    /// Release the queue's transport resources
    pub async fn shutdown_queue(&self) -> Result<()> {
        self.queue.shutdown().await
    }

    fn claim_wait(&self, options: &ConsumerOptions, state: &ConsumerState) -> std::time::Duration {
        let poll_timeout = self.config.get_poll_timeout();
        match options.get_idle_timeout() {
            Some(idle_timeout) => {
                let remaining = idle_timeout.saturating_sub(state.idle_since.elapsed());
                remaining.min(poll_timeout)
            }
            None => poll_timeout,
        }
    }

    async fn note_error(&self, consecutive_errors: &mut usize, error: BurrowError) -> Result<()> {
        *consecutive_errors += 1;
        let error = error.into_transport();
        warn!(
            queue = %self.queue.name(),
            error = %error,
            consecutive_errors = *consecutive_errors,
            "Queue operation failed"
        );

        if *consecutive_errors >= self.config.get_max_consecutive_errors() {
            return Err(BurrowError::TooManyErrors {
                count: *consecutive_errors,
                last: Box::new(error),
            });
        }
        tokio::time::sleep(self.config.get_polling_interval()).await;
        Ok(())
    }

    /// Give a claimed item back after resolving it failed
    ///
    /// An item the queue no longer holds as claimed has been resolved after
    /// all, so there's nothing left to release.
    async fn release_held(&self, item: &QueueItem) -> Result<()> {
        match self.queue.release_item(item).await {
            Ok(()) => {
                warn!(
                    item_id = %item.id,
                    queue = %self.queue.name(),
                    "Item released after a failed acknowledgement"
                );
                Ok(())
            }
            Err(BurrowError::ItemNotFound(_)) => Ok(()),
            Err(e) => {
                let e = e.into_transport();
                error!(
                    item_id = %item.id,
                    queue = %self.queue.name(),
                    error = %e,
                    "Item could not be released after a failed acknowledgement"
                );
                Err(e)
            }
        }
    }

    async fn process_item(&self, item: &QueueItem, decoder: &Decoder) -> Result<Outcome> {
        let queue = self.queue.name();
        debug!(item_id = %item.id, queue = %queue, "Item claimed");

        let summary = match decoder.decode(&item.body) {
            Ok(data) => {
                let workload = Workload {
                    item_id: item.id.clone(),
                    queue: queue.to_string(),
                    data,
                    release_count: item.release_count,
                    reject_count: item.reject_count,
                };
                match self.worker.work(&workload).await {
                    Ok(summary) => summary,
                    Err(e) => WorkSummary::Failure(e.to_string()),
                }
            }
            Err(e) => WorkSummary::Failure(format!(
                "body could not be decoded as {}: {}",
                decoder.name(),
                e
            )),
        };

        match summary {
            WorkSummary::Success => {
                self.queue.delete_item(item).await?;
                info!(item_id = %item.id, queue = %queue, "Item acknowledged");
                Ok(Outcome::Acknowledged)
            }
            WorkSummary::Requeue => {
                self.queue.release_item(item).await?;
                info!(item_id = %item.id, queue = %queue, "Item requeued");
                Ok(Outcome::Requeued)
            }
            WorkSummary::Suspend => {
                self.queue.release_item(item).await?;
                self.stop.halt();
                info!(item_id = %item.id, queue = %queue, "Worker suspended the queue, item released");
                Ok(Outcome::Suspended)
            }
            WorkSummary::Failure(reason) => {
                let requeue = self.config.get_reject_requeue();
                error!(
                    item_id = %item.id,
                    queue = %queue,
                    requeue,
                    error = %reason,
                    "Item could not be processed, rejecting"
                );
                self.queue.reject_item(item, requeue).await?;
                Ok(Outcome::Rejected)
            }
        }
    }

    fn log_start(&self, options: &ConsumerOptions, decoder: &Decoder) {
        let queue = self.queue.name();
        match options.get_max_iterations() {
            0 => debug!(
                queue = %queue,
                decoder = %decoder.name(),
                "Consumer ready to receive an unlimited number of items"
            ),
            max => debug!(
                queue = %queue,
                decoder = %decoder.name(),
                "Consumer ready to receive up to {} items",
                max
            ),
        }
    }
}
