//! Burrow consumer components for processing items from a queue
//!
//! The Consumer claims items from the queue one at a time, hands them to a
//! Worker and acknowledges, requeues or rejects them based on the outcome.
//! Run options decide when it stops: iteration and memory limits, an idle
//! timeout, or an explicit stop request through a StopHandle.

mod consumer;
mod consumer_config;
mod decoder;
mod limits;
mod options;
mod run_summary;
mod stop_handle;
mod worker;

pub use consumer::Consumer;
pub use consumer_config::ConsumerConfig;
pub use decoder::{Decoder, resolve_decoder};
pub use limits::{
    MemoryGauge, ProcessMemory, hit_idle_timeout, hit_iterations_limit, hit_memory_limit,
};
pub use options::{ConsumerOption, ConsumerOptions, EnvOptions, OptionSource};
pub use run_summary::{RunSummary, StopReason};
pub use stop_handle::StopHandle;
pub use worker::{Outcome, WorkSummary, Worker, Workload};

pub mod prelude {
    pub use crate::{
        Consumer, ConsumerConfig, ConsumerOptions, Decoder, Outcome, RunSummary, StopHandle,
        StopReason, WorkSummary, Worker, Workload,
    };
}
