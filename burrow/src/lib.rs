//! Burrow connects job-processing hosts to durable work queues.
//!
//! This is an _umbrella crate_ for re-exporting different components of
//! the system from a single place according to the features enabled, like
//! `consume` for the `burrow_consume` crate that runs workers against a
//! queue.
//!
//! Shared pieces from `core` will always be available, regardless of
//! the features enabled.
//!
//! Read documentation for each sub-crate for more information.

pub use burrow_core as core;

#[cfg(feature = "produce")]
pub use burrow_produce as produce;

#[cfg(feature = "consume")]
pub use burrow_consume as consume;

pub mod prelude {
    pub use crate::core::prelude::*;

    #[cfg(feature = "produce")]
    pub use crate::produce::prelude::*;

    #[cfg(feature = "consume")]
    pub use crate::consume::prelude::*;
}
