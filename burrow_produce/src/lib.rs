//! `burrow_produce` provides the interface for submitting items to Burrow queues.
//!
//! This crate allows users to submit items with priorities, clean up single
//! items and purge whole queues.

mod item_plan;
mod producer;

pub use item_plan::ItemPlan;
pub use producer::Producer;

pub mod prelude {
    pub use crate::{ItemPlan, Producer};
}
