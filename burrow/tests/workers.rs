#![allow(dead_code)]

use burrow_consume::{Decoder, MemoryGauge, WorkSummary, Worker, Workload};
use burrow_core::{BurrowError, Result};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Acknowledges everything and remembers the data it saw
#[derive(Clone, Default)]
pub struct RecordingWorker {
    seen: Arc<Mutex<Vec<Value>>>,
}

impl RecordingWorker {
    pub fn seen(&self) -> Vec<Value> {
        self.seen.lock().unwrap().clone()
    }
}

impl Worker for RecordingWorker {
    async fn work(&self, workload: &Workload) -> Result<WorkSummary> {
        self.seen.lock().unwrap().push(workload.data.clone());
        Ok(WorkSummary::Success)
    }
}

/// Does whatever the item's `action` field says
///
/// Actions `requeue` and `fail` only apply the first time an item is seen so
/// a redelivered item succeeds.
#[derive(Clone, Default)]
pub struct ScriptedWorker {
    seen: Arc<Mutex<Vec<String>>>,
}

impl ScriptedWorker {
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl Worker for ScriptedWorker {
    async fn work(&self, workload: &Workload) -> Result<WorkSummary> {
        let action = workload.data["action"].as_str().unwrap_or("ok").to_string();
        self.seen.lock().unwrap().push(action.clone());

        let first_delivery = workload.release_count == 0 && workload.reject_count == 0;
        match action.as_str() {
            "requeue" if first_delivery => Ok(WorkSummary::Requeue),
            "fail" if first_delivery => Ok(WorkSummary::Failure("scripted failure".to_string())),
            "error" if first_delivery => Err(BurrowError::Runtime("worker blew up".to_string())),
            "suspend" => Ok(WorkSummary::Suspend),
            _ => Ok(WorkSummary::Success),
        }
    }
}

/// Fails every single item
pub struct FailingWorker;

impl Worker for FailingWorker {
    async fn work(&self, _: &Workload) -> Result<WorkSummary> {
        Ok(WorkSummary::Failure("always fails".to_string()))
    }
}

/// Wants item bodies as plain text
#[derive(Clone, Default)]
pub struct TextWorker {
    inner: RecordingWorker,
}

impl TextWorker {
    pub fn seen(&self) -> Vec<Value> {
        self.inner.seen()
    }
}

impl Worker for TextWorker {
    async fn work(&self, workload: &Workload) -> Result<WorkSummary> {
        self.inner.work(workload).await
    }

    fn decoder(&self) -> Option<Decoder> {
        Some(Decoder::text())
    }
}

/// Memory use grows by a fixed step every time it's measured
#[derive(Clone)]
pub struct GrowingMemory {
    step: u64,
    samples: Arc<AtomicU64>,
}

impl GrowingMemory {
    pub fn new(step: u64) -> Self {
        Self {
            step,
            samples: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::SeqCst)
    }
}

impl MemoryGauge for GrowingMemory {
    fn peak_usage_bytes(&self) -> u64 {
        let samples = self.samples.fetch_add(1, Ordering::SeqCst) + 1;
        samples * self.step
    }
}
