//! Owner of the three display slots (pipeline, loading, error) that the
//! intake form writes and the renderer reads.

use std::sync::{Mutex, MutexGuard};

use crate::intake::{IntakeObserver, Operation};
use crate::models::PipelineDocument;

/// Point-in-time copy of the coordinator's slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinatorSnapshot {
    pub pipeline: Option<PipelineDocument>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Default)]
struct Slots {
    pipeline: Option<PipelineDocument>,
    in_flight: usize,
    error: Option<String>,
}

/// Shared state between the form and the renderer.
///
/// A failed generate clears the displayed pipeline; a failed analyze only
/// sets the error and keeps whatever pipeline is already shown.
#[derive(Default)]
pub struct Coordinator {
    slots: Mutex<Slots>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> CoordinatorSnapshot {
        let slots = self.lock();
        CoordinatorSnapshot {
            pipeline: slots.pipeline.clone(),
            loading: slots.in_flight > 0,
            error: slots.error.clone(),
        }
    }

    pub fn pipeline(&self) -> Option<PipelineDocument> {
        self.lock().pipeline.clone()
    }

    /// True while at least one request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }
}

impl IntakeObserver for Coordinator {
    fn loading_changed(&self, loading: bool) {
        let mut slots = self.lock();
        if loading {
            slots.in_flight += 1;
        } else {
            slots.in_flight = slots.in_flight.saturating_sub(1);
        }
    }

    fn pipeline_received(&self, pipeline: &PipelineDocument) {
        let mut slots = self.lock();
        slots.pipeline = Some(pipeline.clone());
        slots.error = None;
    }

    fn error_changed(&self, operation: Operation, message: Option<&str>) {
        let mut slots = self.lock();
        slots.error = message.map(str::to_string);
        if operation == Operation::Generate && message.is_some() {
            slots.pipeline = None;
        }
    }
}
