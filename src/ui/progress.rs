use std::sync::Mutex;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::intake::{IntakeObserver, Operation};
use crate::models::PipelineDocument;
use crate::ui::icons::CHECK;

/// Terminal front for an [`IntakeObserver`]: shows a spinner while a request
/// is outstanding and forwards every notification to `inner`.
pub struct SpinnerObserver<'a> {
    inner: &'a dyn IntakeObserver,
    message: String,
    bar: Mutex<Option<ProgressBar>>,
}

impl<'a> SpinnerObserver<'a> {
    /// # Arguments
    /// * `inner` - observer that keeps the actual state, usually a `Coordinator`
    /// * `message` - text shown next to the spinner, e.g. "Generating pipeline"
    pub fn new(inner: &'a dyn IntakeObserver, message: impl Into<String>) -> Self {
        Self {
            inner,
            message: message.into(),
            bar: Mutex::new(None),
        }
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    fn start(&self) {
        let spinner_style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style);
        bar.set_message(format!("{}...", self.message));
        bar.enable_steady_tick(Duration::from_millis(100));

        let mut slot = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = slot.replace(bar) {
            previous.finish_and_clear();
        }
    }

    /// Print a line to stderr without tearing the spinner, if one is running.
    fn println(&self, line: &str) {
        let slot = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        match slot.as_ref() {
            Some(bar) => bar.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }

    fn stop(&self) {
        let mut slot = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(bar) = slot.take() {
            bar.finish_and_clear();
        }
    }
}

impl IntakeObserver for SpinnerObserver<'_> {
    fn loading_changed(&self, loading: bool) {
        if loading {
            self.start();
        } else {
            self.stop();
        }
        self.inner.loading_changed(loading);
    }

    fn pipeline_received(&self, pipeline: &PipelineDocument) {
        let count = pipeline.stages.as_ref().map_or(0, Vec::len);
        self.println(&format!("{}Received pipeline with {} stage(s)", CHECK, style(count).cyan()));
        self.inner.pipeline_received(pipeline);
    }

    fn error_changed(&self, operation: Operation, message: Option<&str>) {
        // The command reports the final error; here only record which step failed.
        if let Some(message) = message {
            tracing::debug!(?operation, %message, "request failed");
        }
        self.inner.error_changed(operation, message);
    }
}
