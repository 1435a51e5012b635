//! Diagnostics (Component I, §4.9): structured, caller-visible progress
//! reporting, independent of the developer-facing `tracing` logging that
//! every other component also emits directly.

use crate::model::Stage;

/// Leveled events a [`DiagnosticsSink`] can be asked to report.
#[derive(Debug, Clone)]
pub enum Event {
    /// A pipeline stage is about to run.
    StageStarted {
        /// The stage beginning execution.
        stage: Stage,
    },
    /// A pipeline stage finished successfully.
    StageCompleted {
        /// The stage that finished.
        stage: Stage,
    },
    /// Progress within the scoring engine's batch loop.
    BatchProgress {
        /// Batches sent so far.
        completed_batches: usize,
        /// Total batches to send.
        total_batches: usize,
    },
    /// A non-fatal warning (e.g. a cache-integrity issue, a retried
    /// request).
    Warning {
        /// Human-readable description.
        message: String,
    },
    /// A fatal error about to be surfaced to the orchestrator's caller.
    Error {
        /// Human-readable description.
        message: String,
    },
}

/// Receives [`Event`]s as the pipeline runs. Implementations are expected
/// to be cheap and non-blocking; `Orchestrator` holds one `Arc<dyn
/// DiagnosticsSink>` for the lifetime of a `run` call.
pub trait DiagnosticsSink: Send + Sync {
    /// Report a single event.
    fn report(&self, event: Event);
}

/// Default sink: forwards every event to `tracing` at an appropriate
/// level. Used when a caller does not supply its own sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn report(&self, event: Event) {
        match event {
            Event::StageStarted { stage } => tracing::info!(?stage, "stage started"),
            Event::StageCompleted { stage } => tracing::info!(?stage, "stage completed"),
            Event::BatchProgress {
                completed_batches,
                total_batches,
            } => tracing::info!(completed_batches, total_batches, "batch progress"),
            Event::Warning { message } => tracing::warn!(message = %message, "warning"),
            Event::Error { message } => tracing::error!(message = %message, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<String>>);

    impl DiagnosticsSink for RecordingSink {
        fn report(&self, event: Event) {
            let label = match event {
                Event::StageStarted { .. } => "started",
                Event::StageCompleted { .. } => "completed",
                Event::BatchProgress { .. } => "progress",
                Event::Warning { .. } => "warning",
                Event::Error { .. } => "error",
            };
            self.0.lock().unwrap().push(label.to_string());
        }
    }

    #[test]
    fn sink_receives_reported_events() {
        let sink = RecordingSink::default();
        sink.report(Event::StageStarted { stage: Stage::Audio });
        sink.report(Event::Warning {
            message: "hi".to_string(),
        });
        assert_eq!(*sink.0.lock().unwrap(), vec!["started", "warning"]);
    }

    #[test]
    fn tracing_sink_does_not_panic() {
        let sink = TracingSink;
        sink.report(Event::StageCompleted { stage: Stage::Scoring });
    }
}
