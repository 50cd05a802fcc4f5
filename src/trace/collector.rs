//! Drawing-gesture state machine
//!
//! ```text
//!   Idle --drawing=true--> Collecting --drawing=false--> Idle (+ submit)
//! ```
//!
//! The submission guard is the transition itself: an end event seen while
//! `Idle` does nothing, so a repeated `false` never submits twice.

use super::{PeriodicTask, PointerSample, Trace};
use crate::backend::Backend;
use crate::state::{AppStatus, AudioRangeStore, SharedUiState};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Observable phase of the collector
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectorPhase {
    Idle,
    Collecting,
}

/// What a call to [`TraceCollector::observe`] did
#[derive(Clone, Debug, PartialEq)]
pub enum Transition {
    /// The flag matched the current phase
    Unchanged,
    /// A new gesture started
    Started,
    /// The gesture ended; this trace was handed to the backend
    Submitted(Trace),
}

struct ActiveGesture {
    id: Uuid,
    started_at: DateTime<Utc>,
    buffer: Arc<Mutex<Vec<PointerSample>>>,
    sampler: Option<PeriodicTask>,
}

enum Phase {
    Idle,
    Collecting(ActiveGesture),
}

pub struct TraceCollector {
    ui: SharedUiState,
    range: AudioRangeStore,
    backend: Arc<dyn Backend>,
    period: Duration,
    phase: Phase,
    submitted: u64,
}

impl TraceCollector {
    pub fn new(
        ui: SharedUiState,
        range: AudioRangeStore,
        backend: Arc<dyn Backend>,
        period: Duration,
    ) -> Self {
        Self {
            ui,
            range,
            backend,
            period,
            phase: Phase::Idle,
            submitted: 0,
        }
    }

    pub fn phase(&self) -> CollectorPhase {
        match self.phase {
            Phase::Idle => CollectorPhase::Idle,
            Phase::Collecting(_) => CollectorPhase::Collecting,
        }
    }

    pub fn is_collecting(&self) -> bool {
        self.phase() == CollectorPhase::Collecting
    }

    /// Samples gathered so far in the current gesture
    pub fn sample_count(&self) -> usize {
        match &self.phase {
            Phase::Idle => 0,
            Phase::Collecting(gesture) => gesture.buffer.lock().len(),
        }
    }

    /// Number of traces handed to the backend since creation
    pub fn submitted_count(&self) -> u64 {
        self.submitted
    }

    /// Feed the current drawing flag; only transitions have an effect
    ///
    /// Called once per UI frame with the flag from the shared UI state.
    pub fn observe(&mut self, drawing: bool) -> Transition {
        match (self.phase(), drawing) {
            (CollectorPhase::Idle, true) => {
                self.begin();
                Transition::Started
            }
            (CollectorPhase::Collecting, false) => match self.finish() {
                Some(trace) => Transition::Submitted(trace),
                None => Transition::Unchanged,
            },
            _ => Transition::Unchanged,
        }
    }

    /// Cancel an in-progress gesture without submitting it
    pub fn shutdown(&mut self) {
        if let Phase::Collecting(mut gesture) = std::mem::replace(&mut self.phase, Phase::Idle) {
            if let Some(mut sampler) = gesture.sampler.take() {
                sampler.cancel();
            }
            warn!(
                "Discarding unfinished trace {} with {} samples",
                gesture.id,
                gesture.buffer.lock().len()
            );
        }
    }

    fn begin(&mut self) {
        let id = Uuid::new_v4();
        let started_at = Utc::now();
        let buffer = Arc::new(Mutex::new(Vec::<PointerSample>::new()));

        // trace_start is fixed before the sampler exists, so it precedes
        // every tick even when drawing was already on at the first frame.
        let sampler = {
            let ui = self.ui.clone();
            let range = self.range.clone();
            let buffer = Arc::clone(&buffer);
            PeriodicTask::spawn("trace-sampler", self.period, move || {
                let position = ui.position();
                let pitch = range.pitch(position.y);
                let mut samples = buffer.lock();
                let floor = samples.last().map(|s| s.timestamp).unwrap_or(started_at);
                samples.push(PointerSample {
                    x: position.x,
                    y: position.y,
                    pitch,
                    timestamp: Utc::now().max(floor),
                });
            })
        };

        let sampler = match sampler {
            Ok(task) => Some(task),
            Err(e) => {
                error!("Trace sampler unavailable, gesture {} will be empty: {}", id, e);
                None
            }
        };

        self.ui.set_app_status(AppStatus::Tracing);
        debug!("Trace {} started at {}", id, started_at);

        self.phase = Phase::Collecting(ActiveGesture {
            id,
            started_at,
            buffer,
            sampler,
        });
    }

    fn finish(&mut self) -> Option<Trace> {
        let Phase::Collecting(mut gesture) = std::mem::replace(&mut self.phase, Phase::Idle) else {
            return None;
        };

        // Join the sampler first so no tick can land after trace_end
        if let Some(mut sampler) = gesture.sampler.take() {
            sampler.cancel();
        }

        let trace_body = std::mem::take(&mut *gesture.buffer.lock());
        let floor = trace_body
            .last()
            .map(|s| s.timestamp)
            .unwrap_or(gesture.started_at);

        let trace = Trace {
            trace_start: gesture.started_at,
            trace_body,
            trace_end: Utc::now().max(floor),
        };

        self.ui.replace_status(AppStatus::Tracing, AppStatus::Idle);
        self.submitted += 1;
        info!("Trace {} finished with {} samples", gesture.id, trace.len());

        self.dispatch(gesture.id, trace.clone());
        Some(trace)
    }

    /// Fire-and-forget submission on a detached thread
    fn dispatch(&self, id: Uuid, trace: Trace) {
        let backend = Arc::clone(&self.backend);
        let spawned = std::thread::Builder::new()
            .name("trace-submit".into())
            .spawn(move || match backend.send_trace(&trace) {
                Ok(()) => info!("Trace {} sent to backend", id),
                Err(e) => error!("Error sending trace {} to backend: {}", id, e),
            });

        if let Err(e) = spawned {
            error!("Failed to spawn trace submission for {}: {}", id, e);
        }
    }
}

impl Drop for TraceCollector {
    fn drop(&mut self) {
        self.shutdown();
    }
}
