//! Shared UI state: pointer position, drawing flag, audio gate and the
//! coarse application status tag

use parking_lot::RwLock;
use std::sync::Arc;

/// Pointer position in canvas units (0-100 on both axes)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

impl PointerPosition {
    /// Create a position, clamping both axes into 0-100
    pub fn clamped(x: f32, y: f32) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 100.0)
    }
}

/// Most recent user action, shown by the status indicators
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AppStatus {
    #[default]
    Idle,
    /// Corpus clip is playing
    Playing,
    /// Switch request in flight
    Switching,
    /// A new corpus item is ready to be played
    Play,
    /// Drawing gesture in progress
    Tracing,
    /// Microphone capture in progress
    Recording,
}

impl std::fmt::Display for AppStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppStatus::Idle => write!(f, "Idle"),
            AppStatus::Playing => write!(f, "Playing"),
            AppStatus::Switching => write!(f, "Switching"),
            AppStatus::Play => write!(f, "Play"),
            AppStatus::Tracing => write!(f, "Tracing"),
            AppStatus::Recording => write!(f, "Recording"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub position: PointerPosition,
    pub is_drawing: bool,
    pub audio_initialized: bool,
    pub app_status: AppStatus,
}

/// Thread-safe handle to the UI state
///
/// The canvas is the only writer of position and drawing flag; the trace
/// sampler reads them from its own thread.
#[derive(Clone, Default)]
pub struct SharedUiState {
    inner: Arc<RwLock<UiState>>,
}

impl SharedUiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> UiState {
        self.inner.read().clone()
    }

    pub fn position(&self) -> PointerPosition {
        self.inner.read().position
    }

    pub fn set_position(&self, x: f32, y: f32) {
        self.inner.write().position = PointerPosition::clamped(x, y);
    }

    pub fn is_drawing(&self) -> bool {
        self.inner.read().is_drawing
    }

    pub fn set_drawing(&self, drawing: bool) {
        self.inner.write().is_drawing = drawing;
    }

    pub fn audio_initialized(&self) -> bool {
        self.inner.read().audio_initialized
    }

    pub fn set_audio_initialized(&self, initialized: bool) {
        self.inner.write().audio_initialized = initialized;
    }

    pub fn app_status(&self) -> AppStatus {
        self.inner.read().app_status
    }

    pub fn set_app_status(&self, status: AppStatus) {
        self.inner.write().app_status = status;
    }

    /// Set `next` only if the current status is still `expected`
    ///
    /// Returns whether the status changed. Used when an action finishes so it
    /// does not clobber a status set by a newer action.
    pub fn replace_status(&self, expected: AppStatus, next: AppStatus) -> bool {
        let mut state = self.inner.write();
        if state.app_status == expected {
            state.app_status = next;
            true
        } else {
            false
        }
    }
}
