//! Switch control: advance the backend to the next corpus item

use super::{refresh_corpus, spawn_worker, ConnectionStatus};
use crate::backend::Backend;
use crate::state::{AppStatus, CorpusStatusStore, SharedUiState};
use crate::{Result, ToneCanvasError};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Button name sent to the press log
pub const SWITCH_BUTTON: &str = "Switch";

pub struct SwitchControl {
    backend: Arc<dyn Backend>,
    ui: SharedUiState,
    corpus: CorpusStatusStore,
    switching: bool,
    status: ConnectionStatus,
    last_error: Option<String>,
    result_tx: Sender<Result<u32>>,
    result_rx: Receiver<Result<u32>>,
}

impl SwitchControl {
    pub fn new(backend: Arc<dyn Backend>, ui: SharedUiState, corpus: CorpusStatusStore) -> Self {
        let (result_tx, result_rx) = unbounded();
        Self {
            backend,
            ui,
            corpus,
            switching: false,
            status: ConnectionStatus::Unknown,
            last_error: None,
            result_tx,
            result_rx,
        }
    }

    pub fn is_switching(&self) -> bool {
        self.switching
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn label(&self) -> &'static str {
        if self.switching {
            "Switching..."
        } else {
            "Switch"
        }
    }

    /// Handle a button press; ignored while a switch is in flight
    pub fn press(&mut self) {
        if self.switching {
            debug!("Switch already in flight");
            return;
        }

        let backend = Arc::clone(&self.backend);
        let corpus = self.corpus.clone();
        let tx = self.result_tx.clone();

        let spawned = spawn_worker("corpus-switch", move || {
            if let Err(e) = backend.log_button(SWITCH_BUTTON) {
                warn!("Failed to log Switch press: {}", e);
            }

            let result = backend.switch_wav().map(|index| {
                // The switch itself succeeded; a failed refresh only leaves
                // the store showing the previous item.
                if let Err(e) = refresh_corpus(backend.as_ref(), &corpus) {
                    warn!("Failed to refresh corpus status after switch: {}", e);
                }
                index
            });

            let _ = tx.send(result);
        });

        match spawned {
            Ok(()) => {
                self.switching = true;
                self.ui.set_app_status(AppStatus::Switching);
            }
            Err(e) => self.fail(e),
        }
    }

    /// Apply a finished switch; returns true when one arrived
    pub fn poll(&mut self) -> bool {
        let Ok(result) = self.result_rx.try_recv() else {
            return false;
        };

        self.switching = false;
        match result {
            Ok(index) => {
                info!("Switched to corpus item {}", index);
                self.status = ConnectionStatus::Connected;
                self.last_error = None;
                self.ui.replace_status(AppStatus::Switching, AppStatus::Play);
            }
            Err(e) => {
                // The tag held before the press may be stale by now
                self.ui.replace_status(AppStatus::Switching, AppStatus::Idle);
                self.fail(e);
            }
        }
        true
    }

    fn fail(&mut self, e: ToneCanvasError) {
        error!("Error switching file: {}", e);
        self.status = ConnectionStatus::Failed;
        self.last_error = Some(e.user_message());
    }
}
