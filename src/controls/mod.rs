//! Button controls
//!
//! Each control lives on the UI thread. Backend calls run on short-lived
//! worker threads whose results come back over a crossbeam channel drained
//! by the control's `poll()` once per frame.

pub mod playback;
pub mod record;
pub mod switch;

pub use playback::PlaybackControl;
pub use record::{RecordControl, UploadState};
pub use switch::SwitchControl;

use crate::backend::Backend;
use crate::state::{CorpusStatus, CorpusStatusStore};
use crate::{Result, ToneCanvasError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of the last backend exchange made by a control
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Connected,
    Failed,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Unknown => write!(f, "Unknown"),
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Run `f` on a named background thread
pub fn spawn_worker<F>(name: &str, f: F) -> Result<()>
where
    F: FnOnce() + Send + 'static,
{
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(f)
        .map(|_| ())
        .map_err(|e| ToneCanvasError::ChannelError(format!("Failed to spawn {}: {}", name, e)))
}

/// Fetch file name and progress and store them
///
/// The store is only written when both requests succeed.
pub fn refresh_corpus(backend: &dyn Backend, store: &CorpusStatusStore) -> Result<CorpusStatus> {
    let status = backend.corpus_status()?;
    if store.update(status.clone()) {
        debug!("Corpus status now {}", status.label());
    }
    Ok(status)
}

/// Refresh the corpus status in the background, logging failures
///
/// `on_done` runs on the worker thread after the attempt.
pub fn refresh_corpus_async<F>(backend: Arc<dyn Backend>, store: CorpusStatusStore, on_done: F)
where
    F: FnOnce() + Send + 'static,
{
    let spawned = spawn_worker("corpus-refresh", move || {
        if let Err(e) = refresh_corpus(backend.as_ref(), &store) {
            warn!("Failed to refresh corpus status: {}", e);
        }
        on_done();
    });
    if let Err(e) = spawned {
        warn!("{}", e);
    }
}
