//! Play/Stop control for the active corpus item

use super::{refresh_corpus, spawn_worker, ConnectionStatus};
use crate::audio::{decode_wav, AudioClip, SharedSink};
use crate::backend::Backend;
use crate::state::{AppStatus, CorpusStatusStore, SharedUiState};
use crate::{Result, ToneCanvasError};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Button name sent to the press log
pub const PLAY_BUTTON: &str = "Play";

enum PlaybackEvent {
    Loaded(AudioClip),
    Failed(ToneCanvasError),
}

pub struct PlaybackControl {
    backend: Arc<dyn Backend>,
    ui: SharedUiState,
    corpus: CorpusStatusStore,
    sink: SharedSink,
    /// Ticket of the clip this control started, while it plays
    playing: Option<u64>,
    loading: bool,
    status: ConnectionStatus,
    last_error: Option<String>,
    event_tx: Sender<PlaybackEvent>,
    event_rx: Receiver<PlaybackEvent>,
}

impl PlaybackControl {
    pub fn new(
        backend: Arc<dyn Backend>,
        ui: SharedUiState,
        corpus: CorpusStatusStore,
        sink: SharedSink,
    ) -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            backend,
            ui,
            corpus,
            sink,
            playing: None,
            loading: false,
            status: ConnectionStatus::Unknown,
            last_error: None,
            event_tx,
            event_rx,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    /// A fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn label(&self) -> &'static str {
        if self.loading {
            "Loading..."
        } else if self.is_playing() {
            "Stop"
        } else {
            "Play"
        }
    }

    /// Handle a button press
    pub fn press(&mut self) {
        if self.loading {
            debug!("Play pressed while loading, ignoring");
            return;
        }
        if self.is_playing() {
            self.stop();
        } else if let Err(e) = self.start() {
            self.fail(e);
        }
    }

    /// Stop and rewind the current clip
    pub fn stop(&mut self) {
        if let Some(ticket) = self.playing.take() {
            self.sink.stop(ticket);
        }
        self.ui.replace_status(AppStatus::Playing, AppStatus::Idle);
        info!("Playback stopped");
    }

    fn start(&mut self) -> Result<()> {
        let (sample_rate, channels) = self.sink.format();

        let backend = Arc::clone(&self.backend);
        let corpus = self.corpus.clone();
        let tx = self.event_tx.clone();

        spawn_worker("playback-fetch", move || {
            if let Err(e) = backend.log_button(PLAY_BUTTON) {
                warn!("Failed to log Play press: {}", e);
            }
            if let Err(e) = refresh_corpus(backend.as_ref(), &corpus) {
                warn!("Failed to refresh corpus status: {}", e);
            }

            let event = backend
                .fetch_wav()
                .and_then(|bytes| decode_wav(&bytes))
                .and_then(|clip| clip.conform(sample_rate, channels))
                .map_or_else(PlaybackEvent::Failed, PlaybackEvent::Loaded);

            let _ = tx.send(event);
        })?;

        self.loading = true;
        Ok(())
    }

    /// Apply worker results and notice clips that ran out
    ///
    /// Returns true when anything changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;

        while let Ok(event) = self.event_rx.try_recv() {
            self.loading = false;
            changed = true;
            match event {
                PlaybackEvent::Loaded(clip) => {
                    let duration = clip.duration_seconds();
                    match self.sink.play(clip) {
                        Ok(ticket) => {
                            self.playing = Some(ticket);
                            self.status = ConnectionStatus::Connected;
                            self.last_error = None;
                            self.ui.set_app_status(AppStatus::Playing);
                            info!("Playing corpus clip ({:.1}s)", duration);
                        }
                        Err(e) => self.fail(e),
                    }
                }
                PlaybackEvent::Failed(e) => self.fail(e),
            }
        }

        // Finished, or replaced by another clip on the shared device
        if let Some(ticket) = self.playing {
            if !self.sink.is_playing(ticket) {
                self.playing = None;
                self.ui.replace_status(AppStatus::Playing, AppStatus::Idle);
                debug!("Corpus clip no longer playing");
                changed = true;
            }
        }

        changed
    }

    fn fail(&mut self, e: ToneCanvasError) {
        error!("Error fetching audio: {}", e);
        self.status = ConnectionStatus::Failed;
        self.last_error = Some(e.user_message());
    }
}
