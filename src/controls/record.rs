//! Microphone recording with local preview and one-shot upload
//!
//! Each finished recording gets a new generation number. Upload results
//! carry the generation they were started for, so a slow upload of an older
//! clip cannot mark a newer one as uploaded.

use super::{spawn_worker, ConnectionStatus};
use crate::audio::{encode_wav, AudioClip, CaptureDevice, SharedSink};
use crate::backend::Backend;
use crate::state::{AppStatus, SharedUiState};
use crate::{Result, ToneCanvasError};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Button name sent to the press log
pub const UPLOAD_BUTTON: &str = "Upload";

/// Chunks buffered between frames before the device starts dropping them
const CHUNK_QUEUE: usize = 1024;

/// Upload progress for the current clip
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UploadState {
    #[default]
    NotUploaded,
    Uploading,
    Uploaded,
    Failed,
}

/// A finished recording and its WAV encoding
#[derive(Clone, Debug)]
pub struct RecordedClip {
    pub clip: AudioClip,
    pub wav: Vec<u8>,
}

struct UploadResult {
    generation: u64,
    result: Result<serde_json::Value>,
}

pub struct RecordControl {
    backend: Arc<dyn Backend>,
    ui: SharedUiState,
    capture: Box<dyn CaptureDevice>,
    sink: SharedSink,
    recording: bool,
    chunk_tx: Sender<Vec<f32>>,
    chunk_rx: Receiver<Vec<f32>>,
    pending: Vec<f32>,
    clip: Option<RecordedClip>,
    generation: u64,
    upload: UploadState,
    status: ConnectionStatus,
    last_response: Option<serde_json::Value>,
    last_error: Option<String>,
    result_tx: Sender<UploadResult>,
    result_rx: Receiver<UploadResult>,
}

impl RecordControl {
    pub fn new(
        backend: Arc<dyn Backend>,
        ui: SharedUiState,
        capture: Box<dyn CaptureDevice>,
        sink: SharedSink,
    ) -> Self {
        let (chunk_tx, chunk_rx) = bounded(CHUNK_QUEUE);
        let (result_tx, result_rx) = unbounded();
        Self {
            backend,
            ui,
            capture,
            sink,
            recording: false,
            chunk_tx,
            chunk_rx,
            pending: Vec::new(),
            clip: None,
            generation: 0,
            upload: UploadState::NotUploaded,
            status: ConnectionStatus::Unknown,
            last_response: None,
            last_error: None,
            result_tx,
            result_rx,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn clip(&self) -> Option<&RecordedClip> {
        self.clip.as_ref()
    }

    /// Generation of the current clip; 0 before the first recording
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn upload_state(&self) -> UploadState {
        self.upload
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Payload returned by the last successful upload
    pub fn last_response(&self) -> Option<&serde_json::Value> {
        self.last_response.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn record_label(&self) -> &'static str {
        if self.recording {
            "Stop Recording"
        } else {
            "Start Recording"
        }
    }

    pub fn can_preview(&self) -> bool {
        self.clip.is_some() && !self.recording
    }

    /// Upload is available once per clip; a failed upload may be retried
    pub fn can_upload(&self) -> bool {
        self.clip.is_some()
            && !self.recording
            && matches!(self.upload, UploadState::NotUploaded | UploadState::Failed)
    }

    /// Start or stop recording
    pub fn toggle(&mut self) {
        let result = if self.recording {
            self.stop()
        } else {
            self.start()
        };
        if let Err(e) = result {
            self.fail(e);
        }
    }

    pub fn start(&mut self) -> Result<()> {
        if self.recording {
            return Ok(());
        }

        // Drop anything left over from a previous session
        while self.chunk_rx.try_recv().is_ok() {}
        self.pending.clear();

        self.capture.start(self.chunk_tx.clone())?;
        self.recording = true;
        self.ui.set_app_status(AppStatus::Recording);
        info!("Recording started");
        Ok(())
    }

    /// Stop capture and turn the collected chunks into a clip
    pub fn stop(&mut self) -> Result<()> {
        if !self.recording {
            return Ok(());
        }

        self.capture.stop()?;
        self.recording = false;
        self.drain_chunks();
        self.ui.replace_status(AppStatus::Recording, AppStatus::Idle);

        let clip = AudioClip::mono(std::mem::take(&mut self.pending), self.capture.sample_rate());
        let wav = encode_wav(&clip)?;
        info!(
            "Recording stopped: {:.1}s, {} bytes WAV",
            clip.duration_seconds(),
            wav.len()
        );

        self.clip = Some(RecordedClip { clip, wav });
        self.generation += 1;
        self.upload = UploadState::NotUploaded;
        self.last_response = None;
        Ok(())
    }

    /// Play the recorded clip through the output sink
    pub fn preview(&mut self) {
        let Some(recorded) = &self.clip else {
            warn!("Nothing recorded to preview");
            return;
        };
        let clip = recorded.clip.clone();
        if let Err(e) = self.sink.play(clip) {
            self.fail(e);
        }
    }

    /// Upload the current clip as multipart field `audio`
    pub fn upload(&mut self) {
        let Some(recorded) = &self.clip else {
            error!("No audio to upload");
            return;
        };
        if !self.can_upload() {
            debug!("Upload not available in state {:?}", self.upload);
            return;
        }

        let backend = Arc::clone(&self.backend);
        let wav = recorded.wav.clone();
        let generation = self.generation;
        let tx = self.result_tx.clone();

        let spawned = spawn_worker("audio-upload", move || {
            if let Err(e) = backend.log_button(UPLOAD_BUTTON) {
                warn!("Failed to log Upload press: {}", e);
            }
            let result = backend.upload_audio(wav);
            let _ = tx.send(UploadResult { generation, result });
        });

        match spawned {
            Ok(()) => self.upload = UploadState::Uploading,
            Err(e) => self.fail(e),
        }
    }

    /// Collect captured chunks and apply upload results
    pub fn poll(&mut self) -> bool {
        let mut changed = false;

        if self.recording {
            changed |= self.drain_chunks();
        }

        while let Ok(UploadResult { generation, result }) = self.result_rx.try_recv() {
            changed = true;
            if generation != self.generation {
                debug!("Ignoring upload result for replaced clip {}", generation);
                continue;
            }
            match result {
                Ok(response) => {
                    info!("Audio uploaded successfully: {}", response);
                    self.upload = UploadState::Uploaded;
                    self.status = ConnectionStatus::Connected;
                    self.last_error = None;
                    self.last_response = Some(response);
                }
                Err(e) => {
                    self.upload = UploadState::Failed;
                    self.fail(e);
                }
            }
        }

        changed
    }

    fn drain_chunks(&mut self) -> bool {
        let mut got = false;
        while let Ok(chunk) = self.chunk_rx.try_recv() {
            self.pending.extend_from_slice(&chunk);
            got = true;
        }
        got
    }

    fn fail(&mut self, e: ToneCanvasError) {
        error!("Recording error: {}", e);
        self.status = ConnectionStatus::Failed;
        self.last_error = Some(e.user_message());
    }
}

impl Drop for RecordControl {
    fn drop(&mut self) {
        if self.recording {
            let _ = self.capture.stop();
        }
    }
}
