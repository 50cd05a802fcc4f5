//! Tone Canvas backend API
//!
//! [`Backend`] is the seam between the controls and the network. The
//! production implementation is [`HttpBackend`]; [`MockBackend`] is an
//! in-memory stand-in for tests and offline runs.

mod http;
pub mod mock;
mod types;

pub use http::{merge_headers, HttpBackend};
pub use mock::MockBackend;
pub use types::{
    ButtonLogRequest, ButtonLogResponse, FileNameResponse, ProgressResponse, SwitchResponse,
    TraceEnvelope,
};

use crate::state::CorpusStatus;
use crate::trace::Trace;
use crate::Result;

/// Backend endpoints consumed by the client
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    GetWavFile,
    GetFileName,
    GetProgress,
    SendButtonLog,
    SwitchWavFile,
    UploadAudio,
    SendTrace,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::GetWavFile => "/api/get-wav-file",
            Endpoint::GetFileName => "/api/get-file-name",
            Endpoint::GetProgress => "/api/get-progress",
            Endpoint::SendButtonLog => "/api/send-button-log",
            Endpoint::SwitchWavFile => "/api/switch-wav-file",
            Endpoint::UploadAudio => "/api/upload-audio",
            Endpoint::SendTrace => "/api/send-trace",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Blocking access to the backend
///
/// Calls are made from worker threads, never from the UI thread.
pub trait Backend: Send + Sync {
    /// Audio bytes of the active corpus item
    fn fetch_wav(&self) -> Result<Vec<u8>>;

    fn file_name(&self) -> Result<String>;

    fn progress(&self) -> Result<ProgressResponse>;

    /// Record a button press; returns the backend's message
    fn log_button(&self, button_name: &str) -> Result<String>;

    /// Advance to the next corpus item; returns the new index
    fn switch_wav(&self) -> Result<u32>;

    /// Upload a recorded WAV clip; returns whatever JSON the backend sent
    fn upload_audio(&self, wav: Vec<u8>) -> Result<serde_json::Value>;

    fn send_trace(&self, trace: &Trace) -> Result<()>;

    /// File name and progress combined
    ///
    /// Both requests must succeed; a partial answer is an error.
    fn corpus_status(&self) -> Result<CorpusStatus> {
        let file_name = self.file_name()?;
        let progress = self.progress()?;
        Ok(CorpusStatus {
            file_name,
            current_index: progress.current_index,
            total_files: progress.total_files,
        })
    }
}
