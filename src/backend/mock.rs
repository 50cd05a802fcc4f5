//! In-memory backend
//!
//! Behaves like a small corpus server: `switch_wav` advances the index,
//! uploads and traces are kept for inspection, and any endpoint can be made
//! to fail with a 500.

use super::{Backend, Endpoint, ProgressResponse};
use crate::trace::Trace;
use crate::{Result, ToneCanvasError};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;

#[derive(Default)]
struct MockState {
    wav: Vec<u8>,
    files: Vec<String>,
    current_index: u32,
    failing: HashSet<Endpoint>,
    calls: Vec<Endpoint>,
    button_logs: Vec<String>,
    uploads: Vec<Vec<u8>>,
    traces: Vec<Trace>,
}

pub struct MockBackend {
    state: Mutex<MockState>,
    trace_tx: Sender<Trace>,
    trace_rx: Receiver<Trace>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// A backend serving three files and an empty WAV body
    pub fn new() -> Self {
        let (trace_tx, trace_rx) = unbounded();
        Self {
            state: Mutex::new(MockState {
                files: vec!["item_0.wav".into(), "item_1.wav".into(), "item_2.wav".into()],
                ..Default::default()
            }),
            trace_tx,
            trace_rx,
        }
    }

    /// Bytes returned by `fetch_wav`
    pub fn with_wav(self, wav: Vec<u8>) -> Self {
        self.state.lock().wav = wav;
        self
    }

    pub fn with_files(self, files: &[&str]) -> Self {
        {
            let mut state = self.state.lock();
            state.files = files.iter().map(|f| f.to_string()).collect();
            state.current_index = 0;
        }
        self
    }

    /// Make `endpoint` answer with HTTP 500 until [`MockBackend::recover`]
    pub fn fail(&self, endpoint: Endpoint) {
        self.state.lock().failing.insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.state.lock().failing.remove(&endpoint);
    }

    pub fn calls(&self) -> Vec<Endpoint> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == endpoint).count()
    }

    pub fn button_logs(&self) -> Vec<String> {
        self.state.lock().button_logs.clone()
    }

    pub fn uploads(&self) -> Vec<Vec<u8>> {
        self.state.lock().uploads.clone()
    }

    pub fn traces(&self) -> Vec<Trace> {
        self.state.lock().traces.clone()
    }

    /// Wait for the next trace submission
    pub fn recv_trace(&self, timeout: Duration) -> Option<Trace> {
        self.trace_rx.recv_timeout(timeout).ok()
    }

    /// Record the call and fail it if requested
    fn enter(&self, endpoint: Endpoint) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(endpoint);
        if state.failing.contains(&endpoint) {
            return Err(ToneCanvasError::HttpStatus {
                endpoint: endpoint.path().to_string(),
                status: 500,
            });
        }
        Ok(())
    }
}

impl Backend for MockBackend {
    fn fetch_wav(&self) -> Result<Vec<u8>> {
        self.enter(Endpoint::GetWavFile)?;
        Ok(self.state.lock().wav.clone())
    }

    fn file_name(&self) -> Result<String> {
        self.enter(Endpoint::GetFileName)?;
        let state = self.state.lock();
        Ok(state
            .files
            .get(state.current_index as usize)
            .cloned()
            .unwrap_or_default())
    }

    fn progress(&self) -> Result<ProgressResponse> {
        self.enter(Endpoint::GetProgress)?;
        let state = self.state.lock();
        Ok(ProgressResponse {
            current_index: state.current_index,
            total_files: state.files.len() as u32,
        })
    }

    fn log_button(&self, button_name: &str) -> Result<String> {
        self.enter(Endpoint::SendButtonLog)?;
        self.state.lock().button_logs.push(button_name.to_string());
        Ok(format!("Logged {}", button_name))
    }

    fn switch_wav(&self) -> Result<u32> {
        self.enter(Endpoint::SwitchWavFile)?;
        let mut state = self.state.lock();
        let total = state.files.len().max(1) as u32;
        state.current_index = (state.current_index + 1) % total;
        Ok(state.current_index)
    }

    fn upload_audio(&self, wav: Vec<u8>) -> Result<serde_json::Value> {
        self.enter(Endpoint::UploadAudio)?;
        let mut state = self.state.lock();
        let size = wav.len();
        state.uploads.push(wav);
        Ok(serde_json::json!({ "message": "stored", "bytes": size }))
    }

    fn send_trace(&self, trace: &Trace) -> Result<()> {
        self.enter(Endpoint::SendTrace)?;
        self.state.lock().traces.push(trace.clone());
        let _ = self.trace_tx.send(trace.clone());
        Ok(())
    }
}
