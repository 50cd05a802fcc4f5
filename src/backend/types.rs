//! Request and response bodies

use crate::trace::Trace;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileNameResponse {
    #[serde(rename = "fileName")]
    pub file_name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub current_index: u32,
    pub total_files: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ButtonLogRequest {
    pub button_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ButtonLogResponse {
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchResponse {
    #[serde(rename = "currentIndex")]
    pub current_index: u32,
}

/// Body of `POST /api/send-trace`
#[derive(Clone, Debug, Serialize)]
pub struct TraceEnvelope<'a> {
    pub trace: &'a Trace,
}
