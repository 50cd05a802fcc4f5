//! Corpus status store
//!
//! Mirrors the backend's view of the active corpus item. Only backend
//! responses write here.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusStatus {
    pub file_name: String,
    pub current_index: u32,
    pub total_files: u32,
}

impl CorpusStatus {
    /// Whether the backend has reported anything yet
    pub fn is_known(&self) -> bool {
        !self.file_name.is_empty() || self.total_files > 0
    }

    /// Short label for the status bar
    pub fn label(&self) -> String {
        if !self.is_known() {
            return "No corpus item".to_string();
        }
        format!(
            "{} · {}/{}",
            self.file_name, self.current_index, self.total_files
        )
    }
}

#[derive(Clone, Default)]
pub struct CorpusStatusStore {
    inner: Arc<RwLock<CorpusStatus>>,
}

impl CorpusStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> CorpusStatus {
        self.inner.read().clone()
    }

    /// Replace the stored status, returning whether anything changed
    pub fn update(&self, status: CorpusStatus) -> bool {
        let mut current = self.inner.write();
        if *current == status {
            return false;
        }
        *current = status;
        true
    }
}
