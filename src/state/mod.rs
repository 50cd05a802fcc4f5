//! Shared stores injected into the UI components, the controls and the
//! trace collector
//!
//! Every store is a cheaply clonable handle around `Arc<RwLock<..>>`. They
//! are created once at application start and dropped when the app exits.

mod corpus;
mod pointer;
mod range;

pub use corpus::{CorpusStatus, CorpusStatusStore};
pub use pointer::{AppStatus, PointerPosition, SharedUiState, UiState};
pub use range::{AudioRangeStore, FrequencyRange};
