//! UI components

pub mod canvas;
pub mod play_button;
pub mod record_panel;
pub mod status_bar;
pub mod switch_button;

pub use canvas::{canvas_coords, CanvasStroke, DrawingCanvas};
pub use play_button::PlayButton;
pub use record_panel::RecordPanel;
pub use status_bar::StatusBar;
pub use switch_button::SwitchButton;
