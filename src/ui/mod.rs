//! egui/eframe user interface

mod app;
pub mod components;
mod theme;

pub use app::{open_default_devices, Controls, DeviceFactory, ToneCanvasApp};
pub use components::{CanvasStroke, DrawingCanvas, PlayButton, RecordPanel, StatusBar, SwitchButton};
pub use theme::Theme;
