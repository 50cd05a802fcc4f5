//! Record, preview and upload buttons

use crate::controls::{RecordControl, UploadState};
use crate::ui::theme::Theme;
use egui::RichText;

pub struct RecordPanel<'a> {
    control: &'a mut RecordControl,
    theme: &'a Theme,
}

impl<'a> RecordPanel<'a> {
    pub fn new(control: &'a mut RecordControl, theme: &'a Theme) -> Self {
        Self { control, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let fill = if self.control.is_recording() {
                self.theme.recording
            } else {
                self.theme.primary
            };
            let record = egui::Button::new(self.control.record_label())
                .fill(fill)
                .rounding(self.theme.button_rounding);
            if ui.add(record).clicked() {
                self.control.toggle();
            }

            let preview = egui::Button::new("Preview").rounding(self.theme.button_rounding);
            if ui.add_enabled(self.control.can_preview(), preview).clicked() {
                self.control.preview();
            }

            let upload = egui::Button::new("Upload").rounding(self.theme.button_rounding);
            if ui.add_enabled(self.control.can_upload(), upload).clicked() {
                self.control.upload();
            }

            let (text, color) = match self.control.upload_state() {
                UploadState::NotUploaded => ("", self.theme.text_muted),
                UploadState::Uploading => ("Uploading...", self.theme.warning),
                UploadState::Uploaded => ("Uploaded", self.theme.success),
                UploadState::Failed => ("Upload failed", self.theme.error),
            };
            if !text.is_empty() {
                ui.label(RichText::new(text).color(color));
            }
        });

        if let Some(recorded) = self.control.clip() {
            ui.label(
                RichText::new(format!(
                    "Recording {}: {:.1}s",
                    self.control.generation(),
                    recorded.clip.duration_seconds()
                ))
                .size(12.0)
                .color(self.theme.text_muted),
            );
        }
    }
}
