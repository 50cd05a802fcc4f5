//! Play/Stop button for the corpus clip

use crate::controls::{ConnectionStatus, PlaybackControl};
use crate::ui::theme::Theme;
use egui::RichText;

pub struct PlayButton<'a> {
    control: &'a mut PlaybackControl,
    theme: &'a Theme,
}

impl<'a> PlayButton<'a> {
    pub fn new(control: &'a mut PlaybackControl, theme: &'a Theme) -> Self {
        Self { control, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        ui.horizontal(|ui| {
            let enabled = !self.control.is_loading();
            let button = egui::Button::new(self.control.label())
                .rounding(self.theme.button_rounding);
            let response = ui.add_enabled(enabled, button);
            if response.clicked() {
                self.control.press();
            }

            if self.control.status() == ConnectionStatus::Failed {
                let message = self.control.last_error().unwrap_or("Failed");
                ui.label(RichText::new("Failed").color(self.theme.error))
                    .on_hover_text(message);
            }
            response
        })
        .inner
    }
}
