//! Status line: app status tag, corpus item and pointer readout

use crate::state::{AppStatus, AudioRangeStore, CorpusStatusStore, SharedUiState};
use crate::ui::theme::Theme;
use egui::{RichText, Vec2};

pub struct StatusBar<'a> {
    ui_state: &'a SharedUiState,
    corpus: &'a CorpusStatusStore,
    range: &'a AudioRangeStore,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(
        ui_state: &'a SharedUiState,
        corpus: &'a CorpusStatusStore,
        range: &'a AudioRangeStore,
        theme: &'a Theme,
    ) -> Self {
        Self {
            ui_state,
            corpus,
            range,
            theme,
        }
    }

    fn status_color(&self, status: AppStatus) -> egui::Color32 {
        match status {
            AppStatus::Idle => self.theme.text_muted,
            AppStatus::Play => self.theme.success,
            AppStatus::Playing | AppStatus::Tracing => self.theme.primary,
            AppStatus::Switching => self.theme.warning,
            AppStatus::Recording => self.theme.recording,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let state = self.ui_state.snapshot();
        let corpus = self.corpus.get();

        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(Vec2::splat(10.0), egui::Sense::hover());
            ui.painter()
                .circle_filled(rect.center(), 5.0, self.status_color(state.app_status));

            let status = ui.label(
                RichText::new(state.app_status.to_string())
                    .size(12.0)
                    .color(self.theme.text_secondary),
            );
            status.widget_info(|| {
                egui::WidgetInfo::labeled(
                    egui::WidgetType::Label,
                    true,
                    format!("Status: {}", state.app_status),
                )
            });

            ui.separator();
            ui.label(
                RichText::new(corpus.label())
                    .size(12.0)
                    .color(self.theme.text_secondary),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    RichText::new(format!(
                        "x {:.0}  y {:.0}  {:.0} Hz",
                        state.position.x,
                        state.position.y,
                        self.range.pitch(state.position.y)
                    ))
                    .size(12.0)
                    .family(egui::FontFamily::Monospace)
                    .color(self.theme.text_muted),
                );
            });
        })
        .response
    }
}
