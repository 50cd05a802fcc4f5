//! Switch button with the ready-to-play indicator

use crate::controls::{ConnectionStatus, SwitchControl};
use crate::state::{AppStatus, SharedUiState};
use crate::ui::theme::Theme;
use egui::{RichText, Sense, Vec2};

pub struct SwitchButton<'a> {
    control: &'a mut SwitchControl,
    ui_state: &'a SharedUiState,
    theme: &'a Theme,
}

impl<'a> SwitchButton<'a> {
    pub fn new(control: &'a mut SwitchControl, ui_state: &'a SharedUiState, theme: &'a Theme) -> Self {
        Self {
            control,
            ui_state,
            theme,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        ui.horizontal(|ui| {
            let fill = if self.control.is_switching() {
                self.theme.bg_tertiary
            } else {
                self.theme.primary
            };
            let button = egui::Button::new(self.control.label())
                .fill(fill)
                .rounding(self.theme.button_rounding);
            let response = ui.add_enabled(!self.control.is_switching(), button);
            if response.clicked() {
                self.control.press();
            }

            if self.ui_state.app_status() == AppStatus::Play {
                let (rect, dot) = ui.allocate_exact_size(Vec2::splat(20.0), Sense::hover());
                ui.painter()
                    .circle_filled(rect.center(), 10.0, self.theme.success);
                dot.widget_info(|| {
                    egui::WidgetInfo::labeled(egui::WidgetType::Label, true, "Ready to play")
                });
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
