//! Drawing canvas
//!
//! Writes pointer position and the drawing flag into the shared UI state.
//! Canvas units run 0-100 on both axes with y measured from the bottom
//! edge, so higher strokes map to higher pitch.

use crate::state::{AudioRangeStore, PointerPosition, SharedUiState};
use crate::ui::theme::Theme;
use egui::{Align2, FontId, Pos2, Rect, Sense, Shape, Stroke, Vec2};

/// Points of the current or most recent gesture, in canvas units
#[derive(Clone, Debug, Default)]
pub struct CanvasStroke {
    points: Vec<PointerPosition>,
    active: bool,
}

impl CanvasStroke {
    pub fn points(&self) -> &[PointerPosition] {
        &self.points
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn update(&mut self, drawing: bool, position: PointerPosition) {
        if drawing && !self.active {
            self.points.clear();
        }
        self.active = drawing;
        if drawing && self.points.last() != Some(&position) {
            self.points.push(position);
        }
    }
}

/// Map a screen position inside `rect` to canvas units
pub fn canvas_coords(rect: Rect, pos: Pos2) -> (f32, f32) {
    let width = rect.width().max(f32::EPSILON);
    let height = rect.height().max(f32::EPSILON);
    let x = (pos.x - rect.left()) / width * 100.0;
    let y = (rect.bottom() - pos.y) / height * 100.0;
    (x, y)
}

/// Inverse of [`canvas_coords`]
pub fn screen_pos(rect: Rect, position: PointerPosition) -> Pos2 {
    Pos2::new(
        rect.left() + position.x / 100.0 * rect.width(),
        rect.bottom() - position.y / 100.0 * rect.height(),
    )
}

pub struct DrawingCanvas<'a> {
    ui_state: &'a SharedUiState,
    range: &'a AudioRangeStore,
    stroke: &'a mut CanvasStroke,
    theme: &'a Theme,
}

impl<'a> DrawingCanvas<'a> {
    pub fn new(
        ui_state: &'a SharedUiState,
        range: &'a AudioRangeStore,
        stroke: &'a mut CanvasStroke,
        theme: &'a Theme,
    ) -> Self {
        Self {
            ui_state,
            range,
            stroke,
            theme,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let size = Vec2::new(ui.available_width(), ui.available_height().max(120.0));
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Other, true, "Drawing canvas")
        });

        let drawing = response.is_pointer_button_down_on();
        if let Some(pos) = response.interact_pointer_pos().or(response.hover_pos()) {
            let (x, y) = canvas_coords(rect, pos);
            self.ui_state.set_position(x, y);
        }
        if self.ui_state.is_drawing() != drawing {
            self.ui_state.set_drawing(drawing);
        }
        self.stroke.update(drawing, self.ui_state.position());

        if ui.is_rect_visible(rect) {
            self.paint(ui, rect);
        }

        response
    }

    fn paint(&self, ui: &egui::Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, self.theme.card_rounding, self.theme.canvas_bg);

        // Horizontal grid lines labelled with their pitch
        let grid = Stroke::new(1.0, self.theme.canvas_grid);
        for step in 0..=4 {
            let y = step as f32 * 25.0;
            let left = screen_pos(rect, PointerPosition { x: 0.0, y });
            let right = screen_pos(rect, PointerPosition { x: 100.0, y });
            painter.line_segment([left, right], grid);
            painter.text(
                left + Vec2::new(6.0, -4.0),
                Align2::LEFT_BOTTOM,
                format!("{:.0} Hz", self.range.pitch(y)),
                FontId::proportional(11.0),
                self.theme.text_muted,
            );
        }

        let color = if self.stroke.is_active() {
            self.theme.stroke_active
        } else {
            self.theme.stroke_inactive
        };
        let points: Vec<Pos2> = self
            .stroke
            .points()
            .iter()
            .map(|p| screen_pos(rect, *p))
            .collect();
        if points.len() > 1 {
            painter.add(Shape::line(points, Stroke::new(3.0, color)));
        } else if let Some(point) = points.first() {
            painter.circle_filled(*point, 2.0, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_coords_origin_is_bottom_left() {
        let rect = Rect::from_min_size(Pos2::new(10.0, 20.0), Vec2::new(200.0, 100.0));
        assert_eq!(canvas_coords(rect, Pos2::new(10.0, 120.0)), (0.0, 0.0));
        assert_eq!(canvas_coords(rect, Pos2::new(210.0, 20.0)), (100.0, 100.0));
        assert_eq!(canvas_coords(rect, Pos2::new(110.0, 70.0)), (50.0, 50.0));
    }

    #[test]
    fn test_screen_pos_inverts_canvas_coords() {
        let rect = Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(400.0, 200.0));
        let pos = screen_pos(rect, PointerPosition { x: 25.0, y: 75.0 });
        assert_eq!(pos, Pos2::new(100.0, 50.0));
        assert_eq!(canvas_coords(rect, pos), (25.0, 75.0));
    }

    #[test]
    fn test_new_gesture_clears_stroke() {
        let mut stroke = CanvasStroke::default();
        stroke.update(true, PointerPosition { x: 1.0, y: 1.0 });
        stroke.update(true, PointerPosition { x: 2.0, y: 2.0 });
        stroke.update(false, PointerPosition { x: 2.0, y: 2.0 });
        assert_eq!(stroke.points().len(), 2);

        stroke.update(true, PointerPosition { x: 9.0, y: 9.0 });
        assert_eq!(stroke.points(), &[PointerPosition { x: 9.0, y: 9.0 }]);
    }
}
