use eframe::egui::{self, Pos2, Rect, Ui, Vec2};
use geo::{Contains, Point};

use super::super::render_utils::fit_scale;
use super::super::{RenderCountry, ViewModel};

const MIN_ZOOM: f32 = 0.5;
const MAX_ZOOM: f32 = 12.0;

impl ViewModel {
    pub(in crate::app) fn handle_map_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let base_scale = fit_scale(rect, self.map.canvas);
        let offset_before = (pointer - rect.center() - self.pan) / (base_scale * self.zoom);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - rect.center() - (offset_before * base_scale * self.zoom);
    }

    pub(in crate::app) fn handle_map_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    pub(in crate::app) fn reset_view(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }
}

/// The visible marker under the pointer, nearest centre first.
pub(super) fn hovered_marker(
    pointer: Pos2,
    screen_positions: &[Pos2],
    visible: &[bool],
    radius: f32,
) -> Option<usize> {
    screen_positions
        .iter()
        .enumerate()
        .filter(|(index, _)| visible.get(*index).copied().unwrap_or(false))
        .filter_map(|(index, position)| {
            let distance = position.distance(pointer);
            (distance <= radius).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

/// The top-most country containing `point`, given in canvas units.
pub(super) fn hovered_country(point: Pos2, countries: &[RenderCountry]) -> Option<usize> {
    countries
        .iter()
        .enumerate()
        .rev()
        .find(|(_, country)| {
            country.bounds.contains(point)
                && country
                    .shape
                    .contains(&Point::new(f64::from(point.x), f64::from(point.y)))
        })
        .map(|(index, _)| index)
}
