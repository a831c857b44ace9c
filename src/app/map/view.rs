use eframe::egui::epaint::{Vertex, WHITE_UV};
use eframe::egui::{self, Color32, Mesh, Painter, Pos2, Sense, Shape, Stroke, Ui};

use super::super::hover::MarkerStyle;
use super::super::render_utils::{
    CanvasTransform, blend_color, circle_visible, draw_background,
};
use super::super::{RenderCountry, ViewModel};
use super::interaction::{hovered_country, hovered_marker};

/// Marker radius in canvas units.
const MARKER_RADIUS: f32 = 3.0;

const COUNTRY_FILL: Color32 = Color32::from_rgb(58, 66, 78);
const COUNTRY_HIGHLIGHT: Color32 = Color32::from_rgb(120, 150, 182);
const COUNTRY_STROKE: Color32 = Color32::from_rgb(22, 27, 34);
const MARKER_FILL: Color32 = Color32::from_rgb(230, 137, 24);
const MARKER_HIGHLIGHT: Color32 = Color32::from_rgb(255, 232, 150);

fn marker_radius(scale: f32) -> f32 {
    (MARKER_RADIUS * scale).clamp(1.5, 10.0)
}

fn draw_countries(
    painter: &Painter,
    transform: &CanvasTransform,
    countries: &[RenderCountry],
    highlighted: Option<usize>,
) {
    let highlight_fill = blend_color(COUNTRY_FILL, COUNTRY_HIGHLIGHT, 0.55);
    let mut mesh = Mesh::default();

    for (index, country) in countries.iter().enumerate() {
        let color = if highlighted == Some(index) {
            highlight_fill
        } else {
            COUNTRY_FILL
        };

        let base = mesh.vertices.len() as u32;
        mesh.vertices
            .extend(country.fill.vertices.iter().map(|vertex| Vertex {
                pos: transform.to_screen(vertex.pos),
                uv: WHITE_UV,
                color,
            }));
        mesh.indices
            .extend(country.fill.indices.iter().map(|index| base + index));
    }

    painter.add(Shape::mesh(mesh));

    let stroke_width = (0.6 * transform.scale().sqrt()).clamp(0.5, 1.6);
    for (index, country) in countries.iter().enumerate() {
        let stroke = if highlighted == Some(index) {
            Stroke::new(stroke_width + 0.6, COUNTRY_HIGHLIGHT)
        } else {
            Stroke::new(stroke_width, COUNTRY_STROKE)
        };

        for ring in &country.rings {
            let points = ring
                .iter()
                .map(|point| transform.to_screen(*point))
                .collect::<Vec<_>>();
            painter.add(Shape::closed_line(points, stroke));
        }
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_map(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.handle_map_zoom(ui, rect, &response);
        self.handle_map_pan(&response);
        if response.double_clicked() {
            self.reset_view();
        }

        let transform = CanvasTransform::fit(rect, self.map.canvas, self.pan, self.zoom);
        draw_background(&painter, rect, transform.canvas_rect(self.map.canvas));

        let radius = marker_radius(transform.scale());
        let screen_positions = self
            .map
            .markers
            .iter()
            .map(|marker| transform.to_screen(marker.position))
            .collect::<Vec<Pos2>>();

        let pointer = response.hover_pos();
        let marker = pointer.and_then(|pointer| {
            hovered_marker(pointer, &screen_positions, &self.map.marker_visible, radius)
        });
        let country = match (pointer, marker) {
            (Some(pointer), None) => {
                hovered_country(transform.to_canvas(pointer), &self.map.countries)
            }
            _ => None,
        };

        for event in self.hover.update(marker, country, pointer) {
            self.dispatch(event);
        }

        if marker.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        draw_countries(
            &painter,
            &transform,
            &self.map.countries,
            self.highlighted_country,
        );

        for index in self.markers.draw_order().iter().copied() {
            if !self.map.marker_visible.get(index).copied().unwrap_or(false) {
                continue;
            }

            let position = screen_positions[index];
            if !circle_visible(rect, position, radius + 2.0) {
                continue;
            }

            match self.markers.style(index) {
                MarkerStyle::Normal => {
                    painter.circle_filled(position, radius, MARKER_FILL);
                    painter.circle_stroke(
                        position,
                        radius,
                        Stroke::new(0.6, Color32::from_rgba_unmultiplied(15, 15, 15, 170)),
                    );
                }
                MarkerStyle::Highlighted => {
                    painter.circle_filled(position, radius + 2.0, MARKER_HIGHLIGHT);
                    painter.circle_stroke(
                        position,
                        radius + 2.0,
                        Stroke::new(1.4, Color32::from_gray(20)),
                    );
                }
            }
        }

        if let (Some(content), Some(position)) = (self.tooltip.content(), self.tooltip.position())
        {
            egui::Area::new(egui::Id::new("node_tooltip"))
                .order(egui::Order::Tooltip)
                .fixed_pos(position)
                .interactable(false)
                .show(ui.ctx(), |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        for line in content.lines() {
                            ui.label(line);
                        }
                    });
                });
        }
    }
}
