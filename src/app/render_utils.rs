use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, StrokeKind, Vec2, vec2};

use crate::projection::CanvasSize;

/// Maps canvas units onto the screen: the canvas is fitted into the panel,
/// then zoomed and panned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct CanvasTransform {
    origin: Pos2,
    scale: f32,
}

impl CanvasTransform {
    pub(super) fn fit(rect: Rect, canvas: CanvasSize, pan: Vec2, zoom: f32) -> Self {
        let canvas_size = canvas_vec(canvas);
        let scale = fit_scale(rect, canvas) * zoom;
        Self {
            origin: rect.center() + pan - (canvas_size * scale * 0.5),
            scale,
        }
    }

    pub(super) fn scale(&self) -> f32 {
        self.scale
    }

    pub(super) fn to_screen(&self, canvas: Pos2) -> Pos2 {
        self.origin + (canvas.to_vec2() * self.scale)
    }

    pub(super) fn to_canvas(&self, screen: Pos2) -> Pos2 {
        ((screen - self.origin) / self.scale).to_pos2()
    }

    pub(super) fn canvas_rect(&self, canvas: CanvasSize) -> Rect {
        Rect::from_min_size(self.origin, canvas_vec(canvas) * self.scale)
    }
}

pub(super) fn canvas_vec(canvas: CanvasSize) -> Vec2 {
    vec2(canvas.width as f32, canvas.height as f32)
}

pub(super) fn fit_scale(rect: Rect, canvas: CanvasSize) -> f32 {
    let size = canvas_vec(canvas);
    (rect.width() / size.x).min(rect.height() / size.y).max(f32::EPSILON)
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, canvas_rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));
    painter.rect_filled(canvas_rect, 0.0, Color32::from_rgb(24, 34, 46));
    painter.rect_stroke(
        canvas_rect,
        0.0,
        Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 120)),
        StrokeKind::Outside,
    );
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}
