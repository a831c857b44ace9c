use anyhow::{Result, bail};
use geo::Coord;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

/// Natural Earth I pseudo-cylindrical projection, scaled and translated into
/// canvas units. Canvas y grows downwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NaturalEarth1 {
    scale: f64,
    translate_x: f64,
    translate_y: f64,
}

/// `x` is longitude and `y` latitude, both in degrees.
fn valid_geo(point: Coord<f64>) -> bool {
    point.x.is_finite()
        && point.y.is_finite()
        && (-180.0..=180.0).contains(&point.x)
        && (-90.0..=90.0).contains(&point.y)
}

/// Unscaled projection of a point given in radians; y grows northwards.
fn natural_earth_raw(lambda: f64, phi: f64) -> (f64, f64) {
    let phi2 = phi * phi;
    let phi4 = phi2 * phi2;
    let x = lambda
        * (0.8707 - 0.131979 * phi2
            + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4)));
    let y = phi
        * (1.007226 + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4)));
    (x, y)
}

fn raw_for(point: Coord<f64>) -> (f64, f64) {
    natural_earth_raw(point.x.to_radians(), point.y.to_radians())
}

impl NaturalEarth1 {
    /// Fits the projection so the extent of `points` fills `size` in its
    /// limiting dimension and is centred in the other.
    pub fn fit_size(size: CanvasSize, points: impl IntoIterator<Item = Coord<f64>>) -> Result<Self> {
        if !(size.width > 0.0 && size.height > 0.0) {
            bail!("canvas size must be positive, got {}x{}", size.width, size.height);
        }

        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for point in points.into_iter().filter(|point| valid_geo(*point)) {
            let (x, y) = raw_for(point);
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }

        if !min_x.is_finite() {
            bail!("boundary geometry has no valid coordinates to fit the projection to");
        }

        let extent_x = max_x - min_x;
        let extent_y = max_y - min_y;
        if extent_x <= f64::EPSILON || extent_y <= f64::EPSILON {
            bail!("boundary geometry has a degenerate extent ({extent_x} x {extent_y})");
        }

        let scale = (size.width / extent_x).min(size.height / extent_y);
        Ok(Self {
            scale,
            translate_x: (size.width - scale * (min_x + max_x)) / 2.0,
            translate_y: (size.height + scale * (min_y + max_y)) / 2.0,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn project(&self, point: Coord<f64>) -> Option<CanvasPoint> {
        if !valid_geo(point) {
            return None;
        }

        let (x, y) = raw_for(point);
        Some(CanvasPoint {
            x: self.translate_x + self.scale * x,
            y: self.translate_y - self.scale * y,
        })
    }
}
