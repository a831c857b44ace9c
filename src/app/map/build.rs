use anyhow::{Context, Result};
use eframe::egui::epaint::{Vertex, WHITE_UV};
use eframe::egui::{Color32, Mesh, Pos2, Rect};
use geo::{Coord, LineString, MultiPolygon, Polygon, TriangulateEarcut};
use tracing::{debug, warn};

use crate::data::{CountryFeature, NodeRecord, WorldData};
use crate::projection::{CanvasPoint, CanvasSize, NaturalEarth1};

use super::super::filter::OrganizationFilter;
use super::super::{RenderCountry, RenderMap, RenderMarker};

/// How far past the globe's edges, in degrees, a boundary vertex may drift
/// and still be snapped back onto it.
const EDGE_TOLERANCE: f64 = 1.0;

fn canvas_pos(point: CanvasPoint) -> Pos2 {
    Pos2::new(point.x as f32, point.y as f32)
}

fn snap_to_globe(point: Coord<f64>) -> Coord<f64> {
    let snap = |value: f64, limit: f64| {
        if value.abs() > limit && value.abs() <= limit + EDGE_TOLERANCE {
            value.clamp(-limit, limit)
        } else {
            value
        }
    };
    Coord {
        x: snap(point.x, 180.0),
        y: snap(point.y, 90.0),
    }
}

fn project_ring(
    projection: &NaturalEarth1,
    ring: &LineString<f64>,
    dropped: &mut usize,
) -> LineString<f64> {
    let mut coords = Vec::with_capacity(ring.0.len());
    for point in ring.coords() {
        match projection.project(snap_to_globe(*point)) {
            Some(projected) => coords.push(Coord {
                x: projected.x,
                y: projected.y,
            }),
            None => *dropped += 1,
        }
    }
    LineString::new(coords)
}

fn ring_points(ring: &LineString<f64>) -> Vec<Pos2> {
    ring.coords()
        .map(|coord| Pos2::new(coord.x as f32, coord.y as f32))
        .collect()
}

fn project_country(
    projection: &NaturalEarth1,
    country: &CountryFeature,
    dropped: &mut usize,
) -> RenderCountry {
    let mut polygons = Vec::with_capacity(country.shape.0.len());
    for polygon in country.shape.iter() {
        let exterior = project_ring(projection, polygon.exterior(), dropped);
        if exterior.0.len() < 3 {
            continue;
        }
        let interiors = polygon
            .interiors()
            .iter()
            .map(|ring| project_ring(projection, ring, dropped))
            .filter(|ring| ring.0.len() >= 3)
            .collect();
        polygons.push(Polygon::new(exterior, interiors));
    }

    let mut fill = Mesh::default();
    let mut rings = Vec::new();
    for polygon in &polygons {
        let triangulation = polygon.earcut_triangles_raw();
        let base = fill.vertices.len() as u32;
        fill.vertices
            .extend(triangulation.vertices.chunks_exact(2).map(|xy| Vertex {
                pos: Pos2::new(xy[0] as f32, xy[1] as f32),
                uv: WHITE_UV,
                color: Color32::WHITE,
            }));
        fill.indices.extend(
            triangulation
                .triangle_indices
                .iter()
                .map(|&index| base + index as u32),
        );

        rings.push(ring_points(polygon.exterior()));
        rings.extend(polygon.interiors().iter().map(ring_points));
    }

    let points = rings.iter().flatten().copied().collect::<Vec<_>>();
    let bounds = if points.is_empty() {
        Rect::NOTHING
    } else {
        Rect::from_points(&points)
    };

    RenderCountry {
        id: country.id.clone(),
        name: country.name.clone(),
        shape: MultiPolygon::new(polygons),
        rings,
        fill,
        bounds,
    }
}

impl RenderMap {
    /// Fits one projection to the boundary geometry and uses it for every
    /// country vertex and node position.
    pub(in crate::app) fn build(world: &WorldData, canvas: CanvasSize) -> Result<Self> {
        let projection = NaturalEarth1::fit_size(canvas, world.geo_points())
            .context("failed to fit the map projection to the boundary dataset")?;
        debug!(scale = projection.scale(), "projection fitted");

        let mut dropped_vertices = 0usize;
        let countries = world
            .countries
            .iter()
            .map(|country| project_country(&projection, country, &mut dropped_vertices))
            .collect::<Vec<_>>();
        if dropped_vertices > 0 {
            warn!(
                dropped = dropped_vertices,
                "boundary vertices outside the globe were left out of their rings"
            );
        }

        let mut markers = Vec::with_capacity(world.nodes.len());
        let mut skipped_nodes = 0usize;
        for (index, node) in world.nodes.iter().enumerate() {
            match node
                .coordinates()
                .and_then(|point| projection.project(point))
            {
                Some(point) => markers.push(RenderMarker {
                    node: index,
                    position: canvas_pos(point),
                }),
                None => skipped_nodes += 1,
            }
        }

        if skipped_nodes > 0 {
            warn!(
                skipped = skipped_nodes,
                "node records without valid coordinates have no marker"
            );
        }

        let marker_visible = vec![true; markers.len()];

        Ok(Self {
            canvas,
            countries,
            markers,
            marker_visible,
            skipped_nodes,
            dropped_vertices,
        })
    }

    pub(in crate::app) fn apply_filter(&mut self, filter: &OrganizationFilter, nodes: &[NodeRecord]) {
        let visibility = filter.visibility(nodes);
        self.marker_visible = self
            .markers
            .iter()
            .map(|marker| visibility.get(marker.node).copied().unwrap_or(false))
            .collect();
    }

    pub(in crate::app) fn visible_marker_count(&self) -> usize {
        self.marker_visible.iter().filter(|visible| **visible).count()
    }
}
