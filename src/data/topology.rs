use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::model::CountryFeature;

const NAME_PROPERTIES: [&str; 3] = ["NAME", "ADMIN", "name"];

#[derive(Debug, Deserialize)]
struct RawTopology {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    transform: Option<RawTransform>,
    #[serde(default)]
    objects: HashMap<String, RawGeometry>,
    #[serde(default)]
    arcs: Vec<Vec<Vec<f64>>>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
struct RawTransform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    arcs: Option<Value>,
    #[serde(default)]
    geometries: Vec<RawGeometry>,
}

impl RawGeometry {
    fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    fn display_name(&self) -> String {
        self.properties
            .as_ref()
            .and_then(|properties| {
                NAME_PROPERTIES
                    .iter()
                    .find_map(|key| properties.get(*key).and_then(Value::as_str))
            })
            .map(str::to_owned)
            .or_else(|| self.id_string())
            .unwrap_or_else(|| "Unnamed region".to_owned())
    }
}

/// Decodes the named geometry collection of a TopoJSON document into one
/// feature per member geometry.
pub(super) fn parse_countries(raw: &str, object_name: &str) -> Result<Vec<CountryFeature>> {
    let topology: RawTopology = serde_json::from_str(raw).context("invalid TopoJSON document")?;
    if topology.kind != "Topology" {
        bail!("expected a TopoJSON Topology, found type {:?}", topology.kind);
    }

    let arcs = decode_arcs(topology.arcs, topology.transform)?;

    let Some(object) = topology.objects.get(object_name) else {
        let mut available = topology.objects.keys().cloned().collect::<Vec<_>>();
        available.sort();
        return Err(anyhow!(
            "topology has no object named {object_name:?} (available: {})",
            available.join(", ")
        ));
    };

    let members = if object.kind.as_deref() == Some("GeometryCollection") {
        object.geometries.iter().collect::<Vec<_>>()
    } else {
        vec![object]
    };

    members
        .into_iter()
        .enumerate()
        .map(|(index, geometry)| {
            let polygons = geometry_polygons(geometry, &arcs)
                .with_context(|| format!("invalid geometry #{index} in {object_name:?}"))?;
            Ok(CountryFeature {
                id: geometry.id_string(),
                name: geometry.display_name(),
                shape: MultiPolygon::new(polygons),
            })
        })
        .collect()
}

fn decode_arcs(
    raw_arcs: Vec<Vec<Vec<f64>>>,
    transform: Option<RawTransform>,
) -> Result<Vec<Vec<Coord<f64>>>> {
    raw_arcs
        .into_iter()
        .enumerate()
        .map(|(index, arc)| {
            // Quantized arcs are delta-encoded relative to the previous position.
            let mut x = 0.0;
            let mut y = 0.0;
            arc.into_iter()
                .map(|position| {
                    let (px, py) = match position.as_slice() {
                        [px, py, ..] => (*px, *py),
                        _ => bail!("position has fewer than two coordinates"),
                    };
                    Ok(match transform {
                        Some(transform) => {
                            x += px;
                            y += py;
                            Coord {
                                x: x * transform.scale[0] + transform.translate[0],
                                y: y * transform.scale[1] + transform.translate[1],
                            }
                        }
                        None => Coord { x: px, y: py },
                    })
                })
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("invalid arc #{index}"))
        })
        .collect()
}

fn geometry_polygons(geometry: &RawGeometry, arcs: &[Vec<Coord<f64>>]) -> Result<Vec<Polygon<f64>>> {
    let arc_refs = || {
        geometry
            .arcs
            .clone()
            .ok_or_else(|| anyhow!("geometry has no arcs"))
    };

    match geometry.kind.as_deref() {
        Some("Polygon") => {
            let rings: Vec<Vec<i64>> =
                serde_json::from_value(arc_refs()?).context("invalid Polygon arcs")?;
            Ok(vec![stitch_polygon(arcs, &rings)?])
        }
        Some("MultiPolygon") => {
            let polygons: Vec<Vec<Vec<i64>>> =
                serde_json::from_value(arc_refs()?).context("invalid MultiPolygon arcs")?;
            polygons
                .iter()
                .map(|rings| stitch_polygon(arcs, rings))
                .collect()
        }
        Some("GeometryCollection") => {
            let mut polygons = Vec::new();
            for member in &geometry.geometries {
                polygons.extend(geometry_polygons(member, arcs)?);
            }
            Ok(polygons)
        }
        // Null and non-areal geometries keep their feature but draw nothing.
        _ => Ok(Vec::new()),
    }
}

/// The first ring is the exterior, the rest are holes.
fn stitch_polygon(arcs: &[Vec<Coord<f64>>], rings: &[Vec<i64>]) -> Result<Polygon<f64>> {
    let mut rings = rings
        .iter()
        .map(|ring| stitch_ring(arcs, ring).map(LineString::new))
        .collect::<Result<Vec<_>>>()?
        .into_iter();
    let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Ok(Polygon::new(exterior, rings.collect()))
}

fn stitch_ring(arcs: &[Vec<Coord<f64>>], indices: &[i64]) -> Result<Vec<Coord<f64>>> {
    let mut ring: Vec<Coord<f64>> = Vec::new();

    for &index in indices {
        let (arc_index, reversed) = if index < 0 {
            ((!index) as usize, true)
        } else {
            (index as usize, false)
        };
        let arc = arcs
            .get(arc_index)
            .ok_or_else(|| anyhow!("arc reference {index} is out of range ({} arcs)", arcs.len()))?;

        // Consecutive arcs share their joining point.
        ring.pop();
        if reversed {
            ring.extend(arc.iter().rev().copied());
        } else {
            ring.extend(arc.iter().copied());
        }
    }

    if let Some(&first) = ring.first()
        && ring.len() < 4
    {
        ring.push(first);
    }

    Ok(ring)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "type": "Topology",
        "transform": { "scale": [0.5, 0.5], "translate": [-10, -5] },
        "objects": {
            "countries": {
                "type": "GeometryCollection",
                "geometries": [
                    { "type": "Polygon", "arcs": [[0, 1]], "id": "ALP", "properties": { "NAME": "Alpha" } },
                    { "type": "Polygon", "arcs": [[-1, -2]], "id": 42 },
                    { "type": "MultiPolygon", "arcs": [[[0, 1]], [[-1, -2]]], "properties": { "name": "Gamma" } },
                    { "type": null, "properties": { "ADMIN": "Nowhere" } }
                ]
            },
            "land": { "type": "Polygon", "arcs": [[0, 1]] }
        },
        "arcs": [
            [[0, 0], [4, 0], [0, 4]],
            [[4, 4], [-4, 0], [0, -4]]
        ]
    }"#;

    fn ring(coords: &[(f64, f64)]) -> LineString<f64> {
        LineString::from(coords.to_vec())
    }

    #[test]
    fn one_feature_per_geometry_in_named_collection() {
        let countries = parse_countries(FIXTURE, "countries").unwrap();
        assert_eq!(countries.len(), 4);
        assert_eq!(countries[0].name, "Alpha");
        assert_eq!(countries[0].id.as_deref(), Some("ALP"));
        assert_eq!(countries[1].name, "42");
        assert_eq!(countries[2].name, "Gamma");
        assert_eq!(countries[2].shape.0.len(), 2);
        assert_eq!(countries[3].name, "Nowhere");
        assert!(countries[3].shape.0.is_empty());
    }

    #[test]
    fn quantized_arcs_are_stitched_without_duplicate_joints() {
        let countries = parse_countries(FIXTURE, "countries").unwrap();
        assert_eq!(
            countries[0].shape.0[0].exterior(),
            &ring(&[(-10.0, -5.0), (-8.0, -5.0), (-8.0, -3.0), (-10.0, -3.0), (-10.0, -5.0)])
        );
    }

    #[test]
    fn negative_arc_references_are_reversed() {
        let countries = parse_countries(FIXTURE, "countries").unwrap();
        assert_eq!(
            countries[1].shape.0[0].exterior(),
            &ring(&[(-8.0, -3.0), (-8.0, -5.0), (-10.0, -5.0), (-10.0, -3.0), (-8.0, -3.0)])
        );
    }

    #[test]
    fn single_geometry_object_becomes_one_feature() {
        let land = parse_countries(FIXTURE, "land").unwrap();
        assert_eq!(land.len(), 1);
        assert_eq!(land[0].name, "Unnamed region");
    }

    #[test]
    fn untransformed_arcs_use_absolute_positions() {
        let raw = r#"{
            "type": "Topology",
            "objects": { "c": { "type": "GeometryCollection", "geometries": [
                { "type": "Polygon", "arcs": [[0]] }
            ] } },
            "arcs": [[[1.5, 2.5], [3.0, 2.5], [3.0, 4.0], [1.5, 2.5]]]
        }"#;
        let countries = parse_countries(raw, "c").unwrap();
        assert_eq!(
            countries[0].shape.0[0].exterior(),
            &ring(&[(1.5, 2.5), (3.0, 2.5), (3.0, 4.0), (1.5, 2.5)])
        );
    }

    #[test]
    fn later_rings_become_interiors() {
        let raw = r#"{
            "type": "Topology",
            "objects": { "c": { "type": "GeometryCollection", "geometries": [
                { "type": "Polygon", "arcs": [[0], [1]] }
            ] } },
            "arcs": [
                [[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]],
                [[4, 4], [4, 6], [6, 6], [6, 4], [4, 4]]
            ]
        }"#;
        let countries = parse_countries(raw, "c").unwrap();
        let polygon = &countries[0].shape.0[0];
        assert_eq!(polygon.exterior().0.len(), 5);
        assert_eq!(polygon.interiors().len(), 1);
        assert_eq!(
            &polygon.interiors()[0],
            &ring(&[(4.0, 4.0), (4.0, 6.0), (6.0, 6.0), (6.0, 4.0), (4.0, 4.0)])
        );
    }

    #[test]
    fn missing_object_lists_available_names() {
        let error = parse_countries(FIXTURE, "ne_110m_admin_0_countries").unwrap_err();
        let message = format!("{error:#}");
        assert!(message.contains("countries, land"), "{message}");
    }

    #[test]
    fn out_of_range_arc_reference_is_rejected() {
        let raw = r#"{
            "type": "Topology",
            "objects": { "c": { "type": "GeometryCollection", "geometries": [
                { "type": "Polygon", "arcs": [[7]] }
            ] } },
            "arcs": []
        }"#;
        assert!(parse_countries(raw, "c").is_err());
    }

    #[test]
    fn non_topology_documents_are_rejected() {
        let raw = r#"{ "type": "FeatureCollection", "features": [] }"#;
        assert!(parse_countries(raw, "countries").is_err());
        assert!(parse_countries("not json", "countries").is_err());
    }
}
