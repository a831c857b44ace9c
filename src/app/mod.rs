use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::Result;
use eframe::egui::{self, Context, Mesh, Pos2, Rect, Vec2};
use geo::MultiPolygon;
use tracing::{error, info};

use crate::data::{DataSources, WorldData, load_world};
use crate::projection::CanvasSize;

mod filter;
mod hover;
mod map;
mod render_utils;
mod tooltip;
mod ui;

use self::filter::OrganizationFilter;
use self::hover::{HoverTracker, MarkerLayer};
use self::tooltip::Tooltip;

pub struct MapViewerApp {
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<LoadedMap, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct LoadedMap {
    world: WorldData,
    map: RenderMap,
}

struct ViewModel {
    world: WorldData,
    map: RenderMap,
    filter: OrganizationFilter,
    option_query: String,
    tooltip: Tooltip,
    hover: HoverTracker,
    markers: MarkerLayer,
    highlighted_country: Option<usize>,
    pan: Vec2,
    zoom: f32,
}

/// Projected geometry for one loaded dataset pair, in canvas units.
struct RenderMap {
    canvas: CanvasSize,
    countries: Vec<RenderCountry>,
    markers: Vec<RenderMarker>,
    marker_visible: Vec<bool>,
    skipped_nodes: usize,
    dropped_vertices: usize,
}

struct RenderCountry {
    id: Option<String>,
    name: String,
    /// Projected outline in canvas units, used for hit tests.
    shape: MultiPolygon<f64>,
    rings: Vec<Vec<Pos2>>,
    fill: Mesh,
    bounds: Rect,
}

struct RenderMarker {
    node: usize,
    position: Pos2,
}

/// Pointer and selection events routed to the map components.
#[derive(Clone, Debug, PartialEq)]
enum MapEvent {
    MarkerEntered(usize),
    MarkerLeft(usize),
    CountryEntered(usize),
    CountryLeft(usize),
    PointerMoved(Pos2),
    OrganizationSelected(String),
}

fn prepare_map(sources: &DataSources, canvas: CanvasSize) -> Result<LoadedMap> {
    let world = load_world(sources)?;
    let map = RenderMap::build(&world, canvas)?;
    Ok(LoadedMap { world, map })
}

impl MapViewerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, sources: DataSources, canvas: CanvasSize) -> Self {
        Self {
            state: Self::start_load(sources, canvas),
        }
    }

    fn start_load(sources: DataSources, canvas: CanvasSize) -> AppState {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = prepare_map(&sources, canvas).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        AppState::Loading { rx }
    }
}

impl eframe::App for MapViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(loaded) => {
                            info!(
                                countries = loaded.map.countries.len(),
                                markers = loaded.map.markers.len(),
                                "map ready"
                            );
                            AppState::Ready(Box::new(ViewModel::new(loaded.world, loaded.map)))
                        }
                        Err(message) => {
                            error!(error = %message, "failed to load map datasets");
                            AppState::Error(message)
                        }
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading map datasets...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load map datasets");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                });
            }
            AppState::Ready(model) => model.show(ctx),
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}

impl ViewModel {
    fn new(world: WorldData, map: RenderMap) -> Self {
        let filter = OrganizationFilter::from_nodes(&world.nodes);
        let markers = MarkerLayer::new(map.markers.len());

        Self {
            world,
            map,
            filter,
            option_query: String::new(),
            tooltip: Tooltip::default(),
            hover: HoverTracker::default(),
            markers,
            highlighted_country: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    fn dispatch(&mut self, event: MapEvent) {
        match event {
            MapEvent::MarkerEntered(marker) => {
                let Some(node) = self
                    .map
                    .markers
                    .get(marker)
                    .and_then(|render| self.world.nodes.get(render.node))
                else {
                    return;
                };
                self.markers.raise(marker);
                self.tooltip.show(node);
            }
            MapEvent::MarkerLeft(marker) => {
                self.markers.restore(marker);
                self.tooltip.hide();
            }
            MapEvent::CountryEntered(country) => {
                self.highlighted_country = Some(country);
            }
            MapEvent::CountryLeft(country) => {
                if self.highlighted_country == Some(country) {
                    self.highlighted_country = None;
                }
            }
            MapEvent::PointerMoved(pointer) => self.tooltip.move_to(pointer),
            MapEvent::OrganizationSelected(value) => {
                if self.filter.select(&value) {
                    self.map.apply_filter(&self.filter, &self.world.nodes);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use geo::{LineString, Polygon};

    use crate::data::{CountryFeature, NodeRecord};

    use super::filter::ALL_ORGANIZATIONS;
    use super::hover::MarkerStyle;
    use super::*;

    fn node(organization: &str, lon: f64, lat: f64) -> NodeRecord {
        NodeRecord {
            latitude: Some(lat),
            longitude: Some(lon),
            organization: organization.to_owned(),
            city: format!("{organization} City"),
            country_code: "XX".to_owned(),
            connected_since: "not-a-timestamp".to_owned(),
            asn: format!("AS-{organization}"),
        }
    }

    fn world(nodes: Vec<NodeRecord>) -> WorldData {
        let ring = LineString::from(vec![
            (-20.0, -10.0),
            (20.0, -10.0),
            (20.0, 10.0),
            (-20.0, 10.0),
            (-20.0, -10.0),
        ]);
        WorldData {
            countries: vec![CountryFeature {
                id: None,
                name: "Block".to_owned(),
                shape: MultiPolygon::new(vec![Polygon::new(ring, Vec::new())]),
            }],
            nodes,
        }
    }

    fn model(nodes: Vec<NodeRecord>) -> ViewModel {
        let world = world(nodes);
        let canvas = CanvasSize {
            width: 960.0,
            height: 600.0,
        };
        let map = RenderMap::build(&world, canvas).unwrap();
        ViewModel::new(world, map)
    }

    #[test]
    fn selecting_an_organization_shows_only_its_markers() {
        let mut model = model(vec![
            node("A", 0.0, 0.0),
            node("B", 5.0, 5.0),
            node("A", -5.0, -5.0),
        ]);

        assert_eq!(model.filter.options(), [ALL_ORGANIZATIONS, "A", "B"]);
        assert_eq!(model.map.marker_visible, [true, true, true]);

        model.dispatch(MapEvent::OrganizationSelected("B".to_owned()));
        assert_eq!(model.map.marker_visible, [false, true, false]);

        model.dispatch(MapEvent::OrganizationSelected(ALL_ORGANIZATIONS.to_owned()));
        assert_eq!(model.map.marker_visible, [true, true, true]);
    }

    #[test]
    fn unknown_selection_keeps_current_visibility() {
        let mut model = model(vec![node("A", 0.0, 0.0), node("B", 5.0, 5.0)]);
        model.dispatch(MapEvent::OrganizationSelected("A".to_owned()));
        model.dispatch(MapEvent::OrganizationSelected("Nobody".to_owned()));
        assert_eq!(model.map.marker_visible, [true, false]);
    }

    #[test]
    fn hovering_a_marker_shows_and_hides_its_tooltip() {
        let mut model = model(vec![node("A", 0.0, 0.0), node("B", 5.0, 5.0)]);
        let order_before = model.markers.draw_order().to_vec();

        model.dispatch(MapEvent::MarkerEntered(0));
        model.dispatch(MapEvent::PointerMoved(Pos2::new(100.0, 200.0)));
        assert_eq!(model.markers.style(0), MarkerStyle::Highlighted);
        assert_eq!(model.markers.draw_order().last(), Some(&0));
        assert_eq!(
            model.tooltip.content().as_deref(),
            Some("ASN: AS-A\nCity: A City\nCountry: XX\nConnected Since: not-a-timestamp")
        );
        assert_eq!(model.tooltip.position(), Some(Pos2::new(110.0, 170.0)));

        model.dispatch(MapEvent::MarkerLeft(0));
        assert_eq!(model.markers.style(0), MarkerStyle::Normal);
        assert_eq!(model.markers.draw_order(), order_before.as_slice());
        assert_eq!(model.tooltip.content(), None);
        assert_eq!(model.tooltip.position(), None);
    }

    #[test]
    fn country_highlight_follows_enter_and_leave() {
        let mut model = model(vec![node("A", 0.0, 0.0)]);
        model.dispatch(MapEvent::CountryEntered(0));
        assert_eq!(model.highlighted_country, Some(0));
        model.dispatch(MapEvent::CountryLeft(0));
        assert_eq!(model.highlighted_country, None);
    }

    #[test]
    fn events_for_unknown_markers_are_ignored() {
        let mut model = model(vec![node("A", 0.0, 0.0)]);
        model.dispatch(MapEvent::MarkerEntered(7));
        assert_eq!(model.tooltip.content(), None);
        assert_eq!(model.markers.draw_order(), [0]);
    }

    #[test]
    fn empty_node_table_gives_only_the_sentinel_and_no_markers() {
        let mut model = model(Vec::new());
        assert_eq!(model.filter.options(), [ALL_ORGANIZATIONS]);
        assert!(model.map.markers.is_empty());
        assert_eq!(model.map.visible_marker_count(), 0);
        assert_eq!(model.map.countries.len(), 1);

        model.dispatch(MapEvent::OrganizationSelected(ALL_ORGANIZATIONS.to_owned()));
        assert!(model.map.marker_visible.is_empty());
    }
}
