use eframe::egui::{self, RichText, Ui};

use crate::util::organization_label;

use super::super::filter::FilterSelection;
use super::super::{MapEvent, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Map Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Organization")
            .on_hover_text("Show only the markers of one organization.");
        ui.text_edit_singleline(&mut self.option_query)
            .on_hover_text("Type to narrow the dropdown with a fuzzy search.");

        let selected_value = self.filter.selected_value().to_owned();
        let mut pending_selection = None;
        egui::ComboBox::from_id_salt("organization_filter")
            .selected_text(organization_label(&selected_value))
            .width(ui.available_width())
            .height(360.0)
            .show_ui(ui, |ui| {
                for option in self.filter.matching_options(&self.option_query) {
                    let response =
                        ui.selectable_label(option == selected_value, organization_label(option));
                    if response.clicked() {
                        pending_selection = Some(option.to_owned());
                    }
                }
            });

        if let Some(value) = pending_selection {
            self.dispatch(MapEvent::OrganizationSelected(value));
        }

        if let FilterSelection::One(name) = self.filter.selection() {
            ui.small(format!("Showing only {}", organization_label(name)));
        }

        ui.separator();
        ui.label(RichText::new("Dataset").strong());
        ui.label(format!("Countries drawn: {}", self.map.countries.len()));
        ui.label(format!(
            "Markers: {} visible of {}",
            self.map.visible_marker_count(),
            self.map.markers.len()
        ));
        if self.map.skipped_nodes > 0 {
            ui.label(format!(
                "Nodes without valid coordinates: {}",
                self.map.skipped_nodes
            ))
            .on_hover_text("These records have no marker but still appear in the organization list.");
        }
        if self.map.dropped_vertices > 0 {
            ui.label(format!(
                "Boundary vertices left out: {}",
                self.map.dropped_vertices
            ))
            .on_hover_text("Non-finite or far out-of-range coordinates in the boundary dataset.");
        }

        ui.separator();
        ui.label(RichText::new("Hover").strong());
        let country_label = match self
            .highlighted_country
            .and_then(|index| self.map.countries.get(index))
        {
            Some(country) => match &country.id {
                Some(id) => format!("Country: {} ({id})", country.name),
                None => format!("Country: {}", country.name),
            },
            None => "Country: -".to_owned(),
        };
        ui.label(country_label);

        let hovered_organization = self
            .hover
            .hovered_marker()
            .and_then(|marker| self.map.markers.get(marker))
            .and_then(|marker| self.world.nodes.get(marker.node))
            .map_or("-", |node| organization_label(&node.organization));
        ui.label(format!("Node organization: {hovered_organization}"));

        ui.separator();
        ui.horizontal(|ui| {
            ui.label(format!("Zoom: {:.0}%", self.zoom * 100.0));
            if ui.button("Reset view").clicked() {
                self.reset_view();
            }
        });
        ui.small("Scroll to zoom. Drag with the right or middle button to pan.");
    }
}
