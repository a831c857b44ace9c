use eframe::egui::{self, Align, Context, Layout};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("bitnode-map");
                    ui.separator();
                    ui.label(format!("countries: {}", self.map.countries.len()));
                    ui.label(format!("nodes: {}", self.world.nodes.len()));
                    ui.label(format!(
                        "organizations: {}",
                        self.filter.options().len().saturating_sub(1)
                    ));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.visible_markers_text());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_map(ui));
    }

    pub(in crate::app) fn visible_markers_text(&self) -> String {
        format!(
            "visible markers: {} / {}",
            self.map.visible_marker_count(),
            self.map.markers.len()
        )
    }
}
