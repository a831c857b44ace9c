mod app;
mod data;
mod projection;
mod util;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::data::DataSources;
use crate::projection::CanvasSize;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// TopoJSON file with the country boundaries.
    #[arg(long, default_value = "data/countries.json")]
    countries: PathBuf,
    /// Name of the geometry collection inside the TopoJSON objects.
    #[arg(long, default_value = "ne_110m_admin_0_countries")]
    object: String,
    /// CSV file with one row per network node.
    #[arg(long, default_value = "data/bitnodes.csv")]
    nodes: PathBuf,
    /// Width of the map canvas in canvas units.
    #[arg(long, default_value_t = 960.0)]
    width: f64,
    /// Height of the map canvas in canvas units.
    #[arg(long, default_value_t = 600.0)]
    height: f64,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bitnode_map=info")),
        )
        .init();

    let args = Args::parse();
    let sources = DataSources {
        countries: args.countries,
        object: args.object,
        nodes: args.nodes,
    };
    let canvas = CanvasSize {
        width: args.width,
        height: args.height,
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1320.0, 760.0]),
        ..Default::default()
    };

    eframe::run_native(
        "bitnode-map",
        options,
        Box::new(move |cc| Ok(Box::new(app::MapViewerApp::new(cc, sources, canvas)))),
    )
}
