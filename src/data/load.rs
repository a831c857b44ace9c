use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::thread::{self, ScopedJoinHandle};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use super::model::{CountryFeature, NodeRecord, WorldData};
use super::nodes::read_nodes;
use super::topology::parse_countries;

/// Where the two datasets come from.
#[derive(Clone, Debug)]
pub struct DataSources {
    pub countries: PathBuf,
    pub object: String,
    pub nodes: PathBuf,
}

/// Reads both datasets concurrently and succeeds only when both do.
pub fn load_world(sources: &DataSources) -> Result<WorldData> {
    let (countries, nodes) = thread::scope(|scope| {
        let countries = scope.spawn(|| load_countries(&sources.countries, &sources.object));
        let nodes = scope.spawn(|| load_nodes(&sources.nodes));
        (
            join_loader(countries, "boundary"),
            join_loader(nodes, "node"),
        )
    });

    let countries = countries?;
    let nodes = nodes?;

    info!(
        countries = countries.len(),
        nodes = nodes.len(),
        "datasets loaded"
    );

    Ok(WorldData { countries, nodes })
}

fn join_loader<T>(handle: ScopedJoinHandle<'_, Result<T>>, dataset: &str) -> Result<T> {
    handle
        .join()
        .map_err(|_| anyhow!("{dataset} dataset loader panicked"))?
}

fn load_countries(path: &Path, object: &str) -> Result<Vec<CountryFeature>> {
    debug!(path = %path.display(), object, "reading boundary dataset");
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read boundary dataset {}", path.display()))?;
    parse_countries(&raw, object)
        .with_context(|| format!("failed to decode boundary dataset {}", path.display()))
}

fn load_nodes(path: &Path) -> Result<Vec<NodeRecord>> {
    debug!(path = %path.display(), "reading node dataset");
    let file = File::open(path)
        .with_context(|| format!("failed to open node dataset {}", path.display()))?;
    read_nodes(BufReader::new(file))
        .with_context(|| format!("failed to decode node dataset {}", path.display()))
}
