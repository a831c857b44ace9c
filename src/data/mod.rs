mod load;
mod model;
mod nodes;
mod topology;

pub use load::{DataSources, load_world};
pub use model::{CountryFeature, NodeRecord, WorldData};
