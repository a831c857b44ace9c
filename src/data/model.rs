use geo::{Coord, CoordsIter, MultiPolygon};

/// One country shape in lon/lat degrees (`x` = longitude, `y` = latitude).
#[derive(Clone, Debug, PartialEq)]
pub struct CountryFeature {
    pub id: Option<String>,
    pub name: String,
    pub shape: MultiPolygon<f64>,
}

impl CountryFeature {
    pub fn points(&self) -> impl Iterator<Item = Coord<f64>> + '_ {
        self.shape.coords_iter()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeRecord {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub organization: String,
    pub city: String,
    pub country_code: String,
    pub connected_since: String,
    pub asn: String,
}

impl NodeRecord {
    pub fn coordinates(&self) -> Option<Coord<f64>> {
        match (self.longitude, self.latitude) {
            (Some(lon), Some(lat)) => Some(Coord { x: lon, y: lat }),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct WorldData {
    pub countries: Vec<CountryFeature>,
    pub nodes: Vec<NodeRecord>,
}

impl WorldData {
    pub fn geo_points(&self) -> impl Iterator<Item = Coord<f64>> + '_ {
        self.countries.iter().flat_map(CountryFeature::points)
    }
}
