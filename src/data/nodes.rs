use std::io::Read;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use super::model::NodeRecord;

const REQUIRED_COLUMNS: [&str; 7] = [
    "LAT",
    "LON",
    "Organization_name",
    "City",
    "Country_code",
    "Connected_since",
    "ASN",
];

#[derive(Debug, Deserialize)]
struct RawNodeRow {
    #[serde(rename = "LAT", deserialize_with = "csv::invalid_option")]
    latitude: Option<f64>,
    #[serde(rename = "LON", deserialize_with = "csv::invalid_option")]
    longitude: Option<f64>,
    #[serde(rename = "Organization_name")]
    organization: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Country_code")]
    country_code: String,
    #[serde(rename = "Connected_since")]
    connected_since: String,
    #[serde(rename = "ASN")]
    asn: String,
}

impl From<RawNodeRow> for NodeRecord {
    fn from(row: RawNodeRow) -> Self {
        Self {
            latitude: row.latitude,
            longitude: row.longitude,
            organization: row.organization,
            city: row.city,
            country_code: row.country_code,
            connected_since: row.connected_since,
            asn: row.asn,
        }
    }
}

/// Reads one node record per CSV row. Unparseable coordinates become `None`
/// rather than failing the whole table.
pub(super) fn read_nodes<R: Read>(input: R) -> Result<Vec<NodeRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers().context("failed to read CSV header row")?;
    let missing = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .copied()
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!("node table is missing columns: {}", missing.join(", "));
    }

    reader
        .deserialize::<RawNodeRow>()
        .enumerate()
        .map(|(index, row)| {
            row.map(NodeRecord::from)
                .with_context(|| format!("invalid node row #{}", index + 1))
        })
        .collect()
}
