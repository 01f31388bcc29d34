use tracing::debug;

use crate::config::DatasetConfig;
use crate::error::Result;
use crate::fetch::{Fetch, Format};
use crate::io::{read_geojson, read_points};
use crate::schema::{shadows_layer, LAYER_COLUMN};
use crate::table::GeoTable;

/// Fetch, parse and normalize one dataset. With `tag`, records carry a `layer` column
/// holding the dataset name.
pub fn load_dataset(fetcher: &dyn Fetch, dataset: &DatasetConfig, tag: bool) -> Result<GeoTable> {
    let bytes = fetcher.fetch(&dataset.source)?;

    let table = match &dataset.format {
        Format::GeoJson => read_geojson(&bytes)?,
        Format::Tabular { lon, lat } => read_points(&bytes, lon, lat)?,
    };
    debug!(dataset = %dataset.name, records = table.len(), columns = table.columns().len(), "parsed");

    let layer = tag.then_some(dataset.name.as_str());
    match (&dataset.schema, layer) {
        (Some(schema), layer) => schema.normalize(&table, layer),
        (None, Some(layer)) => {
            shadows_layer(&table, Some(layer));
            Ok(table.with_constant(LAYER_COLUMN, layer.into()))
        }
        (None, None) => Ok(table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fetch::{MemFetcher, Source};
    use crate::schema::{ColumnMapping, Normalizer};
    use crate::table::Value;
    use serde_json::json;

    fn dataset(schema: Option<Normalizer>) -> DatasetConfig {
        DatasetConfig {
            name: "dreal_b:ZSC".into(),
            source: Source::http("https://example.test/wfs").param("TYPENAMES", "dreal_b:ZSC"),
            format: Format::GeoJson,
            schema,
        }
    }

    fn body() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "id": "ZSC.1", "properties": { "sitename": "Baie de Saint-Brieuc - Est" },
                  "geometry": { "type": "Point", "coordinates": [-2.7, 48.5] } },
            ],
        })).unwrap()
    }

    #[test]
    fn normalizes_and_tags() {
        let ds = dataset(Some(Normalizer::new(vec![
            ColumnMapping::new("id", &[]),
            ColumnMapping::new("nom", &["sitename"]),
        ])));
        let fetcher = MemFetcher::new().with(ds.source.clone(), body());

        let t = load_dataset(&fetcher, &ds, true).unwrap();
        assert_eq!(t.columns(), ["id", "nom", "layer"]);
        assert_eq!(t.get(0, "layer"), Some(&Value::from("dreal_b:ZSC")));
    }

    #[test]
    fn without_schema_keeps_upstream_columns() {
        let ds = dataset(None);
        let fetcher = MemFetcher::new().with(ds.source.clone(), body());

        let t = load_dataset(&fetcher, &ds, false).unwrap();
        assert_eq!(t.columns(), ["id", "sitename"]);
    }

    #[test]
    fn propagates_fetch_errors() {
        let ds = dataset(None);
        let fetcher = MemFetcher::new().failing(ds.source.clone(), "500 Internal Server Error");
        assert!(matches!(load_dataset(&fetcher, &ds, false), Err(Error::Fetch { .. })));
    }
}
