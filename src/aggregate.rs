use std::sync::Arc;

use tracing::warn;

use crate::config::DatasetConfig;
use crate::error::Error;
use crate::fetch::Fetch;
use crate::pipeline::load_dataset;
use crate::table::GeoTable;

/// A sub-layer that could not be loaded.
#[derive(Debug)]
pub struct LayerFailure {
    pub layer: String,
    pub error: Error,
}

/// Combined table of the sub-layers that loaded, plus the ones that did not.
#[derive(Debug)]
pub struct LayerSet {
    pub table: Arc<GeoTable>,
    pub failures: Vec<LayerFailure>,
}

impl LayerSet {
    pub fn is_complete(&self) -> bool { self.failures.is_empty() }

    /// Names of the sub-layers that failed, in fetch order.
    pub fn failed_layers(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.layer.as_str())
    }
}

/// Loads the sub-layers of one conceptual dataset and concatenates them.
///
/// Each sub-layer is fetched, parsed, normalized and tagged with its name
/// independently; a failing sub-layer is logged and skipped. When every
/// sub-layer fails the result is an empty table.
pub struct LayerAggregator<'a> {
    fetcher: &'a dyn Fetch,
}

impl<'a> LayerAggregator<'a> {
    pub fn new(fetcher: &'a dyn Fetch) -> Self { Self { fetcher } }

    pub fn aggregate(&self, layers: &[DatasetConfig]) -> LayerSet {
        let mut tables: Vec<GeoTable> = Vec::with_capacity(layers.len());
        let mut failures = Vec::new();

        for layer in layers {
            let loaded = load_dataset(self.fetcher, layer, true).and_then(|table| {
                // concatenation requires one CRS; the first loaded layer sets it
                match tables.first().map(GeoTable::crs) {
                    Some(crs) if crs != table.crs() => Err(Error::SchemaMismatch {
                        expected: format!("layer in {crs}"),
                        found: format!("layer in {}", table.crs()),
                    }),
                    _ => Ok(table),
                }
            });
            match loaded {
                Ok(table) => tables.push(table),
                Err(error) => {
                    warn!(layer = %layer.name, %error, "skipping layer");
                    failures.push(LayerFailure { layer: layer.name.clone(), error });
                }
            }
        }

        // every kept layer shares the first one's CRS, so concatenation cannot fail
        let table = GeoTable::concat(tables).unwrap_or_else(|_| GeoTable::empty());
        LayerSet { table: Arc::new(table), failures }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{Format, MemFetcher, Source};

    fn layer(name: &str) -> DatasetConfig {
        DatasetConfig {
            name: name.into(),
            source: Source::http("https://example.test/wfs").param("TYPENAMES", name),
            format: Format::GeoJson,
            schema: None,
        }
    }

    #[test]
    fn partial_failure_keeps_other_layers() {
        let layers = [layer("a"), layer("b")];
        let body = br#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"nom":"x"},"geometry":{"type":"Point","coordinates":[0,0]}}]}"#;
        let fetcher = MemFetcher::new()
            .with(layers[0].source.clone(), body.to_vec())
            .with(layers[1].source.clone(), b"not json".to_vec());

        let set = LayerAggregator::new(&fetcher).aggregate(&layers);
        assert_eq!(set.table.len(), 1);
        assert_eq!(set.failed_layers().collect::<Vec<_>>(), ["b"]);
        assert!(matches!(set.failures[0].error, Error::Parse(_)));
        assert!(!set.is_complete());
    }

    #[test]
    fn layer_in_another_crs_is_reported_as_failure() {
        let layers = [layer("a"), layer("b")];
        let wgs84 = br#"{"type":"FeatureCollection","features":[]}"#;
        let lambert93 = br#"{"type":"FeatureCollection","crs":{"type":"name","properties":{"name":"EPSG:2154"}},"features":[]}"#;
        let fetcher = MemFetcher::new()
            .with(layers[0].source.clone(), wgs84.to_vec())
            .with(layers[1].source.clone(), lambert93.to_vec());

        let set = LayerAggregator::new(&fetcher).aggregate(&layers);
        assert_eq!(set.failed_layers().collect::<Vec<_>>(), ["b"]);
        assert!(matches!(set.failures[0].error, Error::SchemaMismatch { .. }));
    }

    #[test]
    fn no_layers_is_an_empty_complete_set() {
        let fetcher = MemFetcher::new();
        let set = LayerAggregator::new(&fetcher).aggregate(&[]);
        assert!(set.table.is_empty());
        assert!(set.is_complete());
    }
}
