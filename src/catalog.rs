use std::{fmt, sync::Arc};

use crate::aggregate::{LayerAggregator, LayerSet};
use crate::cache::{Cache, Clock, SystemClock};
use crate::config::{Config, DatasetConfig};
use crate::error::Result;
use crate::fetch::{Fetch, Fetcher};
use crate::pipeline::load_dataset;
use crate::table::GeoTable;

/// The datasets served by a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Ports,
    Znieff,
    Natura2000,
    Windmills,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [Dataset::Ports, Dataset::Znieff, Dataset::Natura2000, Dataset::Windmills];

    /// Cache key and display name.
    pub fn key(&self) -> &'static str {
        match self {
            Dataset::Ports => "ports",
            Dataset::Znieff => "znieff",
            Dataset::Natura2000 => "natura2000",
            Dataset::Windmills => "windmills",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.key()) }
}

/// Cached accessors for the bay's datasets.
///
/// Ports, Natura 2000 and windmills are single sources: any failure is returned
/// to the caller. ZNIEFF is aggregated from sub-layers and reports failed
/// sub-layers in its [`LayerSet`] instead of failing.
pub struct Catalog {
    config: Config,
    fetcher: Arc<dyn Fetch>,
    tables: Cache<Arc<GeoTable>>,
    layers: Cache<Arc<LayerSet>>,
}

impl Catalog {
    pub fn new(config: Config, fetcher: Arc<dyn Fetch>, clock: Arc<dyn Clock>) -> Self {
        let ttl = config.ttl();
        Self {
            config,
            fetcher,
            tables: Cache::new(ttl, clock.clone()),
            layers: Cache::new(ttl, clock),
        }
    }

    /// Catalog over the network (or local files) with wall-clock expiry.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::new(&config.user_agent, config.timeout())?;
        Ok(Self::new(config, Arc::new(fetcher), Arc::new(SystemClock)))
    }

    pub fn config(&self) -> &Config { &self.config }

    pub fn fetch_ports(&self) -> Result<Arc<GeoTable>> {
        self.single(Dataset::Ports, &self.config.ports)
    }

    pub fn fetch_znieff_layers(&self) -> Result<Arc<LayerSet>> {
        self.layers.get_or_try_insert_with(Dataset::Znieff.key(), || {
            Ok(Arc::new(LayerAggregator::new(self.fetcher.as_ref()).aggregate(&self.config.znieff)))
        })
    }

    pub fn fetch_natura2000(&self) -> Result<Arc<GeoTable>> {
        self.single(Dataset::Natura2000, &self.config.natura2000)
    }

    pub fn fetch_windmills(&self) -> Result<Arc<GeoTable>> {
        self.single(Dataset::Windmills, &self.config.windmills)
    }

    /// Table of any dataset; for ZNIEFF, the combined table of the loaded sub-layers.
    pub fn table(&self, dataset: Dataset) -> Result<Arc<GeoTable>> {
        match dataset {
            Dataset::Ports => self.fetch_ports(),
            Dataset::Znieff => Ok(self.fetch_znieff_layers()?.table.clone()),
            Dataset::Natura2000 => self.fetch_natura2000(),
            Dataset::Windmills => self.fetch_windmills(),
        }
    }

    fn single(&self, dataset: Dataset, config: &DatasetConfig) -> Result<Arc<GeoTable>> {
        self.tables.get_or_try_insert_with(dataset.key(), || {
            load_dataset(self.fetcher.as_ref(), config, false).map(Arc::new)
        })
    }
}
