#![doc = "Baie de Saint-Brieuc geodata: fetch, normalize and cache the bay's public layers"]
mod aggregate;
mod cache;
mod catalog;
mod config;
mod error;
mod fetch;
pub mod io;
mod pipeline;
mod schema;
mod table;

#[doc(inline)]
pub use aggregate::{LayerAggregator, LayerFailure, LayerSet};

#[doc(inline)]
pub use cache::{Cache, Clock, ManualClock, SystemClock, DEFAULT_TTL};

#[doc(inline)]
pub use catalog::{Catalog, Dataset};

#[doc(inline)]
pub use config::{Config, DatasetConfig};

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use fetch::{Fetch, Fetcher, Format, MemFetcher, Source};

#[doc(inline)]
pub use pipeline::load_dataset;

#[doc(inline)]
pub use schema::{ColumnMapping, Normalizer, LAYER_COLUMN};

#[doc(inline)]
pub use table::{Crs, GeoTable, Record, Value};
