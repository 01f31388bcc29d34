use std::{collections::BTreeMap, fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

/// Where a dataset's raw bytes come from. Sources are fixed by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Unauthenticated GET of `url` with `params` appended as the query string.
    Http {
        url: String,
        #[serde(default)]
        params: BTreeMap<String, String>,
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
    /// Local file (offline data path).
    File(PathBuf),
}

impl Source {
    pub fn http(url: impl Into<String>) -> Self {
        Source::Http { url: url.into(), params: BTreeMap::new(), headers: BTreeMap::new() }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self { Source::File(path.into()) }

    /// Add a query parameter (no-op for file sources).
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Source::Http { params, .. } = &mut self {
            params.insert(key.into(), value.into());
        }
        self
    }

    /// Add a request header (no-op for file sources).
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Source::Http { headers, .. } = &mut self {
            headers.insert(key.into(), value.into());
        }
        self
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Http { url, params, .. } => {
                f.write_str(url)?;
                // TYPENAMES distinguishes WFS layers sharing one endpoint
                match params.get("TYPENAMES") {
                    Some(layer) => write!(f, " [{layer}]"),
                    None => Ok(()),
                }
            }
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Payload encoding of a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Format {
    /// GeoJSON FeatureCollection.
    GeoJson,
    /// `{"data": [...]}` rows with coordinate fields.
    Tabular { lon: String, lat: String },
}
