use std::{collections::HashSet, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_TTL;
use crate::error::{Error, Result};
use crate::fetch::{Format, Source};
use crate::schema::{ColumnMapping, Normalizer};

const PORTS_URL: &str = "https://tabular-api.data.gouv.fr/api/resources/dbaeb515-cfd6-451c-86d2-0844a1b95a3a/data/";
const WFS_URL: &str = "https://geobretagne.fr/geoserver/dreal_b/wfs";
const WINDMILLS_URL: &str = "https://services2.arcgis.com/If7uF4q7Do2KTuHr/arcgis/rest/services/SBR_project_AM_pFRAsbr077_WTG_Layout_2022/FeatureServer/4/query";

/// Bay of Saint-Brieuc bounding box, in EPSG:4326.
const BBOX: &str = "-3.207907340894053,48.30790276106265,-2.228065745188843,48.971965337224646,EPSG:4326";

const ZNIEFF_LAYERS: [&str; 4] = ["dreal_b:znieff1", "dreal_b:znieff2", "dreal_b:znieff_mer_1", "dreal_b:znieff_mer_2"];
const NATURA2000_LAYER: &str = "dreal_b:ZSC";

/// One dataset (or sub-layer): where to fetch it, how to decode it, and how to rename its columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    pub source: Source,
    #[serde(default = "default_format")]
    pub format: Format,
    #[serde(default)]
    pub schema: Option<Normalizer>,
}

fn default_format() -> Format { Format::GeoJson }

impl DatasetConfig {
    fn new(name: &str, source: Source, format: Format, schema: Option<Normalizer>) -> Self {
        Self { name: name.to_string(), source, format, schema }
    }
}

/// Runtime configuration. Every field has a default pointing at the public endpoints,
/// so a config file only needs the fields it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache time-to-live, in seconds.
    pub ttl_secs: u64,
    pub user_agent: String,
    /// HTTP timeout in seconds; `None` keeps the transport default.
    pub timeout_secs: Option<u64>,
    pub ports: DatasetConfig,
    /// ZNIEFF sub-layers, aggregated into one table.
    pub znieff: Vec<DatasetConfig>,
    pub natura2000: DatasetConfig,
    pub windmills: DatasetConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL.as_secs(),
            user_agent: concat!("baiemap/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: None,
            ports: DatasetConfig::new(
                "ports",
                Source::http(PORTS_URL).header("accept", "application/json"),
                Format::Tabular { lon: "LONGITUDE".into(), lat: "LATITUDE".into() },
                None,
            ),
            znieff: ZNIEFF_LAYERS.iter()
                .map(|layer| DatasetConfig::new(layer, wfs_source(layer), Format::GeoJson, Some(znieff_schema())))
                .collect(),
            natura2000: DatasetConfig::new(
                NATURA2000_LAYER,
                wfs_source(NATURA2000_LAYER),
                Format::GeoJson,
                Some(natura2000_schema()),
            ),
            windmills: DatasetConfig::new(
                "windmills",
                Source::http(WINDMILLS_URL)
                    .param("where", "1=1")
                    .param("outFields", "*")
                    .param("f", "geojson"),
                Format::GeoJson,
                None,
            ),
        }
    }
}

impl Config {
    /// Read a JSON config file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Config = serde_json::from_slice(&bytes)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Local GeoJSON files in `dir` instead of the remote services.
    /// Ports, Natura 2000 and windmills use the legacy exports and are not renamed.
    pub fn offline(dir: &Path) -> Self {
        let file = |name: &str| Source::file(dir.join(name));
        let defaults = Self::default();
        Self {
            ports: DatasetConfig::new("ports", file("ports-departementaux-des-cotes-darmor.geojson"), Format::GeoJson, None),
            znieff: defaults.znieff.into_iter()
                .map(|layer| {
                    let stem = layer.name.rsplit(':').next().unwrap_or(&layer.name).to_string();
                    DatasetConfig { source: file(&format!("{stem}.geojson")), ..layer }
                })
                .collect(),
            natura2000: DatasetConfig::new(NATURA2000_LAYER, file("natura2000_zps.geojson"), Format::GeoJson, None),
            windmills: DatasetConfig::new("windmills", file("windmills.geojson"), Format::GeoJson, None),
            ..defaults
        }
    }

    pub fn ttl(&self) -> Duration { Duration::from_secs(self.ttl_secs) }

    pub fn timeout(&self) -> Option<Duration> { self.timeout_secs.map(Duration::from_secs) }

    pub fn validate(&self) -> Result<()> {
        if self.ttl_secs == 0 {
            return Err(Error::Config("ttl_secs must be positive".into()));
        }
        let mut names = HashSet::new();
        for layer in &self.znieff {
            if !names.insert(layer.name.as_str()) {
                return Err(Error::Config(format!("duplicate ZNIEFF layer {:?}", layer.name)));
            }
        }
        Ok(())
    }
}

fn wfs_source(layer: &str) -> Source {
    Source::http(WFS_URL)
        .param("SERVICE", "WFS")
        .param("VERSION", "2.0.0")
        .param("REQUEST", "GetFeature")
        .param("BBOX", BBOX)
        .param("OUTPUTFORMAT", "application/json")
        .param("TYPENAMES", layer)
}

fn znieff_schema() -> Normalizer {
    Normalizer::new(vec![
        ColumnMapping::new("id", &[]),
        ColumnMapping::new("fid", &["gid"]),
        ColumnMapping::new("id_mnhn", &["nm_sffzn"]),
        ColumnMapping::new("id_org", &["nm_regzn"]),
        ColumnMapping::new("nom", &["lb_zn"]),
        ColumnMapping::new("generation", &[]),
        ColumnMapping::new("url", &["url_fiche"]),
    ])
}

fn natura2000_schema() -> Normalizer {
    Normalizer::new(vec![
        ColumnMapping::new("id", &[]),
        ColumnMapping::new("code_europ", &["sitecode"]),
        ColumnMapping::new("nom", &["sitename"]),
        ColumnMapping::new("url", &[]),
        ColumnMapping::new("aamp_maia", &[]),
        ColumnMapping::new("statut", &[]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_public_endpoints() {
        let config = Config::default();
        assert_eq!(config.ttl(), Duration::from_secs(86_400));
        assert_eq!(config.timeout(), None);
        assert_eq!(config.znieff.len(), 4);
        assert_eq!(config.znieff[2].name, "dreal_b:znieff_mer_1");

        let Source::Http { params, .. } = &config.natura2000.source else { panic!("expected http source") };
        assert_eq!(params["TYPENAMES"], "dreal_b:ZSC");
        assert_eq!(params["VERSION"], "2.0.0");
        assert!(params["BBOX"].ends_with("EPSG:4326"));
    }

    #[test]
    fn partial_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baiemap.json");
        std::fs::write(&path, r#"{ "ttl_secs": 60, "timeout_secs": 10 }"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.ttl(), Duration::from_secs(60));
        assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.windmills, Config::default().windmills);
    }

    #[test]
    fn rejects_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baiemap.json");
        std::fs::write(&path, r#"{ "ttl_secs": 0 }"#).unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));

        std::fs::write(&path, "ttl_secs = 60").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
        assert!(matches!(Config::load(&dir.path().join("missing.json")), Err(Error::Config(_))));
    }

    #[test]
    fn offline_reads_local_exports() {
        let config = Config::offline(Path::new("data"));
        assert_eq!(config.windmills.source, Source::file("data/windmills.geojson"));
        assert_eq!(config.natura2000.source, Source::file("data/natura2000_zps.geojson"));
        assert_eq!(config.znieff[1].source, Source::file("data/znieff2.geojson"));
        assert!(config.znieff[1].schema.is_some());
        assert_eq!(config.ports.format, Format::GeoJson);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<Config>(&json).unwrap(), config);
    }
}
