use std::{fmt, sync::LazyLock};

use regex::Regex;

/// Matches "EPSG:4326", "urn:ogc:def:crs:EPSG::4326" and "urn:ogc:def:crs:EPSG:6.6:4326".
static EPSG_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)EPSG:(?:[0-9.]*:)?(\d+)").expect("static regex")
});

/// Coordinate reference system, identified by its EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crs(u32);

impl Crs {
    /// Plain longitude/latitude (EPSG:4326).
    pub const WGS84: Crs = Crs(4326);

    pub fn from_epsg(code: u32) -> Self { Self(code) }

    pub fn epsg(&self) -> u32 { self.0 }

    /// Parse a CRS name as found in GeoJSON `crs` members or WFS responses.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.to_ascii_uppercase().ends_with("CRS84") {
            return Some(Self::WGS84);
        }
        EPSG_CODE.captures(name)
            .and_then(|caps| caps[1].parse().ok())
            .map(Self)
    }

    /// OGC URN form, as written back into GeoJSON.
    pub fn urn(&self) -> String { format!("urn:ogc:def:crs:EPSG::{}", self.0) }
}

impl Default for Crs {
    fn default() -> Self { Self::WGS84 }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "EPSG:{}", self.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_crs_spellings() {
        assert_eq!(Crs::from_name("EPSG:4326"), Some(Crs::WGS84));
        assert_eq!(Crs::from_name("urn:ogc:def:crs:EPSG::2154"), Some(Crs::from_epsg(2154)));
        assert_eq!(Crs::from_name("urn:ogc:def:crs:EPSG:6.6:3857"), Some(Crs::from_epsg(3857)));
        assert_eq!(Crs::from_name("urn:ogc:def:crs:OGC:1.3:CRS84"), Some(Crs::WGS84));
        assert_eq!(Crs::from_name("local"), None);
    }

    #[test]
    fn urn_round_trips() {
        let crs = Crs::from_epsg(2154);
        assert_eq!(Crs::from_name(&crs.urn()), Some(crs));
        assert_eq!(crs.to_string(), "EPSG:2154");
    }
}
