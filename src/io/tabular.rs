use geo::{Geometry, Point};
use serde_json::Value as Json;

use crate::error::{Error, Result};
use crate::table::{Crs, GeoTable, TableBuilder, Value};

/// Read a tabular REST payload (`{"data": [row, ...]}`) into a point table in EPSG:4326.
/// Every row field is kept as an attribute; `lon`/`lat` name the coordinate fields,
/// which may hold numbers or numeric strings.
pub fn read_points(bytes: &[u8], lon: &str, lat: &str) -> Result<GeoTable> {
    let root: Json = serde_json::from_slice(bytes)?;
    let rows = root["data"].as_array()
        .ok_or_else(|| Error::parse("tabular payload has no data array"))?;

    let mut builder = TableBuilder::new();
    for (idx, row) in rows.iter().enumerate() {
        let fields = row.as_object()
            .ok_or_else(|| Error::parse(format!("row {idx} is not an object")))?;

        let coordinate = |name: &str| fields.get(name)
            .map(Value::from_json)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| Error::parse(format!("row {idx} has no numeric {name}")));
        let point = Point::new(coordinate(lon)?, coordinate(lat)?);

        builder.push(
            fields.iter().map(|(k, v)| (k.clone(), Value::from_json(v))),
            Geometry::Point(point),
        );
    }

    builder.finish(Crs::WGS84)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_points_from_longitude_latitude() {
        let bytes = serde_json::to_vec(&json!({
            "data": [
                { "__id": 1, "COMMUNE": "Saint-Quay-Portrieux", "ACTIVITE": "Pêche", "LONGITUDE": -2.8183, "LATITUDE": 48.6495 },
                { "__id": 2, "COMMUNE": "Erquy", "ACTIVITE": "Pêche", "LONGITUDE": "-2.4661", "LATITUDE": "48.6330" },
            ],
            "links": {},
        })).unwrap();
        let t = read_points(&bytes, "LONGITUDE", "LATITUDE").unwrap();

        assert_eq!(t.len(), 2);
        assert_eq!(t.crs(), Crs::WGS84);
        assert_eq!(t.columns(), ["__id", "COMMUNE", "ACTIVITE", "LONGITUDE", "LATITUDE"]);
        assert_eq!(t.records()[1].geometry(), &Geometry::Point(Point::new(-2.4661, 48.6330)));
    }

    #[test]
    fn rejects_rows_without_coordinates() {
        let bytes = serde_json::to_vec(&json!({ "data": [ { "COMMUNE": "Binic", "LONGITUDE": null } ] })).unwrap();
        assert!(matches!(read_points(&bytes, "LONGITUDE", "LATITUDE"), Err(Error::Parse(_))));
    }

    #[test]
    fn rejects_payload_without_data() {
        let bytes = serde_json::to_vec(&json!({ "message": "not found" })).unwrap();
        assert!(matches!(read_points(&bytes, "LONGITUDE", "LATITUDE"), Err(Error::Parse(_))));
    }
}
