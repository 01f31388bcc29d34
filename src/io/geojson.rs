use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};
use serde_json::{json, Map, Value as Json};

use crate::error::{Error, Result};
use crate::table::{Crs, GeoTable, TableBuilder, Value};

/// Read a GeoJSON FeatureCollection into a table.
/// The schema is the union of property keys in first-seen order; a feature-level `id`
/// becomes an `id` column unless the properties already carry one.
pub fn read_geojson(bytes: &[u8]) -> Result<GeoTable> {
    let root: Json = serde_json::from_slice(bytes)?;

    if root["type"].as_str() != Some("FeatureCollection") {
        return Err(Error::parse("expected a GeoJSON FeatureCollection"));
    }
    let features = root["features"].as_array()
        .ok_or_else(|| Error::parse("FeatureCollection has no features array"))?;

    let crs = match root["crs"]["properties"]["name"].as_str() {
        Some(name) => Crs::from_name(name)
            .ok_or_else(|| Error::parse(format!("unrecognized CRS {name:?}")))?,
        None => Crs::WGS84,
    };

    let mut builder = TableBuilder::new();
    for (idx, feature) in features.iter().enumerate() {
        let geometry = match &feature["geometry"] {
            Json::Null => return Err(Error::parse(format!("feature {idx} has no geometry"))),
            g => parse_geometry(g).map_err(|e| match e {
                Error::Parse(reason) => Error::parse(format!("feature {idx}: {reason}")),
                other => other,
            })?,
        };

        let properties = match &feature["properties"] {
            Json::Object(props) => Some(props),
            Json::Null => None,
            _ => return Err(Error::parse(format!("feature {idx} has non-object properties"))),
        };

        let mut row: Vec<(String, Value)> = Vec::new();
        if let Some(id) = feature.get("id") {
            if !properties.is_some_and(|p| p.contains_key("id")) {
                row.push(("id".to_string(), Value::from_json(id)));
            }
        }
        if let Some(props) = properties {
            row.extend(props.iter().map(|(k, v)| (k.clone(), Value::from_json(v))));
        }
        builder.push(row, geometry);
    }

    builder.finish(crs)
}

/// Write a table as a GeoJSON FeatureCollection.
pub fn write_geojson(table: &GeoTable) -> Result<Json> {
    let features: Vec<Json> = table.records().iter().map(|record| {
        let properties: Map<String, Json> = table.columns().iter()
            .zip(record.values())
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        json!({
            "type": "Feature",
            "geometry": geometry_to_geojson(record.geometry()),
            "properties": properties,
        })
    }).collect();

    let mut collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    if table.crs() != Crs::WGS84 {
        collection["crs"] = json!({ "type": "name", "properties": { "name": table.crs().urn() } });
    }
    Ok(collection)
}

/// Serialize a table to GeoJSON bytes.
pub fn write_geojson_bytes(table: &GeoTable) -> Result<Vec<u8>> {
    serde_json::to_vec(&write_geojson(table)?).map_err(|e| Error::Export(e.to_string()))
}

/// Parse a GeoJSON geometry object into a geo::Geometry.
fn parse_geometry(geometry: &Json) -> Result<Geometry<f64>> {
    let ty = geometry["type"].as_str()
        .ok_or_else(|| Error::parse("geometry has no type"))?;

    if ty == "GeometryCollection" {
        let members = geometry["geometries"].as_array()
            .ok_or_else(|| Error::parse("GeometryCollection has no geometries"))?;
        let geoms = members.iter().map(parse_geometry).collect::<Result<Vec<_>>>()?;
        return Ok(Geometry::GeometryCollection(GeometryCollection(geoms)));
    }

    let coords = &geometry["coordinates"];
    Ok(match ty {
        "Point" => Geometry::Point(Point(parse_position(coords)?)),
        "MultiPoint" => Geometry::MultiPoint(MultiPoint(
            array(coords)?.iter().map(|c| parse_position(c).map(Point)).collect::<Result<_>>()?
        )),
        "LineString" => Geometry::LineString(parse_line(coords)?),
        "MultiLineString" => Geometry::MultiLineString(MultiLineString(
            array(coords)?.iter().map(parse_line).collect::<Result<_>>()?
        )),
        "Polygon" => Geometry::Polygon(parse_polygon(coords)?),
        "MultiPolygon" => Geometry::MultiPolygon(MultiPolygon(
            array(coords)?.iter().map(parse_polygon).collect::<Result<_>>()?
        )),
        other => return Err(Error::parse(format!("unsupported geometry type {other:?}"))),
    })
}

fn array(value: &Json) -> Result<&Vec<Json>> {
    value.as_array().ok_or_else(|| Error::parse("coordinates must be an array"))
}

/// A position: [x, y] (extra ordinates such as elevation are ignored).
fn parse_position(value: &Json) -> Result<Coord<f64>> {
    let pos = array(value)?;
    let ordinate = |i: usize| pos.get(i).and_then(Json::as_f64)
        .ok_or_else(|| Error::parse("position must hold at least two numbers"));
    Ok(Coord { x: ordinate(0)?, y: ordinate(1)? })
}

fn parse_line(value: &Json) -> Result<LineString<f64>> {
    Ok(LineString(array(value)?.iter().map(parse_position).collect::<Result<_>>()?))
}

/// Polygon rings: exterior first, then holes. Rings are closed if the source left them open.
fn parse_polygon(value: &Json) -> Result<Polygon<f64>> {
    let mut rings = array(value)?.iter().map(parse_line);
    let exterior = rings.next()
        .ok_or_else(|| Error::parse("polygon has no exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn geometry_to_geojson(geometry: &Geometry<f64>) -> Json {
    fn pos(c: &Coord<f64>) -> Json { json!([c.x, c.y]) }
    fn line(ls: &LineString<f64>) -> Json { Json::Array(ls.coords().map(pos).collect()) }
    fn polygon(p: &Polygon<f64>) -> Json {
        Json::Array(std::iter::once(p.exterior()).chain(p.interiors()).map(line).collect())
    }

    match geometry {
        Geometry::Point(p) => json!({ "type": "Point", "coordinates": pos(&p.0) }),
        Geometry::MultiPoint(mp) => json!({
            "type": "MultiPoint",
            "coordinates": mp.0.iter().map(|p| pos(&p.0)).collect::<Vec<_>>(),
        }),
        Geometry::Line(l) => json!({ "type": "LineString", "coordinates": [pos(&l.start), pos(&l.end)] }),
        Geometry::LineString(ls) => json!({ "type": "LineString", "coordinates": line(ls) }),
        Geometry::MultiLineString(mls) => json!({
            "type": "MultiLineString",
            "coordinates": mls.0.iter().map(line).collect::<Vec<_>>(),
        }),
        Geometry::Polygon(p) => json!({ "type": "Polygon", "coordinates": polygon(p) }),
        Geometry::MultiPolygon(mp) => json!({
            "type": "MultiPolygon",
            "coordinates": mp.0.iter().map(polygon).collect::<Vec<_>>(),
        }),
        Geometry::Rect(r) => json!({ "type": "Polygon", "coordinates": polygon(&r.to_polygon()) }),
        Geometry::Triangle(t) => json!({ "type": "Polygon", "coordinates": polygon(&t.to_polygon()) }),
        Geometry::GeometryCollection(gc) => json!({
            "type": "GeometryCollection",
            "geometries": gc.0.iter().map(geometry_to_geojson).collect::<Vec<_>>(),
        }),
    }
}
