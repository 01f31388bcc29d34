use std::collections::HashMap;

use geo::{BoundingRect, Coord, Geometry, Rect};

use crate::error::{Error, Result};
use super::{crs::Crs, value::Value};

/// One feature: a value per table column plus exactly one geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<Value>,
    geometry: Geometry<f64>,
}

impl Record {
    pub fn new(values: Vec<Value>, geometry: Geometry<f64>) -> Self { Self { values, geometry } }

    pub fn values(&self) -> &[Value] { &self.values }

    pub fn geometry(&self) -> &Geometry<f64> { &self.geometry }
}

/// An immutable geographic table: ordered records sharing one schema, in one CRS.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTable {
    columns: Vec<String>,
    records: Vec<Record>,
    crs: Crs,
}

impl Default for GeoTable {
    fn default() -> Self { Self::empty() }
}

impl GeoTable {
    /// Table with no columns and no records, in EPSG:4326.
    pub fn empty() -> Self {
        Self { columns: Vec::new(), records: Vec::new(), crs: Crs::WGS84 }
    }

    /// Build a table, checking that column names are unique and every record matches the schema.
    pub fn new(columns: Vec<String>, records: Vec<Record>, crs: Crs) -> Result<Self> {
        let mut seen = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if let Some(prev) = seen.insert(name.as_str(), i) {
                return Err(Error::parse(format!("duplicate column {name:?} at positions {prev} and {i}")));
            }
        }
        if let Some((row, record)) = records.iter().enumerate().find(|(_, r)| r.values.len() != columns.len()) {
            return Err(Error::parse(format!(
                "record {row} has {} values for {} columns", record.values.len(), columns.len()
            )));
        }
        Ok(Self { columns, records, crs })
    }

    pub fn columns(&self) -> &[String] { &self.columns }

    pub fn records(&self) -> &[Record] { &self.records }

    pub fn crs(&self) -> Crs { self.crs }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at (`row`, `column`), if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.records.get(row).map(|r| &r.values[idx])
    }

    /// All values of one column, in record order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.records.iter().map(move |r| &r.values[idx]))
    }

    /// Bounding box of all geometries, or `None` for an empty table.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.records.iter()
            .filter_map(|r| r.geometry.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            ))
    }

    /// Concatenate tables into one with the union of their schemas (first-seen order).
    /// Values missing from a table's schema are filled with `Null`. All tables must share a CRS.
    pub fn concat(tables: impl IntoIterator<Item = GeoTable>) -> Result<GeoTable> {
        let mut tables = tables.into_iter().peekable();
        let Some(crs) = tables.peek().map(|t| t.crs) else { return Ok(GeoTable::empty()) };

        let mut builder = TableBuilder::new();
        for table in tables {
            if table.crs != crs {
                return Err(Error::SchemaMismatch {
                    expected: format!("tables in {crs}"),
                    found: format!("table in {}", table.crs),
                });
            }
            let GeoTable { columns, records, .. } = table;
            for record in records {
                let Record { values, geometry } = record;
                builder.push(columns.iter().cloned().zip(values), geometry);
            }
        }
        builder.finish(crs)
    }

    /// Copy of this table with a trailing constant column `name` (replacing any existing one).
    pub(crate) fn with_constant(self, name: &str, value: Value) -> GeoTable {
        let GeoTable { mut columns, mut records, crs } = self;
        let existing = columns.iter().position(|c| c == name);
        match existing {
            Some(idx) => records.iter_mut().for_each(|r| r.values[idx] = value.clone()),
            None => {
                columns.push(name.to_string());
                records.iter_mut().for_each(|r| r.values.push(value.clone()));
            }
        }
        GeoTable { columns, records, crs }
    }
}

/// Accumulates records whose property sets differ, building the union schema as it goes.
#[derive(Debug, Default)]
pub(crate) struct TableBuilder {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<(Vec<Value>, Geometry<f64>)>,
}

impl TableBuilder {
    pub(crate) fn new() -> Self { Self::default() }

    pub(crate) fn push(&mut self, properties: impl IntoIterator<Item = (String, Value)>, geometry: Geometry<f64>) {
        let mut values = vec![Value::Null; self.columns.len()];
        for (key, value) in properties {
            let idx = match self.index.get(&key) {
                Some(&idx) => idx,
                None => {
                    let idx = self.columns.len();
                    self.columns.push(key.clone());
                    self.index.insert(key, idx);
                    idx
                }
            };
            if idx >= values.len() {
                values.resize(idx + 1, Value::Null);
            }
            values[idx] = value;
        }
        self.rows.push((values, geometry));
    }

    pub(crate) fn finish(self, crs: Crs) -> Result<GeoTable> {
        let width = self.columns.len();
        let records = self.rows.into_iter()
            .map(|(mut values, geometry)| {
                values.resize(width, Value::Null);
                Record { values, geometry }
            })
            .collect();
        GeoTable::new(self.columns, records, crs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, Point};

    fn pt(x: f64, y: f64) -> Geometry<f64> { Geometry::Point(point!(x: x, y: y)) }

    fn table(columns: &[&str], rows: Vec<(Vec<Value>, Geometry<f64>)>) -> GeoTable {
        let records = rows.into_iter().map(|(v, g)| Record::new(v, g)).collect();
        GeoTable::new(columns.iter().map(|c| c.to_string()).collect(), records, Crs::WGS84).unwrap()
    }

    #[test]
    fn builder_pads_missing_properties_with_null() {
        let mut builder = TableBuilder::new();
        builder.push([("a".to_string(), Value::Int(1))], pt(0.0, 0.0));
        builder.push([("b".to_string(), Value::Int(2))], pt(1.0, 1.0));
        let t = builder.finish(Crs::WGS84).unwrap();

        assert_eq!(t.columns(), ["a", "b"]);
        assert_eq!(t.records()[0].values(), [Value::Int(1), Value::Null]);
        assert_eq!(t.records()[1].values(), [Value::Null, Value::Int(2)]);
    }

    #[test]
    fn new_rejects_ragged_records() {
        let records = vec![Record::new(vec![Value::Null], pt(0.0, 0.0))];
        assert!(GeoTable::new(vec!["a".into(), "b".into()], records, Crs::WGS84).is_err());
        assert!(GeoTable::new(vec!["a".into(), "a".into()], Vec::new(), Crs::WGS84).is_err());
    }

    #[test]
    fn concat_unions_schemas_in_first_seen_order() {
        let t1 = table(&["nom", "x"], vec![(vec!["Erquy".into(), Value::Int(1)], pt(0.0, 0.0))]);
        let t2 = table(&["y", "nom"], vec![(vec![Value::Int(2), "Binic".into()], pt(1.0, 1.0))]);
        let t = GeoTable::concat([t1, t2]).unwrap();

        assert_eq!(t.columns(), ["nom", "x", "y"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(1, "nom"), Some(&Value::from("Binic")));
        assert_eq!(t.get(1, "x"), Some(&Value::Null));
    }

    #[test]
    fn concat_of_nothing_is_empty() {
        let t = GeoTable::concat(Vec::new()).unwrap();
        assert!(t.is_empty());
        assert!(t.columns().is_empty());
        assert_eq!(t.crs(), Crs::WGS84);
    }

    #[test]
    fn concat_rejects_mixed_crs() {
        let t1 = table(&["a"], vec![(vec![Value::Int(1)], pt(0.0, 0.0))]);
        let t2 = GeoTable::new(vec!["a".into()], Vec::new(), Crs::from_epsg(2154)).unwrap();
        assert!(matches!(GeoTable::concat([t1, t2]), Err(Error::SchemaMismatch { .. })));
    }

    #[test]
    fn with_constant_appends_or_overwrites() {
        let t = table(&["a"], vec![(vec![Value::Int(1)], pt(0.0, 0.0))]);
        let t = t.with_constant("layer", "znieff1".into());
        assert_eq!(t.columns(), ["a", "layer"]);
        let t = t.with_constant("layer", "znieff2".into());
        assert_eq!(t.columns(), ["a", "layer"]);
        assert_eq!(t.get(0, "layer"), Some(&Value::from("znieff2")));
    }

    #[test]
    fn bounds_cover_all_geometries() {
        let t = table(&[], vec![(vec![], pt(-2.8, 48.5)), (vec![], Geometry::Point(Point::new(-2.5, 48.7)))]);
        let rect = t.bounds().unwrap();
        assert_eq!(rect.min(), Coord { x: -2.8, y: 48.5 });
        assert_eq!(rect.max(), Coord { x: -2.5, y: 48.7 });
        assert!(GeoTable::empty().bounds().is_none());
    }
}
