use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::table::{GeoTable, Record, Value};

/// Name of the column tagging each record with its originating layer.
pub const LAYER_COLUMN: &str = "layer";

/// One target column, and the upstream names it may be found under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub target: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ColumnMapping {
    pub fn new(target: &str, sources: &[&str]) -> Self {
        Self { target: target.to_string(), sources: sources.iter().map(|s| s.to_string()).collect() }
    }

    /// Whether `column` is this target or one of its source names (case-insensitive).
    fn accepts(&self, column: &str) -> bool {
        self.target.eq_ignore_ascii_case(column)
            || self.sources.iter().any(|s| s.eq_ignore_ascii_case(column))
    }
}

/// Maps a fetched table onto a fixed target schema by column name.
///
/// The source schema must have exactly as many attribute columns as the mapping
/// (a pre-existing `layer` column is not counted), and every target must resolve
/// to one of them. Drift in the upstream schema fails with `SchemaMismatch` instead
/// of silently reassigning values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Normalizer {
    columns: Vec<ColumnMapping>,
}

impl Normalizer {
    pub fn new(columns: Vec<ColumnMapping>) -> Self { Self { columns } }

    /// Target column names, in output order.
    pub fn targets(&self) -> impl Iterator<Item = &str> { self.columns.iter().map(|c| c.target.as_str()) }

    /// Re-map `table` to the target schema, optionally appending a constant `layer` column.
    pub fn normalize(&self, table: &GeoTable, layer: Option<&str>) -> Result<GeoTable> {
        let found: Vec<&str> = table.columns().iter()
            .map(String::as_str)
            .filter(|c| *c != LAYER_COLUMN)
            .collect();

        if found.len() != self.columns.len() {
            return Err(Error::SchemaMismatch {
                expected: format!("{} columns ({})", self.columns.len(), self.targets().collect::<Vec<_>>().join(", ")),
                found: format!("{} columns ({})", found.len(), found.join(", ")),
            });
        }

        let positions = self.columns.iter().map(|mapping| {
            // exact target name wins over aliases, so normalized tables map onto themselves
            table.column_index(&mapping.target)
                .or_else(|| table.columns().iter().position(|c| c != LAYER_COLUMN && mapping.accepts(c)))
                .ok_or_else(|| Error::SchemaMismatch {
                    expected: format!("column {:?}", mapping.target),
                    found: format!("columns ({})", found.join(", ")),
                })
        }).collect::<Result<Vec<usize>>>()?;

        // two targets resolving to one upstream column would drop another one
        for (i, &pos) in positions.iter().enumerate() {
            if let Some(j) = positions[..i].iter().position(|&p| p == pos) {
                return Err(Error::SchemaMismatch {
                    expected: format!("distinct columns for {:?} and {:?}", self.columns[j].target, self.columns[i].target),
                    found: format!("both resolve to {:?}", table.columns()[pos]),
                });
            }
        }

        shadows_layer(table, layer);
        let records = table.records().iter().map(|record| {
            let values = positions.iter().map(|&i| record.values()[i].clone()).collect();
            Record::new(values, record.geometry().clone())
        }).collect();

        let columns = self.columns.iter().map(|c| c.target.clone()).collect();
        let normalized = GeoTable::new(columns, records, table.crs())?;

        Ok(match layer {
            Some(layer) => normalized.with_constant(LAYER_COLUMN, Value::from(layer)),
            None => normalized,
        })
    }
}

/// Whether tagging `table` with `layer` (or normalizing it untagged) discards an existing
/// `layer` column holding other values. Logged as a warning when it does.
pub(crate) fn shadows_layer(table: &GeoTable, layer: Option<&str>) -> bool {
    let Some(idx) = table.column_index(LAYER_COLUMN) else { return false };
    let shadowed = table.records().iter().any(|r| match (&r.values()[idx], layer) {
        (Value::Null, None) => false,
        (value, Some(tag)) => value.as_str() != Some(tag),
        (_, None) => true,
    });
    if shadowed {
        warn!(tag = layer.unwrap_or_default(), "upstream `layer` column is replaced");
    }
    shadowed
}
