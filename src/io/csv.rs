use std::io::Write;

use polars::prelude::*;

use crate::error::{Error, Result};
use crate::table::{GeoTable, Value};

impl GeoTable {
    /// Attribute columns as a polars DataFrame (geometry excluded).
    /// An empty `columns` slice selects every column.
    pub fn to_dataframe(&self, columns: &[&str]) -> Result<DataFrame> {
        let selected: Vec<(&str, &str)> = if columns.is_empty() {
            self.columns().iter().map(|c| (c.as_str(), c.as_str())).collect()
        } else {
            columns.iter().map(|c| (*c, *c)).collect()
        };
        self.to_labeled_dataframe(&selected)
    }

    /// Like [`GeoTable::to_dataframe`], with each `(column, header)` pair renaming its column.
    pub fn to_labeled_dataframe(&self, columns: &[(&str, &str)]) -> Result<DataFrame> {
        let columns = columns.iter().map(|(name, header)| {
            let values: Vec<&Value> = self.column(name)
                .ok_or_else(|| Error::Export(format!("no column {name:?} in table")))?
                .collect();
            Ok(to_column(header, &values))
        }).collect::<Result<Vec<Column>>>()?;

        Ok(DataFrame::new(columns)?)
    }
}

/// Pick the narrowest polars dtype that holds every non-null value: Int64, Float64, else String.
fn to_column(name: &str, values: &[&Value]) -> Column {
    let all_ints = values.iter().all(|v| matches!(v, Value::Null | Value::Int(_)));
    let all_numbers = values.iter().all(|v| matches!(v, Value::Null | Value::Int(_) | Value::Float(_)));

    if all_ints {
        let ints: Vec<Option<i64>> = values.iter()
            .map(|v| match v { Value::Int(i) => Some(*i), _ => None })
            .collect();
        Column::new(name.into(), ints)
    } else if all_numbers {
        let floats: Vec<Option<f64>> = values.iter().map(|v| v.as_f64()).collect();
        Column::new(name.into(), floats)
    } else {
        let texts: Vec<Option<String>> = values.iter()
            .map(|v| (!v.is_null()).then(|| v.to_string()))
            .collect();
        Column::new(name.into(), texts)
    }
}

/// Writes a DataFrame as CSV (with header) to `writer`.
pub fn write_csv<W: Write>(df: &mut DataFrame, writer: W) -> Result<()> {
    CsvWriter::new(writer)
        .include_header(true)
        .finish(df)?;
    Ok(())
}
