use std::io::Write;

use anyhow::{Context, Result};
use baiemap::{io::write_geojson_bytes, Catalog, Dataset};

use crate::cli::ExportArgs;
use super::open_output;

pub fn run(catalog: &Catalog, args: &ExportArgs) -> Result<()> {
    let dataset = Dataset::from(args.dataset);
    let table = catalog.table(dataset)
        .with_context(|| format!("fetching {dataset}"))?;

    let bytes = write_geojson_bytes(&table)?;
    let mut out = open_output(args.output.as_deref())?;
    out.write_all(&bytes)?;
    out.flush()?;

    tracing::info!(%dataset, records = table.len(), "exported GeoJSON");
    Ok(())
}
