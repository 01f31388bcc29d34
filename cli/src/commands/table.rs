use anyhow::{Context, Result};
use baiemap::{io::write_csv, Catalog, Dataset};

use crate::cli::TableArgs;
use super::open_output;

/// Columns shown in each dataset's side table when none are requested.
fn default_columns(dataset: Dataset, normalized: bool) -> &'static [&'static str] {
    match (dataset, normalized) {
        (Dataset::Ports, _) => &["COMMUNE", "ACTIVITE"],
        (Dataset::Natura2000, true) => &["nom", "code_europ"],
        (Dataset::Natura2000, false) => &["SITENAME", "SITECODE"],
        (Dataset::Znieff, _) => &["nom", "layer"],
        (Dataset::Windmills, _) => &["Turbine_Name"],
    }
}

/// "COMMUNE" -> "Commune", "code_europ" -> "Code_europ".
fn capitalize(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn run(catalog: &Catalog, args: &TableArgs) -> Result<()> {
    let dataset = Dataset::from(args.dataset);
    let table = catalog.table(dataset)
        .with_context(|| format!("fetching {dataset}"))?;

    // the legacy Natura 2000 export is not renamed and keeps its upstream columns
    let normalized = catalog.config().natura2000.schema.is_some();
    let columns: Vec<&str> = if args.columns.is_empty() {
        default_columns(dataset, normalized).to_vec()
    } else {
        args.columns.iter().map(String::as_str).collect()
    };

    let headers: Vec<String> = columns.iter().map(|c| capitalize(c)).collect();
    let labeled: Vec<(&str, &str)> = columns.iter().copied()
        .zip(headers.iter().map(String::as_str))
        .collect();

    let mut df = table.to_labeled_dataframe(&labeled)
        .with_context(|| format!("selecting columns of {dataset}"))?;
    write_csv(&mut df, open_output(args.output.as_deref())?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_like_the_side_tables() {
        assert_eq!(capitalize("COMMUNE"), "Commune");
        assert_eq!(capitalize("code_europ"), "Code_europ");
        assert_eq!(capitalize(""), "");
    }
}
