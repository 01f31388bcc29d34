use anyhow::Result;
use baiemap::{Catalog, Dataset};

/// Record counts per dataset, in presentation order. Single-source failures abort.
pub fn run(catalog: &Catalog) -> Result<()> {
    for dataset in Dataset::ALL {
        match dataset {
            Dataset::Znieff => {
                let set = catalog.fetch_znieff_layers()?;
                println!("{dataset}: {} records", set.table.len());
                for failure in &set.failures {
                    println!("  failed layer {}: {}", failure.layer, failure.error);
                }
            }
            _ => {
                let table = catalog.table(dataset)?;
                match table.bounds() {
                    Some(b) => println!(
                        "{dataset}: {} records, bounds [{:.4}, {:.4}, {:.4}, {:.4}]",
                        table.len(), b.min().x, b.min().y, b.max().x, b.max().y
                    ),
                    None => println!("{dataset}: 0 records"),
                }
            }
        }
    }
    Ok(())
}
