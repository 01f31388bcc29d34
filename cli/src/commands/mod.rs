pub mod export;
pub mod summary;
pub mod table;

use std::{fs::File, io::Write, path::Path};

use anyhow::{Context, Result};

/// Open `path` for writing, or stdout when no path is given.
pub(crate) fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("create {}", path.display()))?
        ),
        None => Box::new(std::io::stdout().lock()),
    })
}
