use std::path::PathBuf;

/// Baie de Saint-Brieuc map layers (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "baiemap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON config file overriding the default endpoints
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath, conflicts_with = "offline")]
    pub config: Option<PathBuf>,

    /// Read the local GeoJSON exports in this directory instead of the remote services
    #[arg(long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub offline: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Write a dataset as a GeoJSON FeatureCollection (map layer)
    Export(ExportArgs),

    /// Write attribute columns of a dataset as CSV (side table)
    Table(TableArgs),

    /// Print record counts for every dataset
    Summary,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum DatasetArg {
    Ports,
    Znieff,
    Natura2000,
    Windmills,
}

impl From<DatasetArg> for baiemap::Dataset {
    fn from(arg: DatasetArg) -> Self {
        match arg {
            DatasetArg::Ports => baiemap::Dataset::Ports,
            DatasetArg::Znieff => baiemap::Dataset::Znieff,
            DatasetArg::Natura2000 => baiemap::Dataset::Natura2000,
            DatasetArg::Windmills => baiemap::Dataset::Windmills,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    #[arg(value_enum)]
    pub dataset: DatasetArg,

    /// Output file, defaults to stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct TableArgs {
    #[arg(value_enum)]
    pub dataset: DatasetArg,

    /// Columns to include, e.g. COMMUNE,ACTIVITE (defaults per dataset)
    #[arg(short, long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Output file, defaults to stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}
