use std::path::{Path, PathBuf};

use clap::Parser;
use log::LevelFilter;

#[derive(Parser)]
#[command(
    name = "itp2ffxml",
    about = "Update an OpenMM force field XML file with parameters from GROMACS ITP files",
    version
)]
pub struct Cli {
    /// File containing the `[ atomtypes ]` section (defaults to --input-itp)
    #[arg(short, long = "atomtypes-itp", value_name = "FILE")]
    pub atomtypes_itp: Option<PathBuf>,

    /// ITP file containing `[ bonds ]`, `[ angles ]`, and `[ dihedrals ]`
    #[arg(short, long = "input-itp", value_name = "FILE")]
    pub input_itp: PathBuf,

    /// Force field XML to update
    #[arg(short = 'x', long = "input-xml", value_name = "FILE")]
    pub input_xml: PathBuf,

    /// Where to write the updated XML
    #[arg(short, long = "output-xml", value_name = "FILE")]
    pub output_xml: PathBuf,

    /// Write the XML without indentation
    #[arg(long)]
    pub compact: bool,

    /// Only report warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report each matched entry
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn atomtypes_path(&self) -> &Path {
        self.atomtypes_itp.as_deref().unwrap_or(&self.input_itp)
    }

    /// Used when `RUST_LOG` isn't set.
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Warn
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
