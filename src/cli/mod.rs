use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;
pub mod runner;

#[derive(Parser)]
#[command(name = "taxa")]
#[command(version, about = "Daily management fee calculator (BTG)")]
#[command(
    long_about = "Compute daily management fees per account from a BTG control spreadsheet and daily 'PL Total - DD.MM' files, and export the account x date report to Excel."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute daily fees from a control spreadsheet and PL files
    Compute {
        /// Control spreadsheet (.xlsx, rates on the second sheet)
        #[arg(short, long)]
        control: PathBuf,

        /// PL files named 'PL Total - DD.MM*.xlsx', processed in order
        pl_files: Vec<PathBuf>,

        /// Excel output path (defaults to the config export file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip writing the Excel report
        #[arg(long)]
        no_export: bool,

        /// Year for the PL file dates (defaults to TAXA_YEAR, config, then current year)
        #[arg(short, long)]
        year: Option<i32>,
    },
}
