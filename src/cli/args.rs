use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "airpy-db")]
#[command(about = "Converts per-station pollutant time series into an indexed SQLite database")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load every series file into the destination database and index it
    Convert {
        #[arg(short, long, help = "Input directory with the index and series files [default: pkl]")]
        input_dir: Option<PathBuf>,

        #[arg(short, long, help = "Destination SQLite database [default: airpy.db]")]
        database: Option<PathBuf>,

        #[arg(short, long, help = "Configuration file (TOML, JSON, ...)")]
        config: Option<PathBuf>,

        #[arg(long, help = "Timestamp index file name [default: index.{extension}]")]
        index_file: Option<String>,

        #[arg(short, long, help = "Series file extension [default: json]")]
        extension: Option<String>,

        #[arg(short, long, help = "Rows per INSERT statement [default: 1000]")]
        batch_size: Option<usize>,

        #[arg(long, help = "Also load annotations into data_meta")]
        meta: bool,

        #[arg(long, help = "Do not load the data table")]
        skip_data: bool,

        #[arg(long, help = "Do not build indices after loading")]
        no_indices: bool,

        #[arg(long, help = "Read series files through memory maps")]
        mmap: bool,

        #[arg(short, long, help = "Hide progress bars")]
        quiet: bool,
    },

    /// Scan an input directory and report what a conversion would load
    Inspect {
        #[arg(short, long, default_value = "pkl")]
        input_dir: PathBuf,

        #[arg(short, long, default_value = "json")]
        extension: String,

        #[arg(long)]
        index_file: Option<String>,
    },

    /// Display information about a converted database
    Info {
        #[arg(short, long, default_value = "airpy.db")]
        database: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}
