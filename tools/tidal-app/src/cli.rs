//! Command-line interface definitions for tidal.

use std::path::PathBuf;

use clap::Parser;

/// Splits a byte stream into delimited records through a fixed ring.
#[derive(Debug, Parser)]
#[command(name = "tidal", version, about)]
pub struct Cli {
    /// Configuration file (defaults to `tidal.toml` in the working directory, if present).
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Log level: fatal, error, warn, info, debug or trace.
    #[arg(long, short = 'l')]
    pub log_level: Option<String>,

    /// Input file to read; standard input when omitted.
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Ring capacity in elements (must be a power of two).
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Element size in bytes.
    #[arg(long)]
    pub elem_size: Option<usize>,
}
