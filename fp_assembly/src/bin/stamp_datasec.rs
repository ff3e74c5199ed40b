//! Write each sensor's DATASEC from the info table into a copy of its file.

use anyhow::{Context, Result};
use clap::Parser;
use fp_assembly::{header::stamp_datasec, SensorMetadataTable};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Copy sensor FITS files and stamp DATASEC from the info table"
)]
struct Args {
    #[arg(help = "CSV table with CCDNUM and DATASEC columns")]
    info_table: PathBuf,

    #[arg(required = true, help = "Sensor FITS files to copy and stamp")]
    files: Vec<PathBuf>,

    #[arg(
        short = 'o',
        long,
        help = "Directory for the copies (default: next to each source)"
    )]
    output_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let table = SensorMetadataTable::from_csv_path(&args.info_table)
        .with_context(|| format!("Failed to load info table {:?}", args.info_table))?;

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {dir:?}"))?;
    }

    for file in &args.files {
        let copy = stamp_datasec(file, &table, args.output_dir.as_deref())
            .with_context(|| format!("Failed to stamp DATASEC on {file:?}"))?;
        info!("{:?} -> {:?}", file, copy);
    }

    Ok(())
}
