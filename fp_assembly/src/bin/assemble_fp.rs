//! Assemble one focal-plane mosaic per component plane.
//!
//! Reads a list of per-CCD FITS stacks and a CSV info table giving each
//! CCD's detector section, then writes `<label>_PCA<n>_fp.fits` for every
//! component. Existing outputs are never overwritten.

use anyhow::{Context, Result};
use clap::Parser;
use fp_assembly::{
    pipeline::{DEFAULT_BIN_FACTOR, DEFAULT_NUM_COMPONENTS, DEFAULT_TILES_DIM0, DEFAULT_TILES_DIM1},
    read_path_list, run_components, AssemblyOptions, FitsArtifactStore, FitsSensorLoader,
    SensorMetadataTable, WriteOutcome,
};
use shared::image_proc::Reduction;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Assemble focal-plane mosaics from per-CCD component stacks"
)]
struct Args {
    #[arg(help = "Text file listing one sensor FITS path per line")]
    path_list: PathBuf,

    #[arg(help = "CSV table with CCDNUM, DETSIZE, DETSEC and DATASEC columns")]
    info_table: PathBuf,

    #[arg(
        long,
        default_value_t = DEFAULT_NUM_COMPONENTS,
        help = "Number of component planes to assemble"
    )]
    npca: usize,

    #[arg(
        long = "bin",
        default_value_t = DEFAULT_BIN_FACTOR,
        help = "Block-averaging factor, 0 disables reduction"
    )]
    bin_factor: usize,

    #[arg(long, help = "Label prefixing output names (random UUID if omitted)")]
    lab: Option<String>,

    #[arg(
        long,
        default_value_t = DEFAULT_TILES_DIM0,
        help = "Short sensor sides fitting along the first mosaic axis"
    )]
    n0: usize,

    #[arg(
        long,
        default_value_t = DEFAULT_TILES_DIM1,
        help = "Short sensor sides fitting along the second mosaic axis"
    )]
    n1: usize,

    #[arg(
        short = 'o',
        long,
        default_value = ".",
        help = "Directory receiving the assembled mosaics"
    )]
    output_dir: PathBuf,

    #[arg(short = 'j', long, help = "Worker threads (default: one per component)")]
    jobs: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let paths = read_path_list(&args.path_list)
        .with_context(|| format!("Failed to load path list {:?}", args.path_list))?;
    let table = SensorMetadataTable::from_csv_path(&args.info_table)
        .with_context(|| format!("Failed to load info table {:?}", args.info_table))?;
    info!(
        "{} sensor files, {} info table rows",
        paths.len(),
        table.len()
    );

    let options = AssemblyOptions {
        reduction: Reduction::from_factor(args.bin_factor),
        tiles_dim0: args.n0,
        tiles_dim1: args.n1,
        label: args.lab,
        num_components: args.npca,
        jobs: args.jobs,
    };
    let store = FitsArtifactStore::new(&args.output_dir);

    let outcomes = run_components(&paths, &table, &FitsSensorLoader, &store, &options)
        .context("Focal plane assembly failed")?;

    for outcome in &outcomes {
        match &outcome.write {
            WriteOutcome::Written(name) => info!(
                "Component {}: {} sensors, {}x{} mosaic written to {:?}",
                outcome.component,
                outcome.sensors,
                outcome.shape.0,
                outcome.shape.1,
                store.path_of(name)
            ),
            WriteOutcome::Skipped(name) => info!(
                "Component {}: kept existing {:?}",
                outcome.component,
                store.path_of(name)
            ),
        }
    }

    Ok(())
}
