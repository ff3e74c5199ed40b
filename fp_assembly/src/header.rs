//! DATASEC stamping on copies of sensor files.

use crate::error::{AssemblyError, Result};
use crate::loader::fits::CCDNUM_KEY;
use crate::sensor::SensorMetadataTable;
use shared::image_proc::io::{read_primary_int_key, write_primary_str_key};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DATASEC_KEY: &str = "DATASEC";

/// Path of the copy made for `source`: `copy_<name>` next to the source,
/// or inside `out_dir` when given.
pub fn copy_path(source: &Path, out_dir: Option<&Path>) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => source.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    dir.join(format!("copy_{name}"))
}

/// Copy `source` and write the sensor's DATASEC from `table` into the
/// copy's primary header. The source file is left untouched.
pub fn stamp_datasec(
    source: &Path,
    table: &SensorMetadataTable,
    out_dir: Option<&Path>,
) -> Result<PathBuf> {
    let target = copy_path(source, out_dir);
    std::fs::copy(source, &target).map_err(|e| AssemblyError::Io {
        context: format!(
            "Failed to copy {} to {}",
            source.display(),
            target.display()
        ),
        source: e,
    })?;

    let ccdnum = read_primary_int_key(&target, CCDNUM_KEY)?;
    let row = table.row(ccdnum)?;
    write_primary_str_key(&target, DATASEC_KEY, &row.datasec)?;

    info!("{} successfully changed", target.display());
    Ok(target)
}
