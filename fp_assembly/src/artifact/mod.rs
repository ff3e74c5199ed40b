//! Persisting assembled mosaics under component-specific names.
//!
//! A store never overwrites: an existing artifact with the same name is
//! reported as a warning and the write is skipped.

#[cfg(feature = "fits")]
pub mod fits;
pub mod memory;

use crate::assembler::TrimmedMosaic;
use crate::error::Result;
use ndarray::ArrayView2;
use tracing::{info, warn};

/// Artifact name of the mosaic for `component`, e.g. `run7_PCA2_fp.fits`.
pub fn artifact_name(label: &str, component: usize) -> String {
    format!("{label}_PCA{component}_fp.fits")
}

/// The caller's label, or a fresh UUID v4 when none was given.
pub fn resolve_label(label: Option<&str>) -> String {
    match label {
        Some(label) => label.to_string(),
        None => uuid::Uuid::new_v4().to_string(),
    }
}

/// Destination for finished mosaics.
pub trait ArtifactStore: Send + Sync {
    /// Whether an artifact called `name` is already present.
    fn exists(&self, name: &str) -> bool;

    /// Store `image` as `name`. Only called when `exists(name)` is false.
    fn write(&self, name: &str, image: &ArrayView2<f64>) -> Result<()>;
}

/// What happened to a mosaic handed to [`persist`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(String),
    Skipped(String),
}

impl WriteOutcome {
    pub fn name(&self) -> &str {
        match self {
            WriteOutcome::Written(name) | WriteOutcome::Skipped(name) => name,
        }
    }
}

/// Store `mosaic` under `<label>_PCA<component>_fp.fits` unless that name
/// is already taken.
pub fn persist<S: ArtifactStore + ?Sized>(
    store: &S,
    label: &str,
    mosaic: &TrimmedMosaic,
) -> Result<WriteOutcome> {
    let name = artifact_name(label, mosaic.component);
    if store.exists(&name) {
        warn!("File {} already exists. Not overwriting", name);
        return Ok(WriteOutcome::Skipped(name));
    }

    store.write(&name, &mosaic.data.view())?;
    info!("{} saved", name);
    Ok(WriteOutcome::Written(name))
}
