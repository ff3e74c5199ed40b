use super::ArtifactStore;
use crate::error::{AssemblyError, Result};
use ndarray::ArrayView2;
use shared::image_proc::io::write_primary_image;
use std::path::{Path, PathBuf};

/// Writes mosaics as primary images of FITS files in one directory.
#[derive(Debug, Clone)]
pub struct FitsArtifactStore {
    dir: PathBuf,
}

impl FitsArtifactStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl ArtifactStore for FitsArtifactStore {
    fn exists(&self, name: &str) -> bool {
        self.path_of(name).exists()
    }

    fn write(&self, name: &str, image: &ArrayView2<f64>) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|source| AssemblyError::Io {
            context: format!("Failed to create directory {}", self.dir.display()),
            source,
        })?;
        write_primary_image(self.path_of(name), image)?;
        Ok(())
    }
}
