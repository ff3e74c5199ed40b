use super::SensorLoader;
use crate::error::{AssemblyError, Result};
use crate::sensor::SensorFrame;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Loader serving frames registered in memory under fake paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    frames: HashMap<PathBuf, SensorFrame>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame<P: Into<PathBuf>>(mut self, path: P, frame: SensorFrame) -> Self {
        self.insert(path, frame);
        self
    }

    pub fn insert<P: Into<PathBuf>>(&mut self, path: P, frame: SensorFrame) {
        self.frames.insert(path.into(), frame);
    }
}

impl SensorLoader for MemoryLoader {
    fn load(&self, path: &Path) -> Result<SensorFrame> {
        self.frames
            .get(path)
            .cloned()
            .ok_or_else(|| AssemblyError::Io {
                context: format!("No frame registered at {}", path.display()),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }
}
