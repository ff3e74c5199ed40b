use super::ArtifactStore;
use crate::error::Result;
use ndarray::{Array2, ArrayView2};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Artifact store that keeps mosaics in memory, keyed by name.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    artifacts: Mutex<HashMap<String, Array2<f64>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate `name`, e.g. to simulate an artifact from an earlier run.
    pub fn with_artifact(self, name: &str, image: Array2<f64>) -> Self {
        self.lock().insert(name.to_string(), image);
        self
    }

    pub fn get(&self, name: &str) -> Option<Array2<f64>> {
        self.lock().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Array2<f64>>> {
        self.artifacts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn exists(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    fn write(&self, name: &str, image: &ArrayView2<f64>) -> Result<()> {
        self.lock().insert(name.to_string(), image.to_owned());
        Ok(())
    }
}
