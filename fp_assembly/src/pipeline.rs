//! Per-component builds over a list of sensor files.
//!
//! Each component is an independent build: it loads every sensor in list
//! order, owns its canvas, and persists its mosaic through the store.
//! Components run concurrently on a rayon pool.

use crate::artifact::{persist, resolve_label, ArtifactStore, WriteOutcome};
use crate::assembler::{BuildParams, FocalPlaneBuilder};
use crate::error::Result;
use crate::loader::SensorLoader;
use crate::sensor::SensorMetadataTable;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use shared::image_proc::Reduction;
use std::path::PathBuf;
use tracing::{error, info};

/// Default number of component planes built per run.
pub const DEFAULT_NUM_COMPONENTS: usize = 4;
/// Default block-averaging factor.
pub const DEFAULT_BIN_FACTOR: usize = 4;
pub const DEFAULT_TILES_DIM0: usize = 14;
pub const DEFAULT_TILES_DIM1: usize = 12;

/// Parameters shared by every component build of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyOptions {
    pub reduction: Reduction,
    pub tiles_dim0: usize,
    pub tiles_dim1: usize,
    /// Artifact label; a UUID v4 is generated when unset.
    pub label: Option<String>,
    pub num_components: usize,
    /// Worker threads; defaults to one per component.
    pub jobs: Option<usize>,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            reduction: Reduction::from_factor(DEFAULT_BIN_FACTOR),
            tiles_dim0: DEFAULT_TILES_DIM0,
            tiles_dim1: DEFAULT_TILES_DIM1,
            label: None,
            num_components: DEFAULT_NUM_COMPONENTS,
            jobs: None,
        }
    }
}

impl AssemblyOptions {
    pub fn build_params(&self, component: usize) -> BuildParams {
        BuildParams::new(
            component,
            self.reduction,
            self.tiles_dim0,
            self.tiles_dim1,
        )
    }
}

/// Result of one component build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentOutcome {
    pub component: usize,
    pub shape: (usize, usize),
    pub sensors: usize,
    pub write: WriteOutcome,
}

/// Build and persist the mosaic of a single component.
///
/// Sensors are loaded one at a time in `paths` order. The first fatal
/// error aborts the build before anything is written.
pub fn build_component<L, S>(
    paths: &[PathBuf],
    table: &SensorMetadataTable,
    loader: &L,
    store: &S,
    label: &str,
    params: BuildParams,
) -> Result<ComponentOutcome>
where
    L: SensorLoader + ?Sized,
    S: ArtifactStore + ?Sized,
{
    let mut builder = FocalPlaneBuilder::new(table, params)?;
    for path in paths {
        let frame = loader.load(path)?;
        builder.place(&frame)?;
    }

    let mosaic = builder.finish()?;
    let write = persist(store, label, &mosaic)?;
    Ok(ComponentOutcome {
        component: mosaic.component,
        shape: mosaic.data.dim(),
        sensors: mosaic.placements.len(),
        write,
    })
}

/// Build components `0..num_components` in parallel.
///
/// Every build runs to completion or failure on its own; the outcomes are
/// returned in component order, or the first error encountered.
pub fn run_components<L, S>(
    paths: &[PathBuf],
    table: &SensorMetadataTable,
    loader: &L,
    store: &S,
    options: &AssemblyOptions,
) -> Result<Vec<ComponentOutcome>>
where
    L: SensorLoader + ?Sized,
    S: ArtifactStore + ?Sized,
{
    let label = resolve_label(options.label.as_deref());
    let threads = options.jobs.unwrap_or(options.num_components).max(1);
    info!(
        "Assembling {} components from {} sensors with label {} on {} threads",
        options.num_components,
        paths.len(),
        label,
        threads
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()?;

    let outcomes: Vec<Result<ComponentOutcome>> = pool.install(|| {
        (0..options.num_components)
            .into_par_iter()
            .map(|component| {
                let result = build_component(
                    paths,
                    table,
                    loader,
                    store,
                    &label,
                    options.build_params(component),
                );
                if let Err(e) = &result {
                    error!("Component {} failed: {}", component, e);
                }
                result
            })
            .collect()
    });

    outcomes.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::memory::MemoryArtifactStore;
    use crate::error::AssemblyError;
    use crate::loader::memory::MemoryLoader;
    use crate::sensor::{InfoRow, SensorFrame};
    use ndarray::Array3;

    fn table() -> SensorMetadataTable {
        SensorMetadataTable::from_rows(vec![
            InfoRow {
                ccdnum: 1,
                detsize: "[0:7,0:7]".to_string(),
                detsec: "[0:3,0:3]".to_string(),
                datasec: "[1:4,1:4]".to_string(),
            },
            InfoRow {
                ccdnum: 2,
                detsize: "[0:7,0:7]".to_string(),
                detsec: "[4:7,0:3]".to_string(),
                datasec: "[1:4,1:4]".to_string(),
            },
        ])
    }

    fn loader() -> MemoryLoader {
        let frame = |ccdnum: i64| {
            let base = (ccdnum * 10) as f64;
            let data = Array3::from_shape_fn((3, 4, 4), |(c, _, _)| base + c as f64);
            SensorFrame::new(ccdnum, data.into_dyn())
        };
        MemoryLoader::new()
            .with_frame("ccd1", frame(1))
            .with_frame("ccd2", frame(2))
    }

    fn options(num_components: usize) -> AssemblyOptions {
        AssemblyOptions {
            reduction: Reduction::None,
            tiles_dim0: 1,
            tiles_dim1: 1,
            label: Some("unit".to_string()),
            num_components,
            jobs: Some(2),
        }
    }

    #[test]
    fn test_default_options() {
        let options = AssemblyOptions::default();
        assert_eq!(options.reduction.factor(), 4);
        assert_eq!((options.tiles_dim0, options.tiles_dim1), (14, 12));
        assert_eq!(options.num_components, 4);
        assert!(options.label.is_none());
    }

    #[test]
    fn test_options_round_trip_through_json() {
        let options = options(2);
        let json = serde_json::to_string(&options).unwrap();
        let back: AssemblyOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }

    #[test]
    fn test_each_component_gets_its_own_artifact() {
        let paths = vec![PathBuf::from("ccd1"), PathBuf::from("ccd2")];
        let store = MemoryArtifactStore::new();

        let outcomes = run_components(&paths, &table(), &loader(), &store, &options(3)).unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(
            store.names(),
            vec!["unit_PCA0_fp.fits", "unit_PCA1_fp.fits", "unit_PCA2_fp.fits"]
        );
        for outcome in &outcomes {
            assert_eq!(outcome.sensors, 2);
            // Bottom half of the 8x8 canvas is unset; one NaN row survives the crop
            assert_eq!(outcome.shape, (5, 8));
            let image = store.get(outcome.write.name()).unwrap();
            assert_eq!(image[[0, 0]], 10.0 + outcome.component as f64);
            assert_eq!(image[[0, 4]], 20.0 + outcome.component as f64);
            assert!(image[[4, 0]].is_nan());
        }
    }

    #[test]
    fn test_failed_build_writes_nothing() {
        let paths = vec![PathBuf::from("ccd1"), PathBuf::from("ccd2")];
        let table = SensorMetadataTable::from_rows(vec![table().rows()[0].clone()]);
        let store = MemoryArtifactStore::new();

        let err = run_components(&paths, &table, &loader(), &store, &options(2)).unwrap_err();
        assert_eq!(err.ccdnum(), Some(2));
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_path_aborts_build() {
        let paths = vec![PathBuf::from("ccd1"), PathBuf::from("missing")];
        let store = MemoryArtifactStore::new();
        let params = options(1).build_params(0);
        let err = build_component(&paths, &table(), &loader(), &store, "unit", params).unwrap_err();
        assert!(matches!(err, AssemblyError::Io { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_existing_artifact_is_skipped() {
        let paths = vec![PathBuf::from("ccd1"), PathBuf::from("ccd2")];
        let store = MemoryArtifactStore::new()
            .with_artifact("unit_PCA0_fp.fits", ndarray::Array2::zeros((1, 1)));

        let outcomes = run_components(&paths, &table(), &loader(), &store, &options(1)).unwrap();
        assert!(matches!(outcomes[0].write, WriteOutcome::Skipped(_)));
        assert_eq!(store.get("unit_PCA0_fp.fits").unwrap().dim(), (1, 1));
    }
}
