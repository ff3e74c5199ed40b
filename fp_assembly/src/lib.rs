//! Focal-plane mosaic assembly.
//!
//! Builds one mosaic per component plane from a set of per-CCD stacks,
//! placing each sensor at the detector section recorded for it in an info
//! table, then crops the unset frame around the result.

pub mod artifact;
pub mod assembler;
pub mod error;
#[cfg(feature = "fits")]
pub mod header;
pub mod loader;
pub mod pipeline;
pub mod sensor;

pub use artifact::memory::MemoryArtifactStore;
pub use artifact::{artifact_name, persist, resolve_label, ArtifactStore, WriteOutcome};
pub use assembler::{assemble, BuildParams, FocalPlaneBuilder, Placement, TrimmedMosaic};
pub use error::{AssemblyError, Result};
pub use loader::memory::MemoryLoader;
pub use loader::{parse_path_list, read_path_list, SensorLoader};
pub use pipeline::{build_component, run_components, AssemblyOptions, ComponentOutcome};
pub use sensor::{InfoRow, SensorFrame, SensorMetadataTable, SensorRecord};

#[cfg(feature = "fits")]
pub use artifact::fits::FitsArtifactStore;
#[cfg(feature = "fits")]
pub use loader::fits::FitsSensorLoader;
