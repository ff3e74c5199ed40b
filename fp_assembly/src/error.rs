//! Error taxonomy for focal-plane builds.
//!
//! Every variant is fatal for the build that raised it: no mosaic is
//! produced or stored. Recoverable conditions are logged as warnings
//! instead and never surface here.

use shared::image_proc::BorderError;
use shared::SectionParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("Info table has {matches} entries for CCD {ccdnum}, expected exactly one")]
    MetadataCardinality { ccdnum: i64, matches: usize },

    #[error("Info table holds {} distinct DETSIZE values ({}), expected exactly one", .sizes.len(), .sizes.join(", "))]
    NonUniformDetectorSize { sizes: Vec<String> },

    #[error("CCD {ccdnum}: cannot parse {field} '{value}': {source}")]
    InvalidSection {
        ccdnum: i64,
        field: &'static str,
        value: String,
        #[source]
        source: SectionParseError,
    },

    #[error("CCD {ccdnum}: component {component} requested but the array has {available}")]
    ComponentOutOfRange {
        ccdnum: i64,
        component: usize,
        available: usize,
    },

    #[error("CCD {ccdnum}: array of rank {ndim} has no 2D plane to place")]
    InvalidRank { ccdnum: i64, ndim: usize },

    #[error(
        "CCD {ccdnum}: plane of {rows}x{cols} at offset ({row_offset}, {col_offset}) \
         does not fit the {canvas_rows}x{canvas_cols} canvas"
    )]
    PlacementOutOfBounds {
        ccdnum: i64,
        row_offset: i64,
        col_offset: i64,
        rows: usize,
        cols: usize,
        canvas_rows: usize,
        canvas_cols: usize,
    },

    #[error("CCD {ccdnum} appears more than once in the build")]
    DuplicateSensor { ccdnum: i64 },

    #[error(
        "Canvas of ({tiles_dim0} + 1) x ({tiles_dim1} + 1) tiles of side {short_side} \
         is too large to allocate"
    )]
    CanvasTooLarge {
        tiles_dim0: usize,
        tiles_dim1: usize,
        short_side: usize,
    },

    #[error("No sensors were supplied to the build")]
    NoSensors,

    #[error(transparent)]
    Border(#[from] BorderError),

    #[error("Failed to read info table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "fits")]
    #[error(transparent)]
    Fits(#[from] shared::image_proc::io::FitsError),
}

impl AssemblyError {
    /// Sensor identifier the failure is attributed to, if any.
    pub fn ccdnum(&self) -> Option<i64> {
        match self {
            AssemblyError::MetadataCardinality { ccdnum, .. }
            | AssemblyError::InvalidSection { ccdnum, .. }
            | AssemblyError::ComponentOutOfRange { ccdnum, .. }
            | AssemblyError::InvalidRank { ccdnum, .. }
            | AssemblyError::PlacementOutOfBounds { ccdnum, .. }
            | AssemblyError::DuplicateSensor { ccdnum } => Some(*ccdnum),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AssemblyError>;
