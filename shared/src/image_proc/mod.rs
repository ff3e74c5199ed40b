//! Array processing for focal-plane assembly.
//!
//! # Module Organization
//!
//! - **rebin**: block-mean downsampling and the per-build [`Reduction`] setting
//! - **border**: edge-inward cropping of the NaN frame around a mosaic
//! - **io**: FITS read/write of sensor cubes and mosaics (`fits` feature)

pub mod border;
#[cfg(feature = "fits")]
pub mod io;
pub mod rebin;

pub use border::{nan_border_bounds, remove_border, BorderError, CropBounds};
pub use rebin::{rebin_mean, Reduction, RebinError};
