//! Block-mean rebinning of 2D arrays.
//!
//! Sensor planes are reduced by averaging square blocks of pixels before
//! they are placed on the focal plane. The reduction is described once per
//! build by [`Reduction`] and applied to every plane.

use ndarray::{s, Array2, ArrayView2, Zip};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while rebinning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RebinError {
    #[error("Target shape {target:?} is larger than input shape {actual:?}")]
    TargetLargerThanSource {
        actual: (usize, usize),
        target: (usize, usize),
    },
}

/// Rebin `arr` to `new_shape` by averaging rectangular blocks.
///
/// The block size is `(rows / new_rows, cols / new_cols)` with floor
/// division; trailing rows and columns that do not fill a whole block are
/// dropped. NaN values inside a block propagate to its output cell.
///
/// # Errors
/// `RebinError::TargetLargerThanSource` when either target dimension exceeds
/// the source dimension, since no block would contain any pixel.
pub fn rebin_mean(
    arr: &ArrayView2<f64>,
    new_shape: (usize, usize),
) -> Result<Array2<f64>, RebinError> {
    let (rows, cols) = arr.dim();
    let (new_rows, new_cols) = new_shape;

    if new_rows > rows || new_cols > cols {
        return Err(RebinError::TargetLargerThanSource {
            actual: (rows, cols),
            target: new_shape,
        });
    }

    if new_rows == 0 || new_cols == 0 {
        return Ok(Array2::zeros(new_shape));
    }

    Ok(block_mean(arr, (rows / new_rows, cols / new_cols)))
}

/// Average non-overlapping `block` tiles; a partial trailing tile is dropped.
///
/// `block` must be non-zero on both axes.
fn block_mean(arr: &ArrayView2<f64>, block: (usize, usize)) -> Array2<f64> {
    let (rows, cols) = arr.dim();
    let out_shape = (rows / block.0, cols / block.1);
    let usable = arr.slice(s![..out_shape.0 * block.0, ..out_shape.1 * block.1]);

    let mut out = Array2::zeros(out_shape);
    Zip::from(&mut out)
        .and(usable.exact_chunks(block))
        .for_each(|cell, chunk| {
            *cell = chunk.mean().unwrap_or(f64::NAN);
        });
    out
}

/// How sensor planes are reduced before placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// Planes are placed at native resolution.
    #[default]
    None,
    /// Planes are block-averaged by `k x k` pixels.
    By(NonZeroUsize),
}

impl Reduction {
    /// Build from a plain integer factor; `0` means no reduction.
    pub fn from_factor(factor: usize) -> Self {
        match NonZeroUsize::new(factor) {
            Some(k) => Reduction::By(k),
            None => Reduction::None,
        }
    }

    /// Divisor applied to detector coordinates (1 when not reducing).
    pub fn factor(&self) -> usize {
        match self {
            Reduction::None => 1,
            Reduction::By(k) => k.get(),
        }
    }

    /// Shape a `(rows, cols)` plane takes after reduction.
    pub fn reduced_shape(&self, shape: (usize, usize)) -> (usize, usize) {
        let k = self.factor();
        (shape.0 / k, shape.1 / k)
    }

    /// Reduce `plane`, or copy it unchanged when no reduction is set.
    ///
    /// A factor that does not divide both dimensions only logs a warning;
    /// the remainder rows/columns are dropped.
    pub fn apply(&self, plane: &ArrayView2<f64>) -> Array2<f64> {
        match self {
            Reduction::None => plane.to_owned(),
            Reduction::By(k) => {
                let (rows, cols) = plane.dim();
                let k = k.get();
                if rows % k != 0 || cols % k != 0 {
                    warn!(
                        "Plane dimensions {}x{} are not an integer multiple of the bin factor {}",
                        rows, cols, k
                    );
                }
                block_mean(plane, (k, k))
            }
        }
    }
}
