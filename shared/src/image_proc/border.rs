//! Removal of the unset outer frame around an assembled mosaic.
//!
//! The focal-plane canvas is allocated larger than the sensors it holds and
//! pre-filled with NaN. Cropping scans each axis from both edges inward over
//! the rows and columns that are entirely NaN.

use ndarray::{s, Array2, ArrayView2, Axis};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while cropping a border.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BorderError {
    #[error("Border value {0} is not supported, only NaN borders can be removed")]
    UnsupportedBorderValue(f64),
}

/// Inclusive index bounds of the region kept along both axes.
///
/// `row_min > row_max` (or the column equivalent) means the axis is empty
/// after cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBounds {
    pub row_min: usize,
    pub row_max: usize,
    pub col_min: usize,
    pub col_max: usize,
}

impl CropBounds {
    /// Shape of the cropped array.
    pub fn shape(&self) -> (usize, usize) {
        (
            (self.row_max + 1).saturating_sub(self.row_min),
            (self.col_max + 1).saturating_sub(self.col_min),
        )
    }
}

/// Flags marking each index along `axis` whose lane is NaN everywhere.
fn all_nan_lanes(arr: &ArrayView2<f64>, axis: Axis) -> Vec<bool> {
    arr.axis_iter(axis)
        .map(|lane| lane.iter().all(|v| v.is_nan()))
        .collect()
}

/// Edge-inward scan over one axis, returning inclusive `(min, max)` cut indices.
///
/// The leading cut advances to index `i` while the first lane, lane `i` and
/// lane `i - 1` are all border lanes. The trailing cut retreats likewise
/// using lane `i + 1`. A side whose outermost lane carries data is never cut.
fn scan_axis(border: &[bool]) -> (usize, usize) {
    let n = border.len();
    if n == 0 {
        return (0, 0);
    }

    let mut min = 0;
    let mut i = 1;
    while i < n && border[0] && border[i] && border[i - 1] {
        min = i;
        i += 1;
    }

    let mut max = n - 1;
    if n >= 2 {
        let mut j = n - 2;
        while border[n - 1] && border[j] && border[j + 1] {
            max = j;
            if j == 0 {
                break;
            }
            j -= 1;
        }
    }

    (min, max)
}

/// Compute the crop bounds for a NaN border without copying.
pub fn nan_border_bounds(arr: &ArrayView2<f64>) -> CropBounds {
    let border_rows = all_nan_lanes(arr, Axis(0));
    let border_cols = all_nan_lanes(arr, Axis(1));

    let (row_min, row_max) = scan_axis(&border_rows);
    let (col_min, col_max) = scan_axis(&border_cols);

    CropBounds {
        row_min,
        row_max,
        col_min,
        col_max,
    }
}

/// Crop the outer frame of `border_value` cells from a 2D array.
///
/// Only NaN is accepted as `border_value`; any other value is rejected
/// rather than compared by equality.
///
/// Arrays with fewer than 9 cells are still processed, with a warning.
///
/// # Errors
/// `BorderError::UnsupportedBorderValue` when `border_value` is not NaN.
pub fn remove_border(
    arr: &ArrayView2<f64>,
    border_value: f64,
) -> Result<Array2<f64>, BorderError> {
    if !border_value.is_nan() {
        return Err(BorderError::UnsupportedBorderValue(border_value));
    }

    if arr.len() < 9 {
        warn!("Array has less than 9 pixels ({:?})", arr.dim());
    }
    if arr.is_empty() {
        return Ok(arr.to_owned());
    }

    let bounds = nan_border_bounds(arr);
    debug!(
        "Cropping {:?} to rows {}..={} cols {}..={}",
        arr.dim(),
        bounds.row_min,
        bounds.row_max,
        bounds.col_min,
        bounds.col_max
    );

    let (rows, cols) = bounds.shape();
    let cropped = arr.slice(s![
        bounds.row_min..bounds.row_min + rows,
        bounds.col_min..bounds.col_min + cols
    ]);
    Ok(cropped.to_owned())
}
