//! Focal-plane assembly from per-CCD component planes.
//!
//! A build selects one component plane from every sensor, optionally
//! block-averages it, and copies it into a NaN-filled canvas at the offset
//! given by the sensor's DETSEC. Once all sensors are placed the NaN frame
//! around the mosaic is cropped.
//!
//! The canvas is allocated from the first sensor placed: each axis holds
//! `(tiles + 1)` times the shorter side of that sensor's (reduced) plane.
//! Builds are strictly sequential and each owns its canvas.

use crate::error::{AssemblyError, Result};
use crate::sensor::{SensorFrame, SensorMetadataTable};
use ndarray::{s, Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use shared::image_proc::{remove_border, Reduction};
use std::collections::HashSet;
use tracing::{debug, info};

/// Value of canvas cells no sensor has written.
pub const UNSET: f64 = f64::NAN;

/// Parameters of a single focal-plane build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildParams {
    /// Index along the leading (component) axis of each sensor stack.
    pub component: usize,
    pub reduction: Reduction,
    /// Times the shorter sensor side fits along the first mosaic axis.
    pub tiles_dim0: usize,
    /// Times the shorter sensor side fits along the second mosaic axis.
    pub tiles_dim1: usize,
}

impl BuildParams {
    pub fn new(
        component: usize,
        reduction: Reduction,
        tiles_dim0: usize,
        tiles_dim1: usize,
    ) -> Self {
        Self {
            component,
            reduction,
            tiles_dim0,
            tiles_dim1,
        }
    }

    /// Canvas shape for a first plane of `plane_shape`, one tile of margin
    /// added on each axis.
    ///
    /// # Errors
    /// `CanvasTooLarge` when either side or the cell count overflows.
    pub fn canvas_shape(&self, plane_shape: (usize, usize)) -> Result<(usize, usize)> {
        let short_side = plane_shape.0.min(plane_shape.1);
        let side = |tiles: usize| tiles.checked_add(1)?.checked_mul(short_side);

        match (side(self.tiles_dim0), side(self.tiles_dim1)) {
            (Some(rows), Some(cols))
                if rows
                    .checked_mul(cols)
                    .is_some_and(|cells| cells <= isize::MAX as usize) =>
            {
                Ok((rows, cols))
            }
            _ => Err(AssemblyError::CanvasTooLarge {
                tiles_dim0: self.tiles_dim0,
                tiles_dim1: self.tiles_dim1,
                short_side,
            }),
        }
    }
}

/// Where one sensor plane landed on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub ccdnum: i64,
    pub row_offset: usize,
    pub col_offset: usize,
    pub rows: usize,
    pub cols: usize,
}

/// The cropped mosaic of one component.
#[derive(Debug, Clone)]
pub struct TrimmedMosaic {
    pub component: usize,
    pub data: Array2<f64>,
    pub placements: Vec<Placement>,
}

/// Incremental focal-plane build over a metadata table.
///
/// Sensors are placed in the order [`FocalPlaneBuilder::place`] is called.
/// Any error leaves the builder unusable for producing a mosaic; callers
/// drop it and report the error.
pub struct FocalPlaneBuilder<'a> {
    table: &'a SensorMetadataTable,
    params: BuildParams,
    canvas: Option<Array2<f64>>,
    placements: Vec<Placement>,
    seen: HashSet<i64>,
}

impl<'a> FocalPlaneBuilder<'a> {
    /// Start a build. The table must carry a single DETSIZE.
    pub fn new(table: &'a SensorMetadataTable, params: BuildParams) -> Result<Self> {
        let detsize = table.detector_size()?;
        debug!(
            "Component {}: building over DETSIZE {} with {:?}",
            params.component, detsize, params.reduction
        );
        Ok(Self {
            table,
            params,
            canvas: None,
            placements: Vec::new(),
            seen: HashSet::new(),
        })
    }

    /// Canvas before cropping, once at least one sensor is placed.
    pub fn canvas(&self) -> Option<ArrayView2<'_, f64>> {
        self.canvas.as_ref().map(|c| c.view())
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Place one sensor's component plane on the canvas.
    ///
    /// A CCD may be placed only once per build.
    pub fn place(&mut self, frame: &SensorFrame) -> Result<Placement> {
        if !self.seen.insert(frame.ccdnum) {
            return Err(AssemblyError::DuplicateSensor {
                ccdnum: frame.ccdnum,
            });
        }

        let record = self.table.record(frame.ccdnum)?;
        let plane = frame.plane(self.params.component)?;
        let binned = self.params.reduction.apply(&plane);
        let (rows, cols) = binned.dim();

        let (row_offset, col_offset) = record
            .detector_section
            .offset(self.params.reduction.factor());

        let params = self.params;
        let canvas = match &mut self.canvas {
            Some(canvas) => canvas,
            slot => {
                let shape = params.canvas_shape((rows, cols))?;
                info!(
                    "Component {}: allocating {}x{} canvas from CCD {}",
                    params.component, shape.0, shape.1, frame.ccdnum
                );
                slot.insert(Array2::from_elem(shape, UNSET))
            }
        };

        let (canvas_rows, canvas_cols) = canvas.dim();
        let fits = |offset: i64, extent: usize, limit: usize| {
            offset >= 0 && (offset as usize).saturating_add(extent) <= limit
        };
        if !fits(row_offset, rows, canvas_rows) || !fits(col_offset, cols, canvas_cols) {
            return Err(AssemblyError::PlacementOutOfBounds {
                ccdnum: frame.ccdnum,
                row_offset,
                col_offset,
                rows,
                cols,
                canvas_rows,
                canvas_cols,
            });
        }

        let placement = Placement {
            ccdnum: frame.ccdnum,
            row_offset: row_offset as usize,
            col_offset: col_offset as usize,
            rows,
            cols,
        };
        canvas
            .slice_mut(s![
                placement.row_offset..placement.row_offset + rows,
                placement.col_offset..placement.col_offset + cols
            ])
            .assign(&binned);

        debug!(
            "Component {}: CCD {} placed at ({}, {}) as {}x{}",
            self.params.component,
            frame.ccdnum,
            placement.row_offset,
            placement.col_offset,
            rows,
            cols
        );
        self.placements.push(placement);
        Ok(placement)
    }

    /// Crop the NaN frame and hand back the mosaic.
    pub fn finish(self) -> Result<TrimmedMosaic> {
        let canvas = self.canvas.ok_or(AssemblyError::NoSensors)?;
        let data = remove_border(&canvas.view(), UNSET)?;
        info!(
            "Component {}: {} sensors assembled, mosaic cropped from {:?} to {:?}",
            self.params.component,
            self.placements.len(),
            canvas.dim(),
            data.dim()
        );
        Ok(TrimmedMosaic {
            component: self.params.component,
            data,
            placements: self.placements,
        })
    }
}

/// Assemble and crop the mosaic of one component from in-memory frames.
///
/// Frames are placed in iteration order. The first fatal error aborts the
/// build and no mosaic is returned.
pub fn assemble<'f, I>(
    frames: I,
    table: &SensorMetadataTable,
    params: BuildParams,
) -> Result<TrimmedMosaic>
where
    I: IntoIterator<Item = &'f SensorFrame>,
{
    let mut builder = FocalPlaneBuilder::new(table, params)?;
    for frame in frames {
        builder.place(frame)?;
    }
    builder.finish()
}
