use super::SensorLoader;
use crate::error::Result;
use crate::sensor::SensorFrame;
use shared::image_proc::io::{read_primary_image, read_primary_int_key};
use std::path::Path;
use tracing::debug;

/// Header keyword carrying the sensor identifier.
pub const CCDNUM_KEY: &str = "CCDNUM";

/// Reads the primary HDU image and its CCDNUM keyword.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitsSensorLoader;

impl SensorLoader for FitsSensorLoader {
    fn load(&self, path: &Path) -> Result<SensorFrame> {
        let ccdnum = read_primary_int_key(path, CCDNUM_KEY)?;
        let data = read_primary_image(path)?;
        debug!(
            "Loaded CCD {} from {} with shape {:?}",
            ccdnum,
            path.display(),
            data.shape()
        );
        Ok(SensorFrame::new(ccdnum, data))
    }
}
