//! Per-CCD inputs: the metadata table, its parsed records and raw frames.

use crate::error::{AssemblyError, Result};
use ndarray::{ArrayD, ArrayView2, Axis, Ix2};
use serde::{Deserialize, Serialize};
use shared::DetectorSection;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Rank of a component stack laid out as `(components, rows, cols)`.
pub const EXPECTED_RANK: usize = 3;

/// One row of the CCD info table as it appears on disk.
///
/// Section columns are kept as text so that parse failures can be
/// reported against the CCD that uses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoRow {
    #[serde(rename = "CCDNUM")]
    pub ccdnum: i64,
    #[serde(rename = "DETSIZE")]
    pub detsize: String,
    #[serde(rename = "DETSEC")]
    pub detsec: String,
    #[serde(rename = "DATASEC")]
    pub datasec: String,
}

/// Placement metadata for one sensor, parsed and validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorRecord {
    pub ccdnum: i64,
    pub detector_size: DetectorSection,
    pub detector_section: DetectorSection,
    pub data_section: DetectorSection,
}

/// Table of CCD placement metadata keyed by CCDNUM.
///
/// Duplicate rows are preserved; lookups reject them.
#[derive(Debug, Clone, Default)]
pub struct SensorMetadataTable {
    rows: Vec<InfoRow>,
}

impl SensorMetadataTable {
    pub fn from_rows(rows: Vec<InfoRow>) -> Self {
        Self { rows }
    }

    /// Parse a CSV table with a header line.
    ///
    /// Columns CCDNUM, DETSIZE, DETSEC and DATASEC are required; any other
    /// column is ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let rows = csv_reader
            .deserialize::<InfoRow>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!("Loaded {} info table rows", rows.len());
        Ok(Self { rows })
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| AssemblyError::Io {
            context: format!("Failed to open info table {}", path.display()),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn rows(&self) -> &[InfoRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The single DETSIZE shared by every row of the table.
    pub fn detector_size(&self) -> Result<&str> {
        let mut sizes: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !sizes.contains(&row.detsize.as_str()) {
                sizes.push(&row.detsize);
            }
        }

        match sizes.as_slice() {
            [size] => Ok(*size),
            _ => Err(AssemblyError::NonUniformDetectorSize {
                sizes: sizes.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }

    /// The unique raw row for `ccdnum`.
    pub fn row(&self, ccdnum: i64) -> Result<&InfoRow> {
        let mut matches = self.rows.iter().filter(|row| row.ccdnum == ccdnum);
        match (matches.next(), matches.count()) {
            (Some(row), 0) => Ok(row),
            (first, rest) => Err(AssemblyError::MetadataCardinality {
                ccdnum,
                matches: first.map_or(0, |_| 1 + rest),
            }),
        }
    }

    /// Look up and parse the record for `ccdnum`.
    ///
    /// # Errors
    /// - `MetadataCardinality` when the table holds zero or several rows
    ///   for the identifier
    /// - `NonUniformDetectorSize` when the table mixes DETSIZE values
    /// - `InvalidSection` when a section column does not parse
    pub fn record(&self, ccdnum: i64) -> Result<SensorRecord> {
        let row = self.row(ccdnum)?;
        let detsize = self.detector_size()?;
        let parse = |field: &'static str, value: &str| -> Result<DetectorSection> {
            value
                .parse()
                .map_err(|source| AssemblyError::InvalidSection {
                    ccdnum,
                    field,
                    value: value.to_string(),
                    source,
                })
        };

        Ok(SensorRecord {
            ccdnum,
            detector_size: parse("DETSIZE", detsize)?,
            detector_section: parse("DETSEC", &row.detsec)?,
            data_section: parse("DATASEC", &row.datasec)?,
        })
    }
}

/// Raw array of one sensor together with the CCDNUM read from its header.
#[derive(Debug, Clone)]
pub struct SensorFrame {
    pub ccdnum: i64,
    pub data: ArrayD<f64>,
}

impl SensorFrame {
    pub fn new(ccdnum: i64, data: ArrayD<f64>) -> Self {
        Self { ccdnum, data }
    }

    /// Select the `component`-th 2D plane of the raw array.
    ///
    /// Stacks are expected as `(components, rows, cols)`. Other ranks are
    /// logged and still indexed: a 2D array is a single plane, and extra
    /// leading axes beyond the component axis are fixed at index 0.
    pub fn plane(&self, component: usize) -> Result<ArrayView2<'_, f64>> {
        let ndim = self.data.ndim();
        if ndim != EXPECTED_RANK {
            warn!(
                "CCD {}: array has {} dimensions instead of {}",
                self.ccdnum, ndim, EXPECTED_RANK
            );
        }

        let invalid_rank = || AssemblyError::InvalidRank {
            ccdnum: self.ccdnum,
            ndim,
        };

        let mut view = match ndim {
            0 | 1 => return Err(invalid_rank()),
            2 if component == 0 => self.data.view(),
            2 => {
                return Err(AssemblyError::ComponentOutOfRange {
                    ccdnum: self.ccdnum,
                    component,
                    available: 1,
                })
            }
            _ => {
                let available = self.data.len_of(Axis(0));
                if component >= available {
                    return Err(AssemblyError::ComponentOutOfRange {
                        ccdnum: self.ccdnum,
                        component,
                        available,
                    });
                }
                self.data.index_axis(Axis(0), component)
            }
        };

        while view.ndim() > 2 {
            if view.len_of(Axis(0)) == 0 {
                return Err(invalid_rank());
            }
            view = view.index_axis_move(Axis(0), 0);
        }

        view.into_dimensionality::<Ix2>().map_err(|_| invalid_rank())
    }
}
