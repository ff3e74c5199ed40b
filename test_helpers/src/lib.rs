//! Test helpers for focal-plane assembly
//!
//! Synthetic sensor stacks and info table text shared by the workspace
//! tests.

use ndarray::{Array2, Array3};
use std::fmt::Write as _;

/// Pixel value used by [`component_stack`] for a given CCD and component.
///
/// Distinct per (ccdnum, component) so mosaics can be checked cell by cell.
pub fn stack_value(ccdnum: i64, component: usize) -> f64 {
    (ccdnum * 1000) as f64 + (component * 10) as f64
}

/// A `(components, rows, cols)` stack whose planes are constant at
/// [`stack_value`].
pub fn component_stack(ccdnum: i64, components: usize, rows: usize, cols: usize) -> Array3<f64> {
    Array3::from_shape_fn((components, rows, cols), |(c, _, _)| {
        stack_value(ccdnum, c)
    })
}

/// A single `(rows, cols)` plane filled with [`stack_value`] of component 0.
pub fn single_plane(ccdnum: i64, rows: usize, cols: usize) -> Array2<f64> {
    Array2::from_elem((rows, cols), stack_value(ccdnum, 0))
}

/// Section string `[x0:x1,y0:y1]` in the info table convention.
pub fn section(x: (i64, i64), y: (i64, i64)) -> String {
    format!("[{}:{},{}:{}]", x.0, x.1, y.0, y.1)
}

/// One info table row before rendering.
#[derive(Debug, Clone)]
pub struct InfoLine {
    pub ccdnum: i64,
    pub detsize: String,
    pub detsec: String,
    pub datasec: String,
}

impl InfoLine {
    pub fn new(ccdnum: i64, detsize: &str, detsec: &str, datasec: &str) -> Self {
        Self {
            ccdnum,
            detsize: detsize.to_string(),
            detsec: detsec.to_string(),
            datasec: datasec.to_string(),
        }
    }
}

/// Render rows as CSV text with the CCDNUM, DETSIZE, DETSEC, DATASEC header.
pub fn info_csv(lines: &[InfoLine]) -> String {
    let mut out = String::from("CCDNUM,DETSIZE,DETSEC,DATASEC\n");
    for line in lines {
        let _ = writeln!(
            out,
            "{},\"{}\",\"{}\",\"{}\"",
            line.ccdnum, line.detsize, line.detsec, line.datasec
        );
    }
    out
}

/// Two 4x4 sensors on an 8x8 detector at opposite quadrants, with
/// zero-based sections: CCD 1 at the origin and CCD 2 at (4, 4).
pub fn diagonal_quadrants() -> Vec<InfoLine> {
    let detsize = section((0, 7), (0, 7));
    let datasec = section((1, 4), (1, 4));
    vec![
        InfoLine::new(1, &detsize, &section((0, 3), (0, 3)), &datasec),
        InfoLine::new(2, &detsize, &section((4, 7), (4, 7)), &datasec),
    ]
}
