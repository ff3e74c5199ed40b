//! Detector geometry descriptors in IRAF/FITS section notation.
//!
//! CCD headers and calibration tables describe where a readout lands on the
//! focal plane with bracketed range strings such as `[2049:4096,1:4096]`.
//! The first range runs along the x axis (array columns), the second along
//! the y axis (array rows).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing a section string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SectionParseError {
    #[error("Invalid integer token '{token}' in section '{input}'")]
    InvalidToken { input: String, token: String },
    #[error("Section '{input}' holds {found} values, expected {expected}")]
    WrongLength {
        input: String,
        found: usize,
        expected: usize,
    },
}

/// Extract the integers of a bracketed range-list string, left to right.
///
/// Brackets are dropped and colons are treated the same as commas, so
/// `"[1:2048,4097:8192]"` yields `[1, 2048, 4097, 8192]`. Range ordering is
/// not validated here.
///
/// # Errors
/// Returns `SectionParseError::InvalidToken` for any token that is not an
/// integer once the delimiters are stripped (including empty tokens).
pub fn parse_section_list(s: &str) -> Result<Vec<i64>, SectionParseError> {
    let cleaned = s.replace(['[', ']'], "").replace(':', ",");

    cleaned
        .split(',')
        .map(|token| {
            token
                .trim()
                .parse::<i64>()
                .map_err(|_| SectionParseError::InvalidToken {
                    input: s.to_string(),
                    token: token.to_string(),
                })
        })
        .collect()
}

/// A two-axis detector section, `[x_start:x_end,y_start:y_end]`.
///
/// Endpoints are kept as written; a section may run in either direction
/// along each axis (flipped amplifiers are common in DETSEC values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DetectorSection {
    pub x: (i64, i64),
    pub y: (i64, i64),
}

impl DetectorSection {
    pub fn new(x: (i64, i64), y: (i64, i64)) -> Self {
        Self { x, y }
    }

    /// Row-axis endpoints sorted ascending.
    pub fn row_span(&self) -> (i64, i64) {
        sorted_pair(self.y)
    }

    /// Column-axis endpoints sorted ascending.
    pub fn col_span(&self) -> (i64, i64) {
        sorted_pair(self.x)
    }

    /// Insertion offset `(row, col)` once both endpoints of each axis are
    /// floor-divided by `factor`.
    ///
    /// Endpoints are used directly as array indices, without the usual
    /// one-based FITS correction. Assembled canvases therefore carry one
    /// unset row and column before the first sensor.
    pub fn offset(&self, factor: usize) -> (i64, i64) {
        let k = factor.max(1) as i64;
        let (r0, r1) = self.row_span();
        let (c0, c1) = self.col_span();
        (
            r0.div_euclid(k).min(r1.div_euclid(k)),
            c0.div_euclid(k).min(c1.div_euclid(k)),
        )
    }

    /// Extent `(rows, cols)` of the section, endpoints inclusive.
    pub fn extent(&self) -> (i64, i64) {
        let (r0, r1) = self.row_span();
        let (c0, c1) = self.col_span();
        (r1 - r0 + 1, c1 - c0 + 1)
    }
}

fn sorted_pair((a, b): (i64, i64)) -> (i64, i64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl FromStr for DetectorSection {
    type Err = SectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = parse_section_list(s)?;
        match values.as_slice() {
            &[x0, x1, y0, y1] => Ok(Self::new((x0, x1), (y0, y1))),
            other => Err(SectionParseError::WrongLength {
                input: s.to_string(),
                found: other.len(),
                expected: 4,
            }),
        }
    }
}

impl TryFrom<String> for DetectorSection {
    type Error = SectionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DetectorSection> for String {
    fn from(section: DetectorSection) -> Self {
        section.to_string()
    }
}

impl fmt::Display for DetectorSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{},{}:{}]",
            self.x.0, self.x.1, self.y.0, self.y.1
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_section_list() {
        assert_eq!(
            parse_section_list("[1:2048,4097:8192]").unwrap(),
            vec![1, 2048, 4097, 8192]
        );
        assert_eq!(parse_section_list("[5:3]").unwrap(), vec![5, 3]);
        assert_eq!(parse_section_list("7").unwrap(), vec![7]);
        assert_eq!(
            parse_section_list("[ 1 : 2 , 3 : 4 ]").unwrap(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(parse_section_list("[-4:2,0:1]").unwrap(), vec![-4, 2, 0, 1]);
    }

    #[test]
    fn test_parse_section_list_rejects_garbage() {
        assert!(matches!(
            parse_section_list("[1:abc,3:4]"),
            Err(SectionParseError::InvalidToken { ref token, .. }) if token == "abc"
        ));
        assert!(parse_section_list("[1:2.5,3:4]").is_err());
        assert!(parse_section_list("[1::2,3:4]").is_err());
        assert!(parse_section_list("").is_err());
    }

    #[test]
    fn test_detector_section_from_str() {
        let section: DetectorSection = "[2049:4096,1:4096]".parse().unwrap();
        assert_eq!(section.x, (2049, 4096));
        assert_eq!(section.y, (1, 4096));
        assert_eq!(section.extent(), (4096, 2048));
    }

    #[test]
    fn test_detector_section_wrong_length() {
        let err = "[1:2,3]".parse::<DetectorSection>().unwrap_err();
        assert_eq!(
            err,
            SectionParseError::WrongLength {
                input: "[1:2,3]".to_string(),
                found: 3,
                expected: 4
            }
        );
    }

    #[test]
    fn test_offset_sorts_each_axis() {
        // Flipped readout: x runs right to left, y bottom to top
        let section = DetectorSection::new((4096, 2049), (8192, 4097));
        assert_eq!(section.row_span(), (4097, 8192));
        assert_eq!(section.col_span(), (2049, 4096));
        assert_eq!(section.offset(1), (4097, 2049));
    }

    #[test]
    fn test_offset_floor_divides_by_factor() {
        let section: DetectorSection = "[2049:4096,4097:8192]".parse().unwrap();
        assert_eq!(section.offset(4), (1024, 512));
        assert_eq!(section.offset(0), section.offset(1));
    }

    #[test]
    fn test_display_roundtrip() {
        let text = "[10:1,3:40]";
        let section: DetectorSection = text.parse().unwrap();
        assert_eq!(section.to_string(), text);
    }

    #[test]
    fn test_serde_as_string() {
        let section = DetectorSection::new((1, 4), (5, 8));
        let json = serde_json::to_string(&section).unwrap();
        assert_eq!(json, "\"[1:4,5:8]\"");
        let back: DetectorSection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, section);
        assert!(serde_json::from_str::<DetectorSection>("\"[1:x,5:8]\"").is_err());
    }
}
