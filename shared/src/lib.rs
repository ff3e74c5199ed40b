//! Shared components for the focal-plane assembly tools.
//!
//! Holds the array algorithms and geometry parsing that are independent of
//! how sensor data is loaded or where mosaics are stored.

pub mod detector_section;
pub mod image_proc;

pub use detector_section::{parse_section_list, DetectorSection, SectionParseError};
