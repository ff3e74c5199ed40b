//! FITS input/output for sensor cubes and assembled focal planes.
//!
//! Arrays use numpy axis order: the last axis is NAXIS1 (columns), the one
//! before it NAXIS2 (rows), and a leading axis on cubes is NAXIS3. Images
//! are read and written in that order without flipping, so coordinates in
//! DETSEC/DATASEC headers map straight onto array indices.

use fitsio::hdu::HduInfo;
use fitsio::images::{ImageDescription, ImageType};
use fitsio::FitsFile;
use ndarray::{ArrayD, ArrayView2, ArrayViewD, IxDyn};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during FITS file operations
#[derive(Error, Debug)]
pub enum FitsError {
    #[error("FITS I/O error: {0}")]
    FitsIo(#[from] fitsio::errors::Error),
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Primary HDU of {0} is not an image")]
    NotAnImage(String),
    #[error("Invalid data type in HDU: {0}")]
    InvalidDataType(String),
    #[error("Refusing to write empty image to {0}")]
    EmptyImage(String),
}

/// Read the primary image of a FITS file as an N-d `f64` array.
pub fn read_primary_image<P: AsRef<Path>>(path: P) -> Result<ArrayD<f64>, FitsError> {
    let path = path.as_ref();
    let mut fptr = FitsFile::open(path)?;
    let hdu = fptr.primary_hdu()?;

    let shape = match &hdu.info {
        HduInfo::ImageInfo { shape, .. } => shape.clone(),
        _ => return Err(FitsError::NotAnImage(path.display().to_string())),
    };

    let data: Vec<f64> = hdu.read_image(&mut fptr)?;
    ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|e| {
        FitsError::InvalidDataType(format!(
            "Cannot reshape primary image of {} to {:?}: {}",
            path.display(),
            shape,
            e
        ))
    })
}

/// Read an integer keyword from the primary header.
pub fn read_primary_int_key<P: AsRef<Path>>(path: P, key: &str) -> Result<i64, FitsError> {
    let mut fptr = FitsFile::open(path.as_ref())?;
    let hdu = fptr.primary_hdu()?;
    Ok(hdu.read_key::<i64>(&mut fptr, key)?)
}

/// Read a string keyword from the primary header.
pub fn read_primary_str_key<P: AsRef<Path>>(path: P, key: &str) -> Result<String, FitsError> {
    let mut fptr = FitsFile::open(path.as_ref())?;
    let hdu = fptr.primary_hdu()?;
    Ok(hdu.read_key::<String>(&mut fptr, key)?)
}

/// Write a 2D `f64` array as the primary image of a new FITS file.
///
/// Fails if the file already exists; callers decide on overwrite policy.
pub fn write_primary_image<P: AsRef<Path>>(
    path: P,
    image: &ArrayView2<f64>,
) -> Result<(), FitsError> {
    write_primary_array(path, &image.view().into_dyn())
}

/// Write an N-d `f64` array (numpy axis order) as the primary image of a
/// new FITS file.
pub fn write_primary_array<P: AsRef<Path>>(
    path: P,
    array: &ArrayViewD<f64>,
) -> Result<(), FitsError> {
    let path = path.as_ref();
    if array.is_empty() {
        return Err(FitsError::EmptyImage(path.display().to_string()));
    }

    let description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: array.shape(),
    };

    let mut fptr = FitsFile::create(path)
        .with_custom_primary(&description)
        .open()?;
    let hdu = fptr.primary_hdu()?;

    let flat: Vec<f64> = array.iter().copied().collect();
    hdu.write_image(&mut fptr, &flat)?;

    Ok(())
}

/// Set an integer keyword in the primary header of an existing file.
pub fn write_primary_int_key<P: AsRef<Path>>(
    path: P,
    key: &str,
    value: i64,
) -> Result<(), FitsError> {
    let mut fptr = FitsFile::edit(path.as_ref())?;
    let hdu = fptr.primary_hdu()?;
    hdu.write_key(&mut fptr, key, value)?;
    Ok(())
}

/// Set a string keyword in the primary header of an existing file.
pub fn write_primary_str_key<P: AsRef<Path>>(
    path: P,
    key: &str,
    value: &str,
) -> Result<(), FitsError> {
    let mut fptr = FitsFile::edit(path.as_ref())?;
    let hdu = fptr.primary_hdu()?;
    hdu.write_key(&mut fptr, key, value.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array2, Array3};
    use tempfile::TempDir;

    fn write_cube(path: &Path, cube: &Array3<f64>, ccdnum: i64) {
        write_primary_array(path, &cube.view().into_dyn()).unwrap();
        write_primary_int_key(path, "CCDNUM", ccdnum).unwrap();
    }

    #[test]
    fn test_fits_error_display() {
        let error = FitsError::NotAnImage("x.fits".to_string());
        assert!(error.to_string().contains("x.fits"));
    }

    #[test]
    fn test_cube_roundtrip_keeps_axis_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cube.fits");
        let cube = Array3::from_shape_fn((4, 6, 3), |(c, r, x)| (c * 100 + r * 10 + x) as f64);
        write_cube(&path, &cube, 17);

        let read = read_primary_image(&path).unwrap();
        assert_eq!(read.shape(), &[4, 6, 3]);
        assert_relative_eq!(read[[2, 5, 1]], 251.0);
        assert_eq!(read_primary_int_key(&path, "CCDNUM").unwrap(), 17);
    }

    #[test]
    fn test_write_primary_image_with_nan() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fp.fits");
        let mut image = Array2::from_elem((3, 5), f64::NAN);
        image[[1, 4]] = 2.5;

        write_primary_image(&path, &image.view()).unwrap();
        let read = read_primary_image(&path).unwrap();

        assert_eq!(read.shape(), &[3, 5]);
        assert_relative_eq!(read[[1, 4]], 2.5);
        assert!(read[[0, 0]].is_nan());
    }

    #[test]
    fn test_write_primary_image_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fp.fits");
        let image = Array2::from_elem((2, 2), 1.0);

        write_primary_image(&path, &image.view()).unwrap();
        assert!(write_primary_image(&path, &image.view()).is_err());
    }

    #[test]
    fn test_write_empty_image_rejected() {
        let dir = TempDir::new().unwrap();
        let image = Array2::<f64>::zeros((0, 4));
        assert!(matches!(
            write_primary_image(dir.path().join("e.fits"), &image.view()),
            Err(FitsError::EmptyImage(_))
        ));
    }

    #[test]
    fn test_write_primary_int_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("i.fits");
        write_primary_image(&path, &Array2::from_elem((2, 2), 0.0).view()).unwrap();

        write_primary_int_key(&path, "CCDNUM", 42).unwrap();
        assert_eq!(read_primary_int_key(&path, "CCDNUM").unwrap(), 42);
    }

    #[test]
    fn test_write_primary_str_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("k.fits");
        write_primary_image(&path, &Array2::from_elem((2, 2), 0.0).view()).unwrap();

        write_primary_str_key(&path, "DATASEC", "[1:2048,1:4096]").unwrap();

        assert_eq!(
            read_primary_str_key(&path, "DATASEC").unwrap(),
            "[1:2048,1:4096]"
        );
    }
}
