//! FITS-backed loading, persisting and header stamping.
#![cfg(feature = "fits")]

use fp_assembly::header::stamp_datasec;
use fp_assembly::{
    run_components, AssemblyOptions, FitsArtifactStore, FitsSensorLoader, SensorLoader,
    SensorMetadataTable, WriteOutcome,
};
use shared::image_proc::io::{
    read_primary_image, read_primary_str_key, write_primary_array, write_primary_int_key,
};
use shared::image_proc::Reduction;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use test_helpers::{component_stack, diagonal_quadrants, info_csv, stack_value};

fn write_sensor(dir: &Path, ccdnum: i64) -> PathBuf {
    let path = dir.join(format!("ccd{ccdnum:02}.fits"));
    let stack = component_stack(ccdnum, 2, 4, 4);
    write_primary_array(&path, &stack.view().into_dyn()).unwrap();
    write_primary_int_key(&path, "CCDNUM", ccdnum).unwrap();
    path
}

fn table() -> SensorMetadataTable {
    SensorMetadataTable::from_reader(info_csv(&diagonal_quadrants()).as_bytes()).unwrap()
}

#[test]
fn test_fits_loader_reads_stack_and_ccdnum() {
    let dir = TempDir::new().unwrap();
    let path = write_sensor(dir.path(), 2);

    let frame = FitsSensorLoader.load(&path).unwrap();

    assert_eq!(frame.ccdnum, 2);
    assert_eq!(frame.data.shape(), &[2, 4, 4]);
    assert_eq!(frame.data[[1, 3, 3]], stack_value(2, 1));
}

#[test]
fn test_fits_pipeline_round_trip() {
    let dir = TempDir::new().unwrap();
    let paths = vec![write_sensor(dir.path(), 1), write_sensor(dir.path(), 2)];
    let out_dir = dir.path().join("fp");
    let store = FitsArtifactStore::new(&out_dir);
    let options = AssemblyOptions {
        reduction: Reduction::None,
        tiles_dim0: 1,
        tiles_dim1: 1,
        label: Some("disk".to_string()),
        num_components: 2,
        jobs: Some(1),
    };

    let outcomes = run_components(&paths, &table(), &FitsSensorLoader, &store, &options).unwrap();
    assert!(outcomes
        .iter()
        .all(|o| matches!(o.write, WriteOutcome::Written(_))));

    let mosaic = read_primary_image(out_dir.join("disk_PCA1_fp.fits")).unwrap();
    assert_eq!(mosaic.shape(), &[8, 8]);
    assert_eq!(mosaic[[0, 0]], stack_value(1, 1));
    assert_eq!(mosaic[[5, 6]], stack_value(2, 1));
    assert!(mosaic[[0, 7]].is_nan());

    let again = run_components(&paths, &table(), &FitsSensorLoader, &store, &options).unwrap();
    assert!(again
        .iter()
        .all(|o| matches!(o.write, WriteOutcome::Skipped(_))));
}

#[test]
fn test_stamp_datasec_on_copy() {
    let dir = TempDir::new().unwrap();
    let source = write_sensor(dir.path(), 1);
    let out_dir = dir.path().join("stamped");
    std::fs::create_dir_all(&out_dir).unwrap();

    let copy = stamp_datasec(&source, &table(), Some(&out_dir)).unwrap();

    assert_eq!(copy, out_dir.join("copy_ccd01.fits"));
    assert_eq!(read_primary_str_key(&copy, "DATASEC").unwrap(), "[1:4,1:4]");
    assert_eq!(read_primary_image(&copy).unwrap().shape(), &[2, 4, 4]);
}

#[test]
fn test_stamp_datasec_unknown_ccd_fails() {
    let dir = TempDir::new().unwrap();
    let source = write_sensor(dir.path(), 9);

    let err = stamp_datasec(&source, &table(), None).unwrap_err();
    assert_eq!(err.ccdnum(), Some(9));
}
