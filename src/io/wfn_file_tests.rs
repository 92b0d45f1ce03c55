use std::fs;

use byteorder::{LittleEndian, WriteBytesExt};
use tempfile::tempdir;

use crate::error::DociErrorKind;
use crate::io::wfn_file::HEADER_BYTES;
use crate::store::DeterminantStore;

fn raw_file(header: [u64; 3], words: &[u64]) -> Vec<u64> {
    header.iter().chain(words.iter()).copied().collect()
}

fn write_raw(path: &std::path::Path, values: &[u64]) {
    let mut bytes = Vec::with_capacity(values.len() * 8);
    for &value in values {
        bytes.write_u64::<LittleEndian>(value).unwrap();
    }
    fs::write(path, bytes).unwrap();
}

#[test]
fn test_wfn_file_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("layout.doci");

    let mut store = DeterminantStore::new(70, 2).unwrap();
    store.add_occs(&[0, 69]).unwrap();
    store.add_occs(&[3, 4]).unwrap();
    store.to_file(&path).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len() as u64, HEADER_BYTES + 2 * 2 * 8);
    let values = bytes
        .chunks_exact(8)
        .map(|chunk| u64::from_le_bytes(chunk.try_into().unwrap()))
        .collect::<Vec<_>>();
    assert_eq!(
        values,
        raw_file([70, 2, 2], &[1, 1 << 5, 0b11000, 0])
    );
}

#[test]
fn test_wfn_file_round_trip_preserves_order() {
    let dir = tempdir().unwrap();
    let path_1 = dir.path().join("first.doci");
    let path_2 = dir.path().join("second.doci");

    let mut store = DeterminantStore::new(12, 4).unwrap();
    store.add_excited_dets(2).unwrap();
    store.add_hartreefock_det().unwrap();
    store.add_excited_dets(1).unwrap();
    store.to_file(&path_1).unwrap();

    let read = DeterminantStore::from_file(&path_1).unwrap();
    assert_eq!(read.nbasis(), 12);
    assert_eq!(read.nocc(), 4);
    assert_eq!(read.count(), store.count());
    assert!(store
        .iter()
        .zip(read.iter())
        .all(|((i, det_a), (j, det_b))| i == j && det_a == det_b));

    read.to_file(&path_2).unwrap();
    assert_eq!(fs::read(&path_1).unwrap(), fs::read(&path_2).unwrap());
}

#[test]
fn test_wfn_file_empty_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.doci");
    let store = DeterminantStore::new(5, 2).unwrap();
    store.to_file(&path).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), HEADER_BYTES);
    let read = DeterminantStore::from_file(&path).unwrap();
    assert!(read.is_empty());
}

#[test]
fn test_wfn_file_io_errors() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.doci");
    assert_eq!(
        DeterminantStore::from_file(&missing).unwrap_err().kind(),
        DociErrorKind::Io
    );

    let store = DeterminantStore::new(5, 2).unwrap();
    let unwritable = dir.path().join("no_such_dir").join("out.doci");
    assert_eq!(
        store.to_file(&unwritable).unwrap_err().kind(),
        DociErrorKind::Io
    );
}

#[test]
fn test_wfn_file_format_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.doci");

    // Shorter than a header.
    fs::write(&path, [0u8; 10]).unwrap();
    assert_eq!(
        DeterminantStore::from_file(&path).unwrap_err().kind(),
        DociErrorKind::Format
    );

    // Count larger than the payload.
    write_raw(&path, &raw_file([6, 2, 3], &[0b11, 0b101]));
    assert_eq!(
        DeterminantStore::from_file(&path).unwrap_err().kind(),
        DociErrorKind::Format
    );

    // Trailing bytes beyond the recorded count.
    write_raw(&path, &raw_file([6, 2, 1], &[0b11, 0b101]));
    assert_eq!(
        DeterminantStore::from_file(&path).unwrap_err().kind(),
        DociErrorKind::Format
    );

    // `nbasis` inconsistent with the record width.
    write_raw(&path, &raw_file([65, 2, 2], &[0b11, 0b101]));
    assert_eq!(
        DeterminantStore::from_file(&path).unwrap_err().kind(),
        DociErrorKind::Format
    );

    // Orbital count too wide for any record, with an empty payload.
    write_raw(&path, &raw_file([u64::MAX, 1, 0], &[]));
    assert_eq!(
        DeterminantStore::from_file(&path).unwrap_err().kind(),
        DociErrorKind::Format
    );

    // Determinant space too large to address, with an empty payload.
    write_raw(&path, &raw_file([100000, 10000, 0], &[]));
    assert_eq!(
        DeterminantStore::from_file(&path).unwrap_err().kind(),
        DociErrorKind::Format
    );

    // Invalid sector in the header.
    write_raw(&path, &raw_file([6, 0, 1], &[0]));
    assert_eq!(
        DeterminantStore::from_file(&path).unwrap_err().kind(),
        DociErrorKind::Format
    );

    // Wrong popcount.
    write_raw(&path, &raw_file([6, 2, 2], &[0b11, 0b111]));
    assert_eq!(
        DeterminantStore::from_file(&path).unwrap_err().kind(),
        DociErrorKind::Format
    );

    // Bits beyond `nbasis`.
    write_raw(&path, &raw_file([6, 2, 1], &[0b1000001]));
    assert_eq!(
        DeterminantStore::from_file(&path).unwrap_err().kind(),
        DociErrorKind::Format
    );

    // Repeated record.
    write_raw(&path, &raw_file([6, 2, 2], &[0b11, 0b11]));
    assert_eq!(
        DeterminantStore::from_file(&path).unwrap_err().kind(),
        DociErrorKind::Format
    );

    // A consistent file still reads.
    write_raw(&path, &raw_file([6, 2, 2], &[0b11, 0b101]));
    let store = DeterminantStore::from_file(&path).unwrap();
    assert_eq!(store.to_occs_array(0..2).unwrap(), vec![vec![0, 1], vec![0, 2]]);
}
