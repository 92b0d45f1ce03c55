//! Bit-exact binary persistence of determinant stores.
//!
//! A file consists of a header of three `u64` values, `nbasis`, `nocc` and `count`, followed by
//! `count` records of `nword` `u64` words each, in store order. Bit $`p`$ of a determinant is bit
//! $`p \bmod 64`$ of word $`\lfloor p / 64 \rfloor`$ of its record, and bits beyond `nbasis` are
//! zero. All values are stored little-endian regardless of the platform.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use log;

use crate::determinant::Determinant;
use crate::error::{DociError, DociErrorKind};
use crate::store::DeterminantStore;

#[cfg(test)]
#[path = "wfn_file_tests.rs"]
mod wfn_file_tests;

/// The number of bytes in the file header.
pub const HEADER_BYTES: u64 = 3 * WORD_BYTES;

/// The number of bytes in one persisted word.
const WORD_BYTES: u64 = std::mem::size_of::<u64>() as u64;

/// Writes `store` to the file at `path`, creating or truncating it.
///
/// # Errors
///
/// [`DociError::Io`] if the file cannot be created or written.
pub(crate) fn write_wfn_file<P: AsRef<Path>>(
    path: P,
    store: &DeterminantStore,
) -> Result<(), DociError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|err| DociError::io(path, err))?;
    let mut writer = BufWriter::new(file);
    write_wfn::<_, LittleEndian>(&mut writer, store)
        .and_then(|_| writer.flush())
        .map_err(|err| DociError::io(path, err))?;
    log::debug!(
        "Wrote {} determinants over {} orbitals to `{}`.",
        store.count(),
        store.nbasis(),
        path.display()
    );
    Ok(())
}

fn write_wfn<W: Write, B: ByteOrder>(writer: &mut W, store: &DeterminantStore) -> io::Result<()> {
    writer.write_u64::<B>(store.nbasis() as u64)?;
    writer.write_u64::<B>(store.nocc() as u64)?;
    writer.write_u64::<B>(store.count() as u64)?;
    for det in store {
        for word in det.words() {
            writer.write_u64::<B>(word)?;
        }
    }
    Ok(())
}

/// Reads a store from the file at `path`.
///
/// The header is checked against the actual length of the file before any record is read, and
/// every record is checked to belong to the header's sector and to be unique.
///
/// # Errors
///
/// [`DociError::Io`] if the file cannot be opened or read, and [`DociError::Format`] if the
/// header is invalid or inconsistent with the payload, or a record is invalid.
pub(crate) fn read_wfn_file<P: AsRef<Path>>(path: P) -> Result<DeterminantStore, DociError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| DociError::io(path, err))?;
    let file_len = file
        .metadata()
        .map_err(|err| DociError::io(path, err))?
        .len();
    let mut reader = BufReader::new(file);
    let store = read_wfn::<_, LittleEndian>(&mut reader, file_len, path)?;
    log::debug!(
        "Read {} determinants over {} orbitals from `{}`.",
        store.count(),
        store.nbasis(),
        path.display()
    );
    Ok(store)
}

fn read_wfn<R: Read, B: ByteOrder>(
    reader: &mut R,
    file_len: u64,
    path: &Path,
) -> Result<DeterminantStore, DociError> {
    if file_len < HEADER_BYTES {
        return Err(DociError::Format(format!(
            "`{}` holds {file_len} bytes, fewer than the {HEADER_BYTES}-byte header.",
            path.display()
        )));
    }
    let mut header = [0u64; 3];
    reader
        .read_u64_into::<B>(&mut header)
        .map_err(|err| DociError::io(path, err))?;
    let [nbasis, nocc, count] = header;

    let to_usize = |value: u64, name: &str| {
        usize::try_from(value).map_err(|_| {
            DociError::Format(format!("Header field `{name}` = {value} is out of range."))
        })
    };
    let nbasis = to_usize(nbasis, "nbasis")?;
    let nocc = to_usize(nocc, "nocc")?;
    let mut store = DeterminantStore::new(nbasis, nocc).map_err(|err| match err.kind() {
        DociErrorKind::InvalidArgument | DociErrorKind::ResourceExceeded => {
            DociError::Format(format!("Invalid header in `{}`: {err}", path.display()))
        }
        _ => err,
    })?;

    let nword = store.nword();
    let expected_len = count
        .checked_mul(nword as u64 * WORD_BYTES)
        .and_then(|payload| payload.checked_add(HEADER_BYTES));
    if expected_len != Some(file_len) {
        return Err(DociError::Format(format!(
            "Header of `{}` records {count} determinants of {nword} word(s), which is \
            inconsistent with the file length of {file_len} bytes.",
            path.display()
        )));
    }
    if count > store.ndet_max() {
        return Err(DociError::Format(format!(
            "Header of `{}` records {count} determinants, but only {} distinct ones exist.",
            path.display(),
            store.ndet_max()
        )));
    }
    let count = to_usize(count, "count")?;
    store.reserve(count)?;

    let mut words = vec![0u64; nword];
    for record in 0..count {
        reader
            .read_u64_into::<B>(&mut words)
            .map_err(|err| DociError::io(path, err))?;
        let det = Determinant::from_words(nbasis, &words)
            .map_err(|err| DociError::Format(format!("Record {record}: {err}")))?;
        if det.popcount() != nocc {
            return Err(DociError::Format(format!(
                "Record {record} has {} occupied orbitals instead of {nocc}.",
                det.popcount()
            )));
        }
        if !store.push_checked(det)? {
            return Err(DociError::Format(format!(
                "Record {record} repeats an earlier determinant."
            )));
        }
    }
    Ok(store)
}
