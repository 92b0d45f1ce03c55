//! Input/output of determinant stores, control parameters, and formatted output.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{self, format_err};
use serde::{de::DeserializeOwned, Serialize};
use serde_yaml;

pub(crate) mod format;
pub mod logging;
pub mod wfn_file;


/// An enumerated type for `doci` file types.
pub enum DociFileType {
    /// Variant for binary files containing determinant stores.
    Wfn,
}

impl DociFileType {
    /// Returns the extension of the file type.
    pub fn ext(&self) -> String {
        match self {
            DociFileType::Wfn => "doci.wfn".to_string(),
        }
    }

    /// Returns the path obtained by appending the extension of this file type to `name`.
    pub fn path_for<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        let mut path = name.as_ref().to_path_buf();
        path.set_extension(self.ext());
        path
    }
}

/// Reads a `doci` configuration YAML file and deserialises it into an appropriate structure.
///
/// # Arguments
///
/// * `name` - The name of the file to be read in (with its `.yml` or `.yaml` extension).
///
/// # Returns
///
/// A `Result` containing the structure deserialised from the read-in file.
pub fn read_doci_yaml<T, P: AsRef<Path>>(name: P) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
{
    let mut reader = BufReader::new(File::open(name).map_err(|err| format_err!(err))?);
    serde_yaml::from_reader(&mut reader).map_err(|err| format_err!(err))
}

/// Serialises a structure and writes into a `doci` configuration YAML file.
///
/// # Arguments
///
/// * `name` - The name of the YAML file to be written (without extensions). The resulting file
/// will have the `.yml` extension.
///
/// # Returns
///
/// A `Result` indicating if the serialisation and writing processes have been successful.
pub fn write_doci_yaml<T, P: AsRef<Path>>(name: P, value: &T) -> Result<(), anyhow::Error>
where
    T: Serialize,
{
    let mut path = name.as_ref().to_path_buf();
    path.set_extension("yml");
    let mut writer = BufWriter::new(File::create(path)?);
    serde_yaml::to_writer(&mut writer, value).map_err(|err| format_err!(err))
}
