//! Error conditions raised by the determinant core.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// An enumerated type for the distinguishable kinds of [`DociError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DociErrorKind {
    /// An argument lies outside its permitted range.
    InvalidArgument,

    /// A combinatorial space or allocation is too large to be handled safely.
    ResourceExceeded,

    /// A file could not be opened, read, or written.
    Io,

    /// A persisted file is inconsistent with its own header.
    Format,
}

/// Error type for all fallible operations on determinants and determinant stores.
#[derive(Error, Debug)]
pub enum DociError {
    /// An argument lies outside its permitted range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A combinatorial space or allocation is too large to be handled safely.
    #[error("Resource exceeded: {0}")]
    ResourceExceeded(String),

    /// A file could not be opened, read, or written.
    #[error("I/O failure on `{}`: {source}", path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,

        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A persisted file is inconsistent with its own header.
    #[error("Format error: {0}")]
    Format(String),
}

impl DociError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> DociErrorKind {
        match self {
            DociError::InvalidArgument(_) => DociErrorKind::InvalidArgument,
            DociError::ResourceExceeded(_) => DociErrorKind::ResourceExceeded,
            DociError::Io { .. } => DociErrorKind::Io,
            DociError::Format(_) => DociErrorKind::Format,
        }
    }

    pub(crate) fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        DociError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Returns early with a [`DociError::InvalidArgument`].
macro_rules! invalid_arg {
    ($($arg:tt)*) => {
        return Err($crate::error::DociError::InvalidArgument(format!($($arg)*)))
    };
}

/// Returns early with a [`DociError::ResourceExceeded`].
macro_rules! resource_exceeded {
    ($($arg:tt)*) => {
        return Err($crate::error::DociError::ResourceExceeded(format!($($arg)*)))
    };
}

pub(crate) use {invalid_arg, resource_exceeded};
