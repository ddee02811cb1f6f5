//! Error types for lump directory operations.
//!
//! All fallible functions in this crate return [`Result<T>`], which uses [`Error`]
//! as the error type. Lookups that may legitimately miss return `Option` instead;
//! only the "must exist" variants (`get_num_for_name` and friends) turn a miss into
//! [`Error::NotFound`].

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading containers or reading lumps.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed (opening a container, reading lump bytes, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the `zip` crate while reading a ZIP container.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A file carried a WAD signature but its directory is malformed.
    #[error("Invalid WAD '{name}': {reason}")]
    InvalidWad { name: String, reason: String },

    /// A container could not be opened at all.
    #[error("Failed to open '{path}': {reason}")]
    OpenFailure { path: Utf8PathBuf, reason: String },

    /// A lump that the caller required to exist was not found.
    #[error("{0} not found")]
    NotFound(String),

    /// An invalid lump handle was passed to an accessor.
    #[error("Lump index {index} out of range ({count} entries)")]
    IndexOutOfRange { index: usize, count: usize },

    /// Every input was processed but no lump was produced.
    #[error("No usable content: zero lumps after loading all inputs")]
    EmptyResult,

    /// Fewer bytes were read than the lump's declared size.
    #[error("Only read {read} of {expected} bytes on '{name}'")]
    ReadShortfall {
        name: String,
        read: u64,
        expected: u64,
    },
}
