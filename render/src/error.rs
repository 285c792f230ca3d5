//! Error type.
//!
//! This is the shared error type for the whole renderer. Validation failures
//! are recoverable: they are returned to the immediate caller, which is
//! expected to log and continue. Nothing here unwinds.

use std::{error, fmt};

#[derive(Clone, Debug)]
pub enum Error {
    /// Out-of-range slot or index, misaligned stride, or an enum combination
    /// the backend rejects (e.g. invalidating a mapped range that is read).
    InvalidArgument(&'static str),
    /// Texture view creation over an incompatible parent (mutable parent,
    /// buffer-backed parent, incompatible type or format class).
    IncompatibleView(&'static str),
    /// The backend could not provide storage of the requested size.
    AllocationFailed,
    /// Shader module compilation failed; carries the backend's info log.
    CompileFailed { log: String },
    /// Program link failed; carries the backend's info log.
    LinkFailed { log: String },
    /// The capability is not supported by the device.
    NotAvailable(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidArgument(what) => write!(f, "invalid argument: {}", what),
            Error::IncompatibleView(what) => write!(f, "incompatible texture view: {}", what),
            Error::AllocationFailed => write!(f, "allocation failed"),
            Error::CompileFailed { log } => write!(f, "shader compilation failed: {}", log),
            Error::LinkFailed { log } => write!(f, "program link failed: {}", log),
            Error::NotAvailable(what) => write!(f, "not available on this device: {}", what),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = ::std::result::Result<T, Error>;
