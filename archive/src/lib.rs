/*!
Transparent decompression and archive member iteration (spec component
C5): given a byte stream, detect whether it is a single-stream compressed
file (gzip, bzip2, xz, lz4, zstd, Unix `compress`) or a container archive
(zip, tar, cpio) and produce the underlying plain-text stream(s) to search,
without staging anything to disk.
*/

#![deny(missing_docs)]

extern crate bzip2;
extern crate cpio;
extern crate flate2;
extern crate lz4_flex;
extern crate tar;
extern crate xz2;
extern crate zip;
extern crate zstd;
#[macro_use]
extern crate log;

mod container;
mod decompress;
mod detect;

pub use container::{ArchiveEntry, ContainerReader};
pub use decompress::decompress;
pub use detect::{detect, Format};

use std::fmt;
use std::io;

/// The result type used throughout this crate.
pub type Result<T> = ::std::result::Result<T, Error>;

/// Errors that can occur while decompressing a stream or iterating an
/// archive's members.
#[derive(Debug)]
pub enum Error {
    /// An I/O error reading the underlying stream.
    Io(io::Error),
    /// The stream claimed to be in a format this crate recognizes but was
    /// malformed.
    Corrupt { format: Format, detail: String },
    /// The archive nested more levels deep than the configured limit
    /// (`--zmax`), and recursion was stopped rather than followed further.
    NestingLimitExceeded { limit: u32 },
}

impl ::std::error::Error for Error {
    fn source(&self) -> Option<&(dyn ::std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => err.fmt(f),
            Error::Corrupt { format, ref detail } => {
                write!(f, "corrupt {} stream: {}", format, detail)
            }
            Error::NestingLimitExceeded { limit } => {
                write!(f, "archive nesting exceeded the limit of {} levels", limit)
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
