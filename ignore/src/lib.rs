/*!
Recursive directory traversal with gitignore-aware filtering (spec
component C7, with its path-selection half, C6, implemented in the
`dir`/`gitignore`/`overrides`/`types` modules).

`WalkBuilder` configures a single-threaded `Walk` iterator; `WalkParallel`
offers the same filtering with a work-stealing pool of threads for
high-throughput traversal of large trees.
*/

#![deny(missing_docs)]

#[macro_use]
extern crate log;
extern crate crossbeam_deque;
extern crate crossbeam_utils;
extern crate globset;
extern crate memchr;
extern crate walkdir;

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

mod dir;
mod gitignore;
mod overrides;
mod pathutil;
mod types;
mod walk;
mod walk_parallel;

pub use crate::dir::{Ignore, IgnoreBuilder};
pub use crate::gitignore::{Gitignore, GitignoreBuilder, Match, Pattern};
pub use crate::overrides::{Override, OverrideBuilder};
pub use crate::types::{FileTypeDef, Types, TypesBuilder};
pub use crate::walk::{DirEntry, Walk, WalkBuilder};
pub use crate::walk_parallel::{WalkParallel, WalkState};

/// A crate-wide result type.
pub type Result<T> = ::std::result::Result<T, Error>;

/// Describes all of the errors this crate's directory traversal and
/// ignore-file handling can produce.
#[derive(Debug)]
pub enum Error {
    /// A plain I/O error, with no path context attached.
    Io(io::Error),
    /// A gitignore file could not be parsed.
    Gitignore(gitignore::Error),
    /// A file type definition could not be parsed.
    Types(types::Error),
    /// Wraps another error with the path that was being processed when
    /// it occurred.
    WithPath {
        /// The path being processed.
        path: PathBuf,
        /// The underlying error.
        err: Box<Error>,
    },
    /// Several independent errors occurred in the course of a single
    /// operation (e.g., reading several ignore files in one directory),
    /// none of which should prevent the others from taking effect.
    Partial(Vec<Error>),
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::Gitignore(ref err) => Some(err),
            Error::Types(ref err) => Some(err),
            Error::WithPath { ref err, .. } => Some(err),
            Error::Partial(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => err.fmt(f),
            Error::Gitignore(ref err) => err.fmt(f),
            Error::Types(ref err) => err.fmt(f),
            Error::WithPath { ref path, ref err } => {
                write!(f, "{}: {}", path.display(), err)
            }
            Error::Partial(ref errs) => {
                for (i, err) in errs.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<gitignore::Error> for Error {
    fn from(err: gitignore::Error) -> Error {
        Error::Gitignore(err)
    }
}

impl From<types::Error> for Error {
    fn from(err: types::Error) -> Error {
        Error::Types(err)
    }
}

/// Accumulates zero or more non-fatal errors encountered while doing
/// partial work (e.g., parsing several ignore files, some of which may be
/// malformed) into a single `Error`, or `None` if nothing went wrong.
#[derive(Default)]
pub struct PartialErrorBuilder {
    errs: Vec<Error>,
}

impl PartialErrorBuilder {
    /// Records an error.
    pub fn push<E: Into<Error>>(&mut self, err: E) {
        self.errs.push(err.into());
    }

    /// Records an optional gitignore-parsing error, if one occurred.
    pub fn maybe_push_ignore_io(&mut self, err: Option<gitignore::Error>) {
        if let Some(err) = err {
            self.push(err);
        }
    }

    /// Consumes the builder, producing `None` if no errors were
    /// recorded, the lone error if exactly one was, or `Error::Partial`
    /// otherwise.
    pub fn into_error_option(self) -> Option<Error> {
        if self.errs.is_empty() {
            None
        } else if self.errs.len() == 1 {
            self.errs.into_iter().next()
        } else {
            Some(Error::Partial(self.errs))
        }
    }
}
