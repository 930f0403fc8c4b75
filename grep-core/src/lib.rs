/*!
grep-core provides the pattern compiler (spec component C1), the boolean
query planner (C2) and the line-oriented matcher primitive that the rest of
the search engine is built on top of (the matching half of C3).

This crate knows nothing about files, directories or threads. It exposes a
`Grep` value that is cheap to clone and safe to share across worker threads,
and an `Iter` that yields `Match` values over an in-memory buffer.
*/

#![deny(missing_docs)]

extern crate memchr;
extern crate regex;
extern crate regex_syntax;
#[macro_use]
extern crate log;

mod boolexpr;
mod fuzzy;
mod pattern;
mod search;

pub use boolexpr::{parse as parse_bool_expr, BoolExpr, BoolExprError, Scope};
pub use fuzzy::{FuzzyMatch, FuzzySpec};
pub use pattern::{join_alternates, literal_escape, word_wrap};
pub use search::{Grep, GrepBuilder, Iter, Match};

use std::error::Error as StdError;
use std::fmt;

/// The result type used throughout this crate.
pub type Result<T> = ::std::result::Result<T, Error>;

/// Errors that can occur while compiling or running a pattern.
#[derive(Debug)]
pub enum Error {
    /// The pattern failed to parse or compile as a regular expression.
    Regex(regex::Error),
    /// A line exceeded the internal buffered-reader limit.
    LineTooLong(usize),
    /// The fuzzy specification was invalid (e.g. a negative distance).
    InvalidFuzzySpec(String),
    /// The boolean query expression could not be parsed.
    BoolExpr(BoolExprError),
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Regex(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Regex(ref err) => err.fmt(f),
            Error::LineTooLong(limit) => {
                write!(f, "line exceeded buffer limit of {} bytes", limit)
            }
            Error::InvalidFuzzySpec(ref msg) => {
                write!(f, "invalid fuzzy spec: {}", msg)
            }
            Error::BoolExpr(ref err) => err.fmt(f),
        }
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Error {
        Error::Regex(err)
    }
}

impl From<BoolExprError> for Error {
    fn from(err: BoolExprError) -> Error {
        Error::BoolExpr(err)
    }
}
