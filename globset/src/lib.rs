/*!
The glob module provides standard shell globbing, but is specifically
implemented by converting glob syntax to regular expressions. The reasoning
is two fold:

1. The regex library is *really* fast. Regaining performance in a distinct
   implementation of globbing is non-trivial.
2. Most crucially, a `RegexSet` can be used to match many globs
   simultaneously.
*/

#![deny(missing_docs)]

#[macro_use]
extern crate log;
extern crate memchr;
extern crate regex;

use std::error::Error as StdError;
use std::fmt;
use std::path::Path;

use regex::bytes::RegexSet;

mod pathutil;
mod pattern;

pub use crate::pattern::{Pattern, PatternBuilder, PatternMatcher};

/// Represents an error that can occur when parsing a glob pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Occurs when a use of `**` is invalid. Namely, `**` can only appear
    /// adjacent to a path separator, or the beginning/end of a glob.
    InvalidRecursive,
    /// Occurs when a character class (e.g., `[abc]`) is not closed.
    UnclosedClass,
    /// Occurs when a range in a character class is invalid (e.g., the
    /// range starts with a lexicographically larger character than it
    /// ends with).
    InvalidRange(char, char),
    /// Occurs when a `}` is found without a matching `{`.
    UnopenedAlternates,
    /// Occurs when a `{` is found without a matching `}`.
    UnclosedAlternates,
    /// Occurs when an alternating group is nested inside another.
    NestedAlternates,
    /// An error associated with compiling the translated regex.
    Regex(String),
}

impl StdError for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidRecursive => {
                write!(f, "invalid use of **; must be one path component")
            }
            Error::UnclosedClass => write!(f, "unclosed character class; missing ']'"),
            Error::InvalidRange(s, e) => write!(f, "invalid range; '{}' > '{}'", s, e),
            Error::UnopenedAlternates => {
                write!(f, "unopened alternate group; missing '{{'")
            }
            Error::UnclosedAlternates => {
                write!(f, "unclosed alternate group; missing '}}'")
            }
            Error::NestedAlternates => write!(f, "nested alternate groups are not allowed"),
            Error::Regex(ref err) => write!(f, "{}", err),
        }
    }
}

/// A group of compiled glob patterns that can be matched against a path in
/// a single pass.
///
/// Internally this is a `RegexSet` over each pattern's translated regex.
/// `regex::bytes::RegexSet` already shares Aho-Corasick-accelerated
/// prefiltering across its member patterns, so unlike the strategy-bucketed
/// matcher this crate originally used (separate fast paths for bare
/// literals, extensions, prefixes and suffixes), a single `RegexSet` is
/// both simpler and not meaningfully slower for the pattern counts this
/// engine deals with (a handful of `-g`/`-O` globs, or the few dozen rules
/// in a directory's combined ignore stack).
#[derive(Clone, Debug)]
pub struct Set {
    patterns: Vec<Pattern>,
    set: RegexSet,
}

impl Set {
    /// Returns true if any glob in this set matches the path given.
    pub fn is_match<T: AsRef<Path>>(&self, path: T) -> bool {
        let bytes = pathutil::path_bytes(path.as_ref());
        self.set.is_match(&bytes)
    }

    /// Returns the sequence number of every glob pattern that matches the
    /// given path.
    pub fn matches<T: AsRef<Path>>(&self, path: T) -> Vec<usize> {
        let mut into = vec![];
        self.matches_into(path, &mut into);
        into
    }

    /// Adds the sequence number of every glob pattern that matches the
    /// given path to the vec given, sorted and deduplicated.
    pub fn matches_into<T: AsRef<Path>>(&self, path: T, into: &mut Vec<usize>) {
        into.clear();
        let bytes = pathutil::path_bytes(path.as_ref());
        into.extend(self.set.matches(&bytes).into_iter());
        into.sort_unstable();
        into.dedup();
    }

    /// Returns the pattern at the given sequence number, as added via
    /// `SetBuilder::add`.
    pub fn pattern(&self, i: usize) -> &Pattern {
        &self.patterns[i]
    }

    fn new(pats: Vec<Pattern>) -> Result<Set, Error> {
        debug!("built glob set with {} patterns", pats.len());
        let set = RegexSet::new(pats.iter().map(|p| p.regex().to_owned()))
            .map_err(|err| Error::Regex(err.to_string()))?;
        Ok(Set { patterns: pats, set })
    }
}

/// SetBuilder builds a group of patterns that can be used to simultaneously
/// match a file path.
#[derive(Clone, Debug, Default)]
pub struct SetBuilder {
    pats: Vec<Pattern>,
}

impl SetBuilder {
    /// Create a new SetBuilder. A SetBuilder can be used to add new
    /// patterns. Once all patterns have been added, `build` should be
    /// called to produce a `Set`, which can then be used for matching.
    pub fn new() -> SetBuilder {
        SetBuilder { pats: vec![] }
    }

    /// Builds a new matcher from all of the glob patterns added so far.
    pub fn build(&self) -> Result<Set, Error> {
        Set::new(self.pats.clone())
    }

    /// Add a new pattern to this set.
    pub fn add(&mut self, pat: Pattern) -> &mut SetBuilder {
        self.pats.push(pat);
        self
    }

    /// Returns the number of patterns added so far.
    pub fn len(&self) -> usize {
        self.pats.len()
    }

    /// Returns true if no patterns have been added.
    pub fn is_empty(&self) -> bool {
        self.pats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{PatternBuilder, SetBuilder};

    #[test]
    fn set_works() {
        let mut builder = SetBuilder::new();
        builder.add(PatternBuilder::new("*.rs").literal_separator(true).build().unwrap());
        builder.add(PatternBuilder::new("src/**").literal_separator(true).build().unwrap());
        let set = builder.build().unwrap();

        assert!(set.is_match("main.rs"));
        assert!(set.is_match("src/lib.rs"));
        assert!(!set.is_match("README.md"));
        assert_eq!(set.matches("src/lib.rs").len(), 2);
    }
}
