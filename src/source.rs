//! The data model shared by every stage of the pipeline: where a match came
//! from (`InputSource`), what was found there (`MatchRecord`), and the
//! per-source aggregate the output coordinator sorts and emits
//! (`FileResult`).

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Where a searched buffer of bytes ultimately came from.
///
/// Archive members and decompressed streams nest inside their container,
/// which is how a single top-level file path can expand into many distinct
/// sources during one traversal.
#[derive(Clone, Debug)]
pub enum InputSource {
    /// A plain file on disk.
    File(PathBuf),
    /// Standard input.
    Stdin,
    /// A member of a zip/tar/cpio archive.
    ArchiveMember {
        /// The archive that contains this member.
        outer: Box<InputSource>,
        /// The member's path within the archive.
        inner_path: String,
        /// Nesting depth, counting this member (an archive inside an
        /// archive has depth 2, and so on).
        depth: u32,
    },
    /// A compressed stream (gzip, bzip2, xz, lz4, zstd) that was
    /// transparently decompressed before searching.
    Decompressed {
        /// The compressed source.
        outer: Box<InputSource>,
        /// Nesting depth, mirroring `ArchiveMember::depth`.
        depth: u32,
    },
}

impl InputSource {
    /// Nesting depth of this source (0 for a plain file or stdin).
    pub fn depth(&self) -> u32 {
        match *self {
            InputSource::File(_) | InputSource::Stdin => 0,
            InputSource::ArchiveMember { depth, .. } => depth,
            InputSource::Decompressed { depth, .. } => depth,
        }
    }

    /// The outermost file path backing this source, if any (stdin has
    /// none).
    pub fn root_path(&self) -> Option<&Path> {
        match *self {
            InputSource::File(ref p) => Some(p),
            InputSource::Stdin => None,
            InputSource::ArchiveMember { ref outer, .. } => outer.root_path(),
            InputSource::Decompressed { ref outer, .. } => outer.root_path(),
        }
    }

    /// Builds an `ArchiveMember` source nested one level deeper than `self`.
    pub fn archive_member(self, inner_path: String) -> InputSource {
        let depth = self.depth() + 1;
        InputSource::ArchiveMember { outer: Box::new(self), inner_path, depth }
    }

    /// Builds a `Decompressed` source nested one level deeper than `self`.
    pub fn decompressed(self) -> InputSource {
        let depth = self.depth() + 1;
        InputSource::Decompressed { outer: Box::new(self), depth }
    }
}

impl fmt::Display for InputSource {
    /// Renders the `outer{inner}` display path used in output.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            InputSource::File(ref p) => write!(f, "{}", p.display()),
            InputSource::Stdin => write!(f, "<stdin>"),
            InputSource::ArchiveMember { ref outer, ref inner_path, .. } => {
                write!(f, "{}{{{}}}", outer, inner_path)
            }
            InputSource::Decompressed { ref outer, .. } => write!(f, "{}", outer),
        }
    }
}

/// A single matched span within one searched buffer, including whatever
/// context lines surround it.
#[derive(Clone, Debug)]
pub struct MatchRecord {
    /// 1-based line number of the match.
    pub line: u64,
    /// 0-based column (byte offset into the line) of the match start.
    pub column: usize,
    /// Byte offset of the match start within the whole buffer.
    pub byte_offset: u64,
    /// The full matched line, including its terminator if present.
    pub text: Vec<u8>,
    /// Byte range of the match within `text`.
    pub match_span: (usize, usize),
    /// Byte ranges of any capture groups, parallel to the pattern's groups.
    pub capture_spans: Vec<Option<(usize, usize)>>,
    /// Edit distance, if this match came from fuzzy matching.
    pub fuzzy_cost: Option<u32>,
    /// True if the line was classified as binary (only possible when
    /// binary content is being searched as text).
    pub is_binary: bool,
    /// Context lines preceding the match, oldest first.
    pub before_context: Vec<(u64, Vec<u8>)>,
    /// Context lines following the match, in order.
    pub after_context: Vec<(u64, Vec<u8>)>,
}

/// All matches found within one input source, plus the metadata needed to
/// sort results across sources.
#[derive(Clone, Debug)]
pub struct FileResult {
    /// Where these matches came from.
    pub source: InputSource,
    /// The matches themselves, in the order they were found.
    pub matches: Vec<MatchRecord>,
    /// File size in bytes, when known (used by `--sort=size`).
    pub size: Option<u64>,
    /// Last-modified time, when known (used by `--sort=changed`).
    pub modified: Option<SystemTime>,
    /// Last-accessed time, when known (used by `--sort=used`).
    pub accessed: Option<SystemTime>,
    /// Creation time, when known (used by `--sort=created`).
    pub created: Option<SystemTime>,
}

impl FileResult {
    /// Builds an empty result for `source`, to be filled in as matches are
    /// found.
    pub fn new(source: InputSource) -> FileResult {
        FileResult {
            source,
            matches: Vec::new(),
            size: None,
            modified: None,
            accessed: None,
            created: None,
        }
    }

    /// The "best" match score for `--sort=best`: the lowest fuzzy cost
    /// among this source's matches, or 0 for exact matches.
    pub fn best_score(&self) -> u32 {
        self.matches.iter().map(|m| m.fuzzy_cost.unwrap_or(0)).min().unwrap_or(u32::MAX)
    }
}
