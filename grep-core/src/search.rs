//! The line matcher itself (C1 compilation target, C3 matching primitive).
//!
//! This is a from-scratch port of the matcher this crate is modeled on,
//! rebuilt against the modern `regex::bytes` API. The original compiled a
//! `regex-syntax` AST by hand and layered a literal-prefilter (`required`
//! regex over a line-start/line-end scan) on top of the DFA to skip
//! non-matching lines quickly. The modern `regex` crate already performs
//! that kind of literal prefiltering internally (via its own literal
//! extraction and Boyer-Moore/memchr acceleration), so this port keeps the
//! public shape of `Grep`/`GrepBuilder`/`Match`/`Iter` but drops the
//! hand-rolled literal-set machinery entirely.

use memchr::{memchr, memrchr};
use regex::bytes::{Regex, RegexBuilder};

use crate::Result;

/// The default maximum compiled program size, in bytes, before compilation
/// is rejected. Mirrors the regex crate's own default but is exposed here
/// so CLI flags like `--regex-size-limit` can override it.
const DEFAULT_SIZE_LIMIT: usize = 10 * (1 << 20);
const DEFAULT_DFA_SIZE_LIMIT: usize = 10 * (1 << 20);

/// A single match found by a `Grep`.
///
/// Offsets are byte offsets into whichever buffer produced the match, not
/// absolute file offsets; callers that stream input in chunks are
/// responsible for translating these into file-relative positions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Match {
    start: usize,
    end: usize,
    line: Option<usize>,
}

impl Match {
    /// The byte offset where the line containing the match starts.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The byte offset where the line containing the match ends
    /// (inclusive of the line terminator, if any).
    pub fn end(&self) -> usize {
        self.end
    }

    /// The 1-based line number of the match, if line counting was enabled.
    pub fn line(&self) -> Option<usize> {
        self.line
    }
}

#[derive(Clone, Debug)]
struct Options {
    case_insensitive: bool,
    line_numbers: bool,
    line_terminator: u8,
    size_limit: usize,
    dfa_size_limit: usize,
    multi_line_dot: bool,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            case_insensitive: false,
            line_numbers: false,
            line_terminator: b'\n',
            size_limit: DEFAULT_SIZE_LIMIT,
            dfa_size_limit: DEFAULT_DFA_SIZE_LIMIT,
            multi_line_dot: false,
        }
    }
}

/// Builds a `Grep` matcher from a pattern string and a set of options.
#[derive(Clone, Debug)]
pub struct GrepBuilder {
    pattern: String,
    opts: Options,
}

impl GrepBuilder {
    /// Creates a new builder for the given pattern.
    pub fn new(pattern: &str) -> GrepBuilder {
        GrepBuilder {
            pattern: pattern.to_string(),
            opts: Options::default(),
        }
    }

    /// When enabled, `Match::line` is populated with 1-based line numbers.
    /// Disabled by default since counting lines costs a linear scan.
    pub fn line_numbers(mut self, yes: bool) -> GrepBuilder {
        self.opts.line_numbers = yes;
        self
    }

    /// Enables case-insensitive matching.
    pub fn case_insensitive(mut self, yes: bool) -> GrepBuilder {
        self.opts.case_insensitive = yes;
        self
    }

    /// Sets the byte that terminates a line. Must be an ASCII byte.
    pub fn line_terminator(mut self, ascii_byte: u8) -> GrepBuilder {
        assert!(ascii_byte <= 0x7F, "line terminator must be ASCII");
        self.opts.line_terminator = ascii_byte;
        self
    }

    /// Sets the maximum compiled program size in bytes.
    pub fn size_limit(mut self, bytes: usize) -> GrepBuilder {
        self.opts.size_limit = bytes;
        self
    }

    /// Sets the maximum lazy DFA cache size in bytes.
    pub fn dfa_size_limit(mut self, bytes: usize) -> GrepBuilder {
        self.opts.dfa_size_limit = bytes;
        self
    }

    /// Allows `.` to match the line terminator, for multiline patterns
    /// composed against a buffer that spans multiple lines.
    pub fn multi_line_dot(mut self, yes: bool) -> GrepBuilder {
        self.opts.multi_line_dot = yes;
        self
    }

    /// Compiles the pattern, producing a `Grep` or an error describing why
    /// compilation failed.
    pub fn build(self) -> Result<Grep> {
        let mut builder = RegexBuilder::new(&self.pattern);
        builder
            .case_insensitive(self.opts.case_insensitive)
            .multi_line(true)
            .dot_matches_new_line(self.opts.multi_line_dot)
            .unicode(true)
            .size_limit(self.opts.size_limit)
            .dfa_size_limit(self.opts.dfa_size_limit);
        let regex = builder.build()?;
        Ok(Grep {
            regex,
            opts: self.opts,
        })
    }
}

/// A compiled line-oriented matcher.
///
/// `Grep` is cheap to clone (the underlying `Regex` is reference counted)
/// and is safe to share across worker threads.
#[derive(Clone, Debug)]
pub struct Grep {
    regex: Regex,
    opts: Options,
}

impl Grep {
    /// Creates a `Grep` for `pattern` using default options. Equivalent to
    /// `GrepBuilder::new(pattern).build()`.
    pub fn new(pattern: &str) -> Result<Grep> {
        GrepBuilder::new(pattern).build()
    }

    /// Returns the underlying compiled regex, for callers that need direct
    /// access (e.g. to highlight sub-match spans within a matched line).
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Returns true if and only if this regex matches anywhere in `buf`.
    pub fn is_match(&self, buf: &[u8]) -> bool {
        self.regex.is_match(buf)
    }

    /// Returns the first match in `buf` at or after `start`, along with the
    /// byte range of the full line that contains it.
    pub fn read_match(&self, buf: &[u8], start: usize) -> Option<Match> {
        let m = self.regex.find_at(buf, start)?;
        let line_start = find_line_start(buf, m.start(), self.opts.line_terminator);
        let line_end = find_line_end(buf, m.end(), self.opts.line_terminator);
        let line = if self.opts.line_numbers {
            Some(count_lines(buf, line_start, self.opts.line_terminator) + 1)
        } else {
            None
        };
        Some(Match {
            start: line_start,
            end: line_end,
            line,
        })
    }

    /// Returns an iterator over every matching line in `buf`, in order.
    pub fn iter<'b>(&self, buf: &'b [u8]) -> Iter<'_, 'b> {
        Iter {
            grep: self,
            buf,
            pos: 0,
        }
    }
}

fn find_line_start(buf: &[u8], pos: usize, terminator: u8) -> usize {
    if pos == 0 {
        return 0;
    }
    match memrchr(terminator, &buf[..pos]) {
        Some(i) => i + 1,
        None => 0,
    }
}

fn find_line_end(buf: &[u8], pos: usize, terminator: u8) -> usize {
    match memchr(terminator, &buf[pos..]) {
        Some(i) => pos + i + 1,
        None => buf.len(),
    }
}

fn count_lines(buf: &[u8], upto: usize, terminator: u8) -> usize {
    let mut count = 0;
    let mut pos = 0;
    while let Some(i) = memchr(terminator, &buf[pos..upto]) {
        count += 1;
        pos += i + 1;
    }
    count
}

/// An iterator over the matching lines of a buffer.
///
/// Yields one `Match` per matching line; a line with multiple matches is
/// reported once, matching the line-oriented semantics used throughout the
/// rest of the engine.
pub struct Iter<'g, 'b> {
    grep: &'g Grep,
    buf: &'b [u8],
    pos: usize,
}

impl<'g, 'b> Iterator for Iter<'g, 'b> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        if self.pos > self.buf.len() {
            return None;
        }
        let m = self.grep.read_match(self.buf, self.pos)?;
        self.pos = m.end.max(self.pos + 1);
        Some(m)
    }
}

#[cfg(test)]
mod tests {
    use super::GrepBuilder;

    const SHERLOCK: &str = "\
For the Doctor Watsons of this world, as opposed to the Sherlock
Holmeses, success in the province of detective work must always
be, to a very large extent, the result of luck. Sherlock Holmes
can extract a clew from a wisp of straw or a flake of cigar ash;
but Doctor Watson has to have it taken out for him and dusted,
and exhibited clearly, with a label attached.
";

    fn matches(pattern: &str, buf: &[u8]) -> Vec<(usize, usize)> {
        let grep = GrepBuilder::new(pattern).build().unwrap();
        grep.iter(buf).map(|m| (m.start(), m.end())).collect()
    }

    #[test]
    fn basic_search() {
        let ms = matches(r"Watson", SHERLOCK.as_bytes());
        assert_eq!(ms.len(), 2);
    }

    #[test]
    fn case_insensitive() {
        let grep = GrepBuilder::new("sherlock")
            .case_insensitive(true)
            .build()
            .unwrap();
        let ms: Vec<_> = grep.iter(SHERLOCK.as_bytes()).collect();
        assert_eq!(ms.len(), 2);
    }

    #[test]
    fn line_numbers() {
        let grep = GrepBuilder::new("Watson")
            .line_numbers(true)
            .build()
            .unwrap();
        let ms: Vec<_> = grep.iter(SHERLOCK.as_bytes()).map(|m| m.line()).collect();
        assert_eq!(ms, vec![Some(1), Some(5)]);
    }

    #[test]
    fn no_match() {
        assert!(matches("xyzzy_not_present", SHERLOCK.as_bytes()).is_empty());
    }

    #[test]
    fn literal_terminator_spans_lines() {
        let grep = GrepBuilder::new("foo\nbar").build().unwrap();
        assert!(grep.is_match(b"foo\nbar\n"));
        assert!(!grep.is_match(b"foo bar\n"));
    }

    #[test]
    fn multi_line_match_reports_full_span() {
        let grep = GrepBuilder::new(r"begin(.|\n)*?end").build().unwrap();
        let buf = b"begin\nmid\nend\nother\n";
        let m = grep.regex().find(buf).unwrap();
        assert_eq!(&buf[m.start()..m.end()], b"begin\nmid\nend");
    }
}
