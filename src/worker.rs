//! Per-source search glue: given one input (a file, stdin, or a nested
//! archive member), normalizes its encoding, recurses into archives and
//! compressed streams up to a configured depth, and runs the configured
//! matcher over whatever plain text comes out.

use std::io::{self, Cursor, Read};

use archive::{self, ContainerReader, Format};
use grep_core::{BoolExpr, FuzzySpec, Grep, Scope};

use crate::encoding;
use crate::searcher::{self, SearchOptions};
use crate::selector::Selector;
use crate::source::{FileResult, InputSource, MatchRecord};

/// The compiled pattern a worker searches with.
pub enum Matcher {
    /// An exact or regex pattern, compiled by `grep-core`, plus an optional
    /// `-N` reject matcher: a candidate is suppressed iff the reject
    /// matcher finds a region of equal-or-greater length fully containing
    /// it on the same line.
    Exact(Grep, Option<Grep>),
    /// A fuzzy pattern, matched by banded edit distance.
    Fuzzy(FuzzySpec),
    /// An `AND`/`OR`/`NOT` combination of patterns (`--query`), evaluated
    /// once per line: a `Scope::Line` leaf tests against that line, a
    /// `Scope::File` leaf against the whole buffer.
    Boolean(BoolExpr<Grep>),
}

/// Bytes read from an archive member, still needing its own recursive
/// classification.
struct Member {
    path: String,
    data: Vec<u8>,
}

/// Searches individual sources, expanding archives and decompressing
/// compressed streams as it goes.
pub struct Worker {
    matcher: Matcher,
    search_opts: SearchOptions,
    selector: Selector,
    /// Maximum archive/decompression nesting depth (`--zmax`).
    zmax: u32,
    /// Skip files larger than this many bytes.
    max_filesize: Option<u64>,
    /// Emit an empty `FileResult` for a top-level source with no matches,
    /// so `-L`/`--files-without-match` can tell "searched, no match" apart
    /// from "never searched at all".
    report_no_match: bool,
}

impl Worker {
    /// Builds a worker around `matcher`.
    pub fn new(
        matcher: Matcher,
        search_opts: SearchOptions,
        selector: Selector,
        zmax: u32,
        max_filesize: Option<u64>,
    ) -> Worker {
        Worker {
            matcher,
            search_opts,
            selector,
            zmax,
            max_filesize,
            report_no_match: false,
        }
    }

    /// Enables reporting empty-match results for `-L`/`--files-without-match`.
    pub fn report_no_match(mut self, yes: bool) -> Worker {
        self.report_no_match = yes;
        self
    }

    /// Returns true if `len` is within the configured size cap.
    pub fn within_size_limit(&self, len: u64) -> bool {
        self.max_filesize.map(|max| len <= max).unwrap_or(true)
    }

    /// Searches one top-level source's raw bytes, recursing into archives
    /// and compressed streams, and returns every `FileResult` with at
    /// least one match.
    pub fn search(&self, source: InputSource, data: Vec<u8>) -> Vec<FileResult> {
        let mut out = Vec::new();
        self.process(source, data, 0, &mut out);
        out
    }

    fn process(&self, source: InputSource, data: Vec<u8>, depth: u32, out: &mut Vec<FileResult>) {
        let header_len = data.len().min(264);
        let format = archive::detect(&data[..header_len]);
        match format {
            Format::Plain => self.process_plain(source, &data, depth, out),
            Format::Zip | Format::Tar | Format::Cpio => {
                if depth >= self.zmax {
                    return;
                }
                if let Ok(members) = self.read_container(format, &data) {
                    for member in members {
                        if !self.selector.matches(&member.path) {
                            continue;
                        }
                        let nested = source.clone().archive_member(member.path.clone());
                        self.process(nested, member.data, depth + 1, out);
                    }
                }
            }
            Format::Compress => {
                // LZW `.Z` streams have no decoder in this build; skip
                // rather than fail the whole traversal.
            }
            _ => {
                if depth >= self.zmax {
                    return;
                }
                if let Ok(decompressed) = decompress_all(format, &data) {
                    let nested = source.clone().decompressed();
                    self.process(nested, decompressed, depth + 1, out);
                }
            }
        }
    }

    fn process_plain(&self, source: InputSource, data: &[u8], depth: u32, out: &mut Vec<FileResult>) {
        let (normalized, invalid_utf8) = encoding::normalize(data);
        let matches = match &self.matcher {
            Matcher::Exact(grep, negative) => {
                let mut matches =
                    searcher::search_exact(grep, &normalized, &self.search_opts, invalid_utf8).matches;
                if let Some(negative) = negative {
                    matches.retain(|m| !is_suppressed(negative, &m.text, m.match_span));
                }
                matches
            }
            Matcher::Fuzzy(spec) => {
                searcher::search_fuzzy(spec, &normalized, &self.search_opts, invalid_utf8).matches
            }
            Matcher::Boolean(expr) => self.search_boolean(expr, &normalized, invalid_utf8),
        };
        if matches.is_empty() {
            if depth == 0 && self.report_no_match {
                out.push(FileResult::new(source));
            }
            return;
        }
        let mut result = FileResult::new(source);
        result.matches = matches;
        out.push(result);
    }

    /// Evaluates a boolean query against `buf`, re-running the tree once
    /// per line (the default `--lines` mode): a `Scope::Line` leaf is
    /// tested against just that line, a `Scope::File` leaf against the
    /// whole buffer. A line that satisfies the tree gets one `MatchRecord`,
    /// highlighting the first leaf that both participated positively in
    /// the satisfying assignment and actually matched that line.
    fn search_boolean(&self, expr: &BoolExpr<Grep>, buf: &[u8], invalid_utf8: bool) -> Vec<MatchRecord> {
        if !self.search_opts.text && (searcher::is_binary(buf) || invalid_utf8) {
            return Vec::new();
        }
        let positive_leaves = expr.highlighted_leaves();
        let mut records = Vec::new();
        let mut offset = 0usize;
        let mut line_no = 1u64;
        for line in searcher::split_lines(buf) {
            let satisfied = expr.eval(&mut |grep, scope| match scope {
                Scope::Line => grep.is_match(line),
                Scope::File => grep.is_match(buf),
            });
            if satisfied {
                let span = positive_leaves
                    .iter()
                    .find_map(|grep| grep.regex().find(line).map(|m| (m.start(), m.end())));
                let (start, end) = span.unwrap_or((0, line.len()));
                records.push(MatchRecord {
                    line: line_no,
                    column: start,
                    byte_offset: (offset + start) as u64,
                    text: line.to_vec(),
                    match_span: (start, end),
                    capture_spans: Vec::new(),
                    fuzzy_cost: None,
                    is_binary: false,
                    before_context: Vec::new(),
                    after_context: Vec::new(),
                });
                if let Some(max) = self.search_opts.max_count {
                    if records.len() as u64 >= max {
                        break;
                    }
                }
            }
            offset += line.len();
            line_no += 1;
        }
        records
    }

    fn read_container(&self, format: Format, data: &[u8]) -> archive::Result<Vec<Member>> {
        let entries = match format {
            Format::Zip => ContainerReader::read_zip(Cursor::new(data))?,
            Format::Tar => ContainerReader::read_tar(Cursor::new(data))?,
            Format::Cpio => ContainerReader::read_cpio(Cursor::new(data))?,
            _ => unreachable!("read_container called with a non-container format"),
        };
        Ok(entries.into_iter().map(|e| Member { path: e.path, data: e.data }).collect())
    }
}

/// True if `negative` matches a region of `line` that fully contains
/// `span` and is at least as long, per the `-N` suppression rule.
fn is_suppressed(negative: &Grep, line: &[u8], span: (usize, usize)) -> bool {
    negative.regex().find_iter(line).any(|m| {
        m.start() <= span.0 && m.end() >= span.1 && (m.end() - m.start()) >= (span.1 - span.0)
    })
}

fn decompress_all(format: Format, data: &[u8]) -> io::Result<Vec<u8>> {
    let mut reader = archive::decompress(format, Cursor::new(data))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grep_core::GrepBuilder;
    use std::path::PathBuf;

    #[test]
    fn searches_plain_text_source() {
        let grep = GrepBuilder::new("Sherlock").build().unwrap();
        let worker = Worker::new(
            Matcher::Exact(grep, None),
            SearchOptions::default(),
            Selector::everything(),
            4,
            None,
        );
        let results = worker.search(
            InputSource::File(PathBuf::from("sherlock.txt")),
            b"Sherlock Holmes lives here\n".to_vec(),
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].matches.len(), 1);
    }

    #[test]
    fn skips_files_over_size_limit() {
        let grep = GrepBuilder::new("x").build().unwrap();
        let worker = Worker::new(
            Matcher::Exact(grep, None),
            SearchOptions::default(),
            Selector::everything(),
            4,
            Some(10),
        );
        assert!(worker.within_size_limit(5));
        assert!(!worker.within_size_limit(20));
    }

    #[test]
    fn finds_nothing_with_no_matches() {
        let grep = GrepBuilder::new("nowhere").build().unwrap();
        let worker = Worker::new(
            Matcher::Exact(grep, None),
            SearchOptions::default(),
            Selector::everything(),
            4,
            None,
        );
        let results =
            worker.search(InputSource::File(PathBuf::from("a.txt")), b"nothing here\n".to_vec());
        assert!(results.is_empty());
    }

    #[test]
    fn negative_pattern_suppresses_contained_matches() {
        let grep = GrepBuilder::new(r"\d+").build().unwrap();
        let negative = GrepBuilder::new(r"0\d+|555").build().unwrap();
        let worker = Worker::new(
            Matcher::Exact(grep, Some(negative)),
            SearchOptions::default(),
            Selector::everything(),
            4,
            None,
        );
        let results = worker.search(
            InputSource::File(PathBuf::from("nums.txt")),
            b"0\n01\n123\n555\n".to_vec(),
        );
        assert_eq!(results.len(), 1);
        let lines: Vec<u64> = results[0].matches.iter().map(|m| m.line).collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn boolean_query_matches_per_line() {
        let a = GrepBuilder::new("foo").build().unwrap();
        let b = GrepBuilder::new("bar").build().unwrap();
        let expr = BoolExpr::And(vec![
            BoolExpr::Leaf(a, Scope::Line),
            BoolExpr::Leaf(b, Scope::Line),
        ]);
        let worker = Worker::new(
            Matcher::Boolean(expr),
            SearchOptions::default(),
            Selector::everything(),
            4,
            None,
        );
        let results = worker.search(
            InputSource::File(PathBuf::from("q.txt")),
            b"foo only\nfoo and bar\nbar only\n".to_vec(),
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].matches.len(), 1);
        assert_eq!(results[0].matches[0].line, 2);
    }
}
