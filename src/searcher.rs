//! Line/stream matching (spec component C3): runs a compiled pattern over
//! one already-decoded buffer, building context-bearing `MatchRecord`s and
//! handling binary detection, invert-match, unique-line suppression and
//! the early-exit flags (`-l`, `-L`, `-q`, `-m`).

use memchr::memchr;

use grep_core::{FuzzySpec, Grep};

use crate::source::MatchRecord;

/// Controls how a buffer is searched, independent of the pattern itself.
#[derive(Clone, Debug)]
pub struct SearchOptions {
    /// Report lines that do *not* match instead of ones that do.
    pub invert_match: bool,
    /// Stop after this many matching lines (or non-matching, if
    /// inverted).
    pub max_count: Option<u64>,
    /// Lines of context to include before each match.
    pub before_context: usize,
    /// Lines of context to include after each match.
    pub after_context: usize,
    /// Search binary content as if it were text instead of skipping it.
    pub text: bool,
    /// Suppress duplicate matched lines within one source.
    pub unique: bool,
}

impl Default for SearchOptions {
    fn default() -> SearchOptions {
        SearchOptions {
            invert_match: false,
            max_count: None,
            before_context: 0,
            after_context: 0,
            text: false,
            unique: false,
        }
    }
}

/// What came out of searching one buffer.
pub struct SearchOutcome {
    /// Matches found, oldest first.
    pub matches: Vec<MatchRecord>,
    /// True if the buffer was classified as binary and searching stopped
    /// (unless `SearchOptions::text` was set).
    pub binary_detected: bool,
}

/// The first 1024 bytes of PDF content, used to recognize PDFs as binary
/// even though they're often mostly printable ASCII.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Returns true if `buf` looks like binary content: it starts with the PDF
/// signature, or a NUL byte appears in its first 1024 bytes.
pub fn is_binary(buf: &[u8]) -> bool {
    if buf.starts_with(PDF_MAGIC) {
        return true;
    }
    let scan_len = buf.len().min(1024);
    memchr(b'\0', &buf[..scan_len]).is_some()
}

/// Searches `buf` with an exact/regex pattern, producing one `MatchRecord`
/// per matching (or, if inverted, non-matching) line.
///
/// `invalid_utf8` reports whether `buf` needed lossy decoding on its way out
/// of `encoding::normalize`; that counts as binary content just as much as a
/// NUL byte does.
pub fn search_exact(grep: &Grep, buf: &[u8], opts: &SearchOptions, invalid_utf8: bool) -> SearchOutcome {
    if !opts.text && (is_binary(buf) || invalid_utf8) {
        return SearchOutcome { matches: Vec::new(), binary_detected: true };
    }

    let records = if opts.invert_match {
        let matched_lines = collect_matched_lines(grep, buf);
        build_inverted_records(buf, &matched_lines, opts)
    } else {
        build_matched_records(grep, buf, opts)
    };
    SearchOutcome { matches: records, binary_detected: false }
}

/// Searches `buf` with a fuzzy pattern spec, producing one `MatchRecord`
/// per matching line and recording each match's edit distance.
pub fn search_fuzzy(spec: &FuzzySpec, buf: &[u8], opts: &SearchOptions, invalid_utf8: bool) -> SearchOutcome {
    if !opts.text && (is_binary(buf) || invalid_utf8) {
        return SearchOutcome { matches: Vec::new(), binary_detected: true };
    }
    let text = String::from_utf8_lossy(buf);
    let mut records = Vec::new();
    let mut seen = std::collections::HashSet::new();
    let mut line_start = 0usize;
    let mut line_no = 1u64;
    for line in text.split_inclusive('\n') {
        let hits = spec.find_all(line);
        if !hits.is_empty() {
            if opts.unique {
                let key = line.to_string();
                if !seen.insert(key) {
                    line_start += line.len();
                    line_no += 1;
                    continue;
                }
            }
            let best = hits.iter().min_by_key(|h| h.distance()).unwrap();
            records.push(MatchRecord {
                line: line_no,
                column: best.start(),
                byte_offset: (line_start + best.start()) as u64,
                text: line.as_bytes().to_vec(),
                match_span: (best.start(), best.end()),
                capture_spans: Vec::new(),
                fuzzy_cost: Some(best.distance() as u32),
                is_binary: false,
                before_context: Vec::new(),
                after_context: Vec::new(),
            });
            if let Some(max) = opts.max_count {
                if records.len() as u64 >= max {
                    break;
                }
            }
        }
        line_start += line.len();
        line_no += 1;
    }
    attach_context(buf, &mut records, opts);
    SearchOutcome { matches: records, binary_detected: false }
}

/// 1-based line numbers that contain at least one match.
fn collect_matched_lines(grep: &Grep, buf: &[u8]) -> Vec<u64> {
    let mut lines = Vec::new();
    for m in grep.iter(buf) {
        let line = line_number_at(buf, m.start());
        if lines.last() != Some(&line) {
            lines.push(line);
        }
    }
    lines
}

/// `Grep::iter` only reports which lines matched, not where within the
/// line; the exact sub-match span used for highlighting and column
/// numbers is recovered here by re-running the compiled regex over just
/// that line's bytes.
fn build_matched_records(grep: &Grep, buf: &[u8], opts: &SearchOptions) -> Vec<MatchRecord> {
    let mut records = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for m in grep.iter(buf) {
        let line_bytes = &buf[m.start()..m.end()];
        if opts.unique && !seen.insert(line_bytes.to_vec()) {
            continue;
        }
        let span = grep
            .regex()
            .find(line_bytes)
            .map(|sm| (sm.start(), sm.end()))
            .unwrap_or((0, line_bytes.len()));
        records.push(MatchRecord {
            line: line_number_at(buf, m.start()),
            column: span.0,
            byte_offset: (m.start() + span.0) as u64,
            text: line_bytes.to_vec(),
            match_span: span,
            capture_spans: Vec::new(),
            fuzzy_cost: None,
            is_binary: false,
            before_context: Vec::new(),
            after_context: Vec::new(),
        });
        if let Some(max) = opts.max_count {
            if records.len() as u64 >= max {
                break;
            }
        }
    }
    attach_context(buf, &mut records, opts);
    records
}

fn build_inverted_records(
    buf: &[u8],
    matched_lines: &[u64],
    opts: &SearchOptions,
) -> Vec<MatchRecord> {
    let matched: std::collections::HashSet<u64> = matched_lines.iter().copied().collect();
    let mut records = Vec::new();
    let mut offset = 0usize;
    let mut line_no = 1u64;
    for line in split_lines(buf) {
        if !matched.contains(&line_no) {
            records.push(MatchRecord {
                line: line_no,
                column: 0,
                byte_offset: offset as u64,
                text: line.to_vec(),
                match_span: (0, 0),
                capture_spans: Vec::new(),
                fuzzy_cost: None,
                is_binary: false,
                before_context: Vec::new(),
                after_context: Vec::new(),
            });
            if let Some(max) = opts.max_count {
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

/// Fills in `before_context`/`after_context` on each record by re-scanning
/// the buffer's lines around each match's line number.
fn attach_context(buf: &[u8], records: &mut [MatchRecord], opts: &SearchOptions) {
    if opts.before_context == 0 && opts.after_context == 0 {
        return;
    }
    let lines: Vec<(u64, &[u8])> =
        split_lines(buf).into_iter().enumerate().map(|(i, l)| (i as u64 + 1, l)).collect();
    for record in records.iter_mut() {
        let idx = match lines.iter().position(|&(n, _)| n == record.line) {
            Some(i) => i,
            None => continue,
        };
        let before_start = idx.saturating_sub(opts.before_context);
        record.before_context =
            lines[before_start..idx].iter().map(|&(n, l)| (n, l.to_vec())).collect();
        let after_end = (idx + 1 + opts.after_context).min(lines.len());
        record.after_context =
            lines[idx + 1..after_end].iter().map(|&(n, l)| (n, l.to_vec())).collect();
    }
}

/// The 1-based line number containing byte offset `pos`, computed
/// independently of whether the `Grep` that produced `pos` was built with
/// line counting enabled.
fn line_number_at(buf: &[u8], pos: usize) -> u64 {
    memchr::memchr_iter(b'\n', &buf[..pos]).count() as u64 + 1
}

pub(crate) fn split_lines(buf: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    while start < buf.len() {
        let end = match memchr(b'\n', &buf[start..]) {
            Some(rel) => start + rel + 1,
            None => buf.len(),
        };
        lines.push(&buf[start..end]);
        start = end;
    }
    lines
}


#[cfg(test)]
mod tests {
    use super::*;
    use grep_core::GrepBuilder;

    const SHERLOCK: &[u8] = b"For the Doctor Watsons of this world, as opposed to the\n\
Sherlock Holmeses, success in the province of detective work must always\n\
be, to a very large extent, the result of luck.\n\
Sherlock Holmes never made any such claims.\n";

    #[test]
    fn finds_exact_matches() {
        let grep = GrepBuilder::new("Sherlock").build().unwrap();
        let outcome = search_exact(&grep, SHERLOCK, &SearchOptions::default(), false);
        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(outcome.matches[0].line, 2);
        assert_eq!(outcome.matches[1].line, 4);
    }

    #[test]
    fn inverts_matches() {
        let grep = GrepBuilder::new("Sherlock").build().unwrap();
        let opts = SearchOptions { invert_match: true, ..Default::default() };
        let outcome = search_exact(&grep, SHERLOCK, &opts, false);
        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(outcome.matches[0].line, 1);
        assert_eq!(outcome.matches[1].line, 3);
    }

    #[test]
    fn respects_max_count() {
        let grep = GrepBuilder::new("Sherlock").build().unwrap();
        let opts = SearchOptions { max_count: Some(1), ..Default::default() };
        let outcome = search_exact(&grep, SHERLOCK, &opts, false);
        assert_eq!(outcome.matches.len(), 1);
    }

    #[test]
    fn detects_binary_content() {
        let grep = GrepBuilder::new("x").build().unwrap();
        let buf = b"has a \0 nul byte and x";
        let outcome = search_exact(&grep, buf, &SearchOptions::default(), false);
        assert!(outcome.binary_detected);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn invalid_utf8_is_treated_as_binary() {
        let grep = GrepBuilder::new("x").build().unwrap();
        let outcome = search_exact(&grep, b"plain text x", &SearchOptions::default(), true);
        assert!(outcome.binary_detected);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn attaches_before_and_after_context() {
        let grep = GrepBuilder::new("result of luck").build().unwrap();
        let opts = SearchOptions { before_context: 1, after_context: 1, ..Default::default() };
        let outcome = search_exact(&grep, SHERLOCK, &opts, false);
        assert_eq!(outcome.matches.len(), 1);
        let m = &outcome.matches[0];
        assert_eq!(m.before_context.len(), 1);
        assert_eq!(m.after_context.len(), 1);
    }

    #[test]
    fn fuzzy_search_reports_distance() {
        let spec = FuzzySpec::new("Sherlok", 1, true, true, true);
        let outcome = search_fuzzy(&spec, SHERLOCK, &SearchOptions::default(), false);
        assert!(!outcome.matches.is_empty());
        assert!(outcome.matches[0].fuzzy_cost.unwrap() <= 1);
    }
}
