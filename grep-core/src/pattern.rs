//! Pattern string preprocessing: the parts of C1 that operate on the
//! pattern text itself rather than on the compiled automaton.
//!
//! `Grep` matches directly against the buffer handed to it rather than
//! line-by-line, so a pattern containing a literal line terminator (as a
//! multi-line regex like `begin(.|\n)*?end` does) is meaningful here and
//! must not be rejected.

/// Wraps `pattern` so that it only matches on word boundaries, as `-w`
/// does in the original CLI layer.
pub fn word_wrap(pattern: &str) -> String {
    format!(r"\b(?:{})\b", pattern)
}

/// Escapes `literal` so the resulting pattern matches it verbatim, as `-F`
/// does.
pub fn literal_escape(literal: &str) -> String {
    ::regex::escape(literal)
}

/// Joins multiple `-e`/`-f` patterns into a single alternation, mirroring
/// how the CLI layer combines repeated pattern flags. An empty list
/// produces a pattern that can never match rather than an invalid empty
/// alternation.
pub fn join_alternates(patterns: &[String]) -> String {
    if patterns.is_empty() {
        // A pattern that is syntactically valid but unsatisfiable.
        return r"\pZ\A\z".to_string();
    }
    patterns.join("|")
}
