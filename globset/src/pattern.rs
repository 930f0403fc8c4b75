//! Translates a single shell glob pattern into a regular expression.
//!
//! Supports `?`, `*`, `**` (recursive wildcard, only meaningful adjacent to
//! a path separator or the start/end of the glob), bracket classes
//! (`[abc]`, `[a-z]`, `[!...]`/`[^...]`) and brace alternation
//! (`{a,b,c}`), matching the subset of glob syntax that gitignore-style
//! ignore files and `-g`/`-O` selectors need.

use std::path::Path;

use regex::bytes::{Regex, RegexBuilder};

use crate::Error;
use crate::pathutil::path_bytes;

/// Builds a [`Pattern`] from a glob string.
#[derive(Clone, Debug)]
pub struct PatternBuilder {
    glob: String,
    literal_separator: bool,
    case_insensitive: bool,
}

impl PatternBuilder {
    /// Starts building a pattern for the given glob.
    pub fn new(glob: &str) -> PatternBuilder {
        PatternBuilder {
            glob: glob.to_string(),
            literal_separator: false,
            case_insensitive: false,
        }
    }

    /// When enabled, `*` and `?` will not match the path separator `/`.
    /// gitignore-style patterns that contain an internal `/` set this.
    pub fn literal_separator(&mut self, yes: bool) -> &mut PatternBuilder {
        self.literal_separator = yes;
        self
    }

    /// Enables case-insensitive matching.
    pub fn case_insensitive(&mut self, yes: bool) -> &mut PatternBuilder {
        self.case_insensitive = yes;
        self
    }

    /// Compiles the glob into a [`Pattern`].
    pub fn build(&self) -> Result<Pattern, Error> {
        let re_str = translate(&self.glob, self.literal_separator)?;
        let regex = RegexBuilder::new(&re_str)
            .case_insensitive(self.case_insensitive)
            .dot_matches_new_line(true)
            .unicode(false)
            .size_limit(10 * (1 << 20))
            .build()
            .map_err(|err| Error::Regex(err.to_string()))?;
        Ok(Pattern {
            glob: self.glob.clone(),
            regex_str: re_str,
            regex,
        })
    }
}

/// A single compiled glob pattern.
#[derive(Clone, Debug)]
pub struct Pattern {
    glob: String,
    regex_str: String,
    regex: Regex,
}

impl Pattern {
    /// The original glob string this pattern was built from.
    pub fn glob(&self) -> &str {
        &self.glob
    }

    /// The regular expression this glob was translated into.
    pub fn regex(&self) -> &str {
        &self.regex_str
    }
}

/// Implemented by anything that can test whether a path matches it. Kept
/// as a trait (rather than an inherent method only) so callers generic
/// over "a thing that matches paths" can be written against [`Pattern`]
/// and `Regex` uniformly.
pub trait PatternMatcher {
    /// Returns true if `path` matches.
    fn is_match<P: AsRef<Path>>(&self, path: P) -> bool;
}

impl PatternMatcher for Pattern {
    fn is_match<P: AsRef<Path>>(&self, path: P) -> bool {
        self.regex.is_match(&path_bytes(path.as_ref()))
    }
}

/// Translates a glob string into an anchored regular expression string.
fn translate(glob: &str, literal_separator: bool) -> Result<String, Error> {
    let chars: Vec<char> = glob.chars().collect();
    let mut re = String::from("(?-u)^");
    translate_into(&chars, 0, chars.len(), literal_separator, &mut re)?;
    re.push('$');
    Ok(re)
}

fn translate_into(
    chars: &[char],
    mut i: usize,
    end: usize,
    literal_separator: bool,
    re: &mut String,
) -> Result<(), Error> {
    while i < end {
        let c = chars[i];
        match c {
            '?' => {
                re.push_str(if literal_separator { "[^/]" } else { "." });
                i += 1;
            }
            '*' => {
                if i + 1 < end && chars[i + 1] == '*' {
                    let prev_ok = i == 0 || chars[i - 1] == '/';
                    let after = i + 2;
                    let next_ok = after >= end || chars[after] == '/';
                    if prev_ok && next_ok && literal_separator {
                        if after < end {
                            re.push_str("(?:.*/)?");
                            i = after + 1;
                        } else {
                            re.push_str(".*");
                            i = after;
                        }
                        continue;
                    }
                }
                re.push_str(if literal_separator { "[^/]*" } else { ".*" });
                i += 1;
            }
            '[' => {
                let close = find_class_end(chars, i, end)?;
                translate_class(&chars[i..=close], re);
                i = close + 1;
            }
            '{' => {
                let close = find_matching_brace(chars, i, end)?;
                let branches = split_top_level_commas(&chars[i + 1..close]);
                re.push_str("(?:");
                for (n, branch) in branches.iter().enumerate() {
                    if n > 0 {
                        re.push('|');
                    }
                    translate_into(branch, 0, branch.len(), literal_separator, re)?;
                }
                re.push(')');
                i = close + 1;
            }
            '\\' if i + 1 < end => {
                re.push_str(&regex::escape(&chars[i + 1].to_string()));
                i += 2;
            }
            _ => {
                re.push_str(&regex::escape(&c.to_string()));
                i += 1;
            }
        }
    }
    Ok(())
}

fn find_class_end(chars: &[char], start: usize, end: usize) -> Result<usize, Error> {
    let mut i = start + 1;
    if i < end && (chars[i] == '!' || chars[i] == '^') {
        i += 1;
    }
    if i < end && chars[i] == ']' {
        i += 1;
    }
    while i < end {
        if chars[i] == ']' {
            return Ok(i);
        }
        i += 1;
    }
    Err(Error::UnclosedClass)
}

fn translate_class(class: &[char], re: &mut String) {
    // class[0] == '[', class[last] == ']'.
    let mut i = 1;
    re.push('[');
    if i < class.len() - 1 && (class[i] == '!' || class[i] == '^') {
        re.push('^');
        i += 1;
    }
    let inner: String = class[i..class.len() - 1].iter().collect();
    re.push_str(&inner.replace('\\', "\\\\"));
    re.push(']');
}

fn find_matching_brace(chars: &[char], start: usize, end: usize) -> Result<usize, Error> {
    let mut depth = 0;
    let mut i = start;
    while i < end {
        match chars[i] {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    if depth > 0 {
        Err(Error::UnclosedAlternates)
    } else {
        Err(Error::UnopenedAlternates)
    }
}

fn split_top_level_commas(chars: &[char]) -> Vec<Vec<char>> {
    let mut out = Vec::new();
    let mut depth = 0;
    let mut cur = Vec::new();
    for &c in chars {
        match c {
            '{' => {
                depth += 1;
                cur.push(c);
            }
            '}' => {
                depth -= 1;
                cur.push(c);
            }
            ',' if depth == 0 => {
                out.push(std::mem::take(&mut cur));
            }
            _ => cur.push(c),
        }
    }
    out.push(cur);
    out
}

#[cfg(test)]
mod tests {
    use super::PatternBuilder;

    fn matches(glob: &str, literal_separator: bool, path: &str) -> bool {
        PatternBuilder::new(glob)
            .literal_separator(literal_separator)
            .build()
            .unwrap()
            .regex
            .is_match(path.as_bytes())
    }

    #[test]
    fn star_matches_within_component() {
        assert!(matches("*.rs", true, "main.rs"));
        assert!(!matches("*.rs", true, "src/main.rs"));
    }

    #[test]
    fn double_star_crosses_components() {
        assert!(matches("**/foo", true, "a/b/foo"));
        assert!(matches("**/foo", true, "foo"));
    }

    #[test]
    fn bracket_class() {
        assert!(matches("[abc].rs", true, "a.rs"));
        assert!(!matches("[abc].rs", true, "d.rs"));
    }

    #[test]
    fn negated_bracket_class() {
        assert!(matches("[!abc].rs", true, "d.rs"));
        assert!(!matches("[!abc].rs", true, "a.rs"));
    }

    #[test]
    fn brace_alternation() {
        assert!(matches("*.{rs,toml}", true, "Cargo.toml"));
        assert!(matches("*.{rs,toml}", true, "main.rs"));
        assert!(!matches("*.{rs,toml}", true, "main.go"));
    }
}
