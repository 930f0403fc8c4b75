/*!
The gitignore module provides a way of reading a gitignore file and
applying it to a particular path to determine whether it should be
ignored. A single gitignore file is compiled into a single glob `Set`,
which reports every pattern that matches a candidate path; the
highest-numbered match wins, mirroring the "last matching pattern in the
file decides" rule `man gitignore` documents.
*/

use std::fs::File;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use globset::{self, PatternBuilder, Set, SetBuilder};

use crate::pathutil::{is_file_name, strip_prefix};

/// An error that can occur when parsing a gitignore file.
#[derive(Debug)]
pub enum Error {
    /// A glob pattern in the file could not be compiled.
    Glob(globset::Error),
    /// An I/O error reading the file.
    Io(io::Error),
}

impl ::std::error::Error for Error {
    fn source(&self) -> Option<&(dyn ::std::error::Error + 'static)> {
        match *self {
            Error::Glob(ref err) => Some(err),
            Error::Io(ref err) => Some(err),
        }
    }
}

impl ::std::fmt::Display for Error {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match *self {
            Error::Glob(ref err) => err.fmt(f),
            Error::Io(ref err) => err.fmt(f),
        }
    }
}

impl From<globset::Error> for Error {
    fn from(err: globset::Error) -> Error {
        Error::Glob(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

/// A single pattern parsed out of a gitignore-style file.
#[derive(Clone, Debug)]
pub struct Pattern {
    /// The file this pattern came from (may be empty for in-memory rules).
    pub from: PathBuf,
    /// The pattern exactly as written in the file.
    pub original: String,
    /// Whether a leading `!` marked this as a whitelist rule.
    pub whitelist: bool,
    /// Whether a trailing `/` restricts this rule to directories.
    pub only_dir: bool,
}

/// The result of matching a path against a `Gitignore`.
#[derive(Clone, Debug)]
pub enum Match<'a> {
    /// No pattern in the file matched.
    None,
    /// The path should be ignored.
    Ignored(&'a Pattern),
    /// The path should be whitelisted, overriding an earlier ignore match.
    Whitelist(&'a Pattern),
}

impl<'a> Match<'a> {
    /// True if this match says the path should be ignored.
    pub fn is_ignored(&self) -> bool {
        matches!(*self, Match::Ignored(_))
    }

    /// Alias for `is_ignored`, read more naturally at a directory-walk
    /// call site.
    pub fn is_ignore(&self) -> bool {
        self.is_ignored()
    }

    /// True if this match explicitly whitelisted the path.
    pub fn is_whitelist(&self) -> bool {
        matches!(*self, Match::Whitelist(_))
    }

    /// True if nothing matched.
    pub fn is_none(&self) -> bool {
        matches!(*self, Match::None)
    }

    /// Swaps `Ignored` and `Whitelist`; used by the file-type matcher,
    /// which expresses "matches this type" via whitelist-shaped rules but
    /// wants "doesn't match any selected type" to read as ignored.
    pub fn invert(self) -> Match<'a> {
        match self {
            Match::None => Match::None,
            Match::Ignored(p) => Match::Whitelist(p),
            Match::Whitelist(p) => Match::Ignored(p),
        }
    }
}

/// A compiled matcher for the glob patterns in a single gitignore-style
/// file.
#[derive(Clone, Debug)]
pub struct Gitignore {
    set: Set,
    root: PathBuf,
    patterns: Vec<Pattern>,
    num_ignores: u64,
}

impl Gitignore {
    /// Builds a matcher directly from a string containing gitignore-style
    /// rules, rooted at `root`. Exposed for tests and for in-memory rule
    /// sources such as `--ignore-files`-style config-provided patterns.
    pub fn from_str<P: AsRef<Path>>(root: P, contents: &str) -> Result<Gitignore, Error> {
        let mut builder = GitignoreBuilder::new(root);
        builder.add_str(contents)?;
        builder.build()
    }

    /// Matches `path` (which may or may not already have been stripped of
    /// this gitignore's root prefix) against the file's patterns.
    pub fn matched<P: AsRef<Path>>(&self, path: P, is_dir: bool) -> Match {
        let mut path = path.as_ref();
        if let Some(p) = strip_prefix("./", path) {
            path = p;
        }
        if !is_file_name(path) {
            if let Some(p) = strip_prefix(&self.root, path) {
                path = p;
            }
        }
        if let Some(p) = strip_prefix("/", path) {
            path = p;
        }
        self.matched_stripped(path, is_dir)
    }

    /// Like `matched`, but assumes `path` is already relative to the root
    /// of this gitignore file.
    pub fn matched_stripped(&self, path: &Path, is_dir: bool) -> Match {
        let indices = self.set.matches(path);
        for &i in indices.iter().rev() {
            let pat = &self.patterns[i];
            if !pat.only_dir || is_dir {
                return if pat.whitelist {
                    Match::Whitelist(pat)
                } else {
                    Match::Ignored(pat)
                };
            }
        }
        Match::None
    }

    /// A UTF-8 convenience wrapper over `matched`.
    pub fn matched_utf8(&self, path: &str, is_dir: bool) -> Match {
        self.matched(Path::new(path), is_dir)
    }

    /// The total number of ignore (non-whitelist) patterns.
    pub fn num_ignores(&self) -> u64 {
        self.num_ignores
    }
}

/// Builds a `Gitignore` matcher, one rule at a time.
#[derive(Clone)]
pub struct GitignoreBuilder {
    builder: SetBuilder,
    root: PathBuf,
    patterns: Vec<Pattern>,
}

impl GitignoreBuilder {
    /// Creates a builder rooted at `root`: the directory relative to which
    /// non-absolute patterns are matched.
    pub fn new<P: AsRef<Path>>(root: P) -> GitignoreBuilder {
        let root = strip_prefix("./", root.as_ref()).unwrap_or_else(|| root.as_ref());
        GitignoreBuilder {
            builder: SetBuilder::new(),
            root: root.to_path_buf(),
            patterns: vec![],
        }
    }

    /// Builds the matcher from every rule added so far.
    pub fn build(self) -> Result<Gitignore, Error> {
        let num_ignores = self.patterns.iter().filter(|p| !p.whitelist).count() as u64;
        Ok(Gitignore {
            set: self.builder.build()?,
            root: self.root,
            patterns: self.patterns,
            num_ignores,
        })
    }

    /// Reads and adds every line of the gitignore file at `path`.
    pub fn add<P: AsRef<Path>>(&mut self, path: P) -> Option<Error> {
        let result = (|| -> Result<(), Error> {
            let file = File::open(&path)?;
            debug!("gitignore: {}", path.as_ref().display());
            for line in io::BufReader::new(file).lines() {
                self.add_line(&path, &line?)?;
            }
            Ok(())
        })();
        result.err()
    }

    /// Adds every line of `contents`, with no associated file path.
    pub fn add_str(&mut self, contents: &str) -> Result<(), Error> {
        for line in contents.lines() {
            self.add_line("", line)?;
        }
        Ok(())
    }

    /// Adds a single gitignore rule line, rooted at `from` for diagnostics.
    pub fn add_line<P: AsRef<Path>>(&mut self, from: P, mut line: &str) -> Result<(), Error> {
        if line.starts_with('#') {
            return Ok(());
        }
        if !line.ends_with("\\ ") {
            line = line.trim_end();
        }
        if line.is_empty() {
            return Ok(());
        }

        let mut pat = Pattern {
            from: from.as_ref().to_path_buf(),
            original: line.to_string(),
            whitelist: false,
            only_dir: false,
        };
        let mut literal_separator = false;
        let has_slash = line.contains('/');
        let is_absolute = line.starts_with('/');

        if line.starts_with("\\!") || line.starts_with("\\#") {
            line = &line[1..];
        } else {
            if line.starts_with('!') {
                pat.whitelist = true;
                line = &line[1..];
            }
            if line.starts_with('/') {
                literal_separator = true;
                line = &line[1..];
            }
        }
        if let Some(stripped) = line.strip_suffix('/') {
            pat.only_dir = true;
            line = stripped;
        }
        let mut glob = line.to_string();
        if has_slash {
            literal_separator = true;
        }
        if !is_absolute && !glob.starts_with("**/") {
            glob = format!("**/{}", glob);
        }
        if let Some(stripped) = glob.strip_suffix("/**") {
            glob = format!("{}/*", stripped);
        }

        let compiled = PatternBuilder::new(&glob)
            .literal_separator(literal_separator)
            .build()?;
        self.builder.add(compiled);
        self.patterns.push(pat);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Gitignore;

    const ROOT: &str = "/home/foobar/rust/rg";

    fn is_ignored(root: &str, rules: &str, path: &str, is_dir: bool) -> bool {
        Gitignore::from_str(root, rules).unwrap().matched(path, is_dir).is_ignored()
    }

    #[test]
    fn simple_literal() {
        assert!(is_ignored(ROOT, "months", "months", false));
        assert!(!is_ignored(ROOT, "months", "amonths", false));
    }

    #[test]
    fn extension_glob() {
        assert!(is_ignored(ROOT, "*.lock", "Cargo.lock", false));
        assert!(is_ignored(ROOT, "*.rs", "src/main.rs", false));
    }

    #[test]
    fn rooted_pattern() {
        assert!(is_ignored(ROOT, "/*.c", "cat-file.c", false));
        assert!(!is_ignored(ROOT, "/*.c", "mozilla-sha1/sha1.c", false));
    }

    #[test]
    fn whitelist_overrides_earlier_ignore() {
        assert!(!is_ignored(ROOT, "*.rs\n!src/main.rs", "src/main.rs", false));
        assert!(is_ignored(ROOT, "!src/main.rs\n*.rs", "src/main.rs", false));
    }

    #[test]
    fn directory_only() {
        assert!(is_ignored(ROOT, "foo/", "foo", true));
        assert!(!is_ignored(ROOT, "foo/", "foo", false));
    }

    #[test]
    fn double_star_recursive() {
        assert!(is_ignored(ROOT, "**/foo", "foo", false));
        assert!(is_ignored(ROOT, "**/foo", "src/foo", false));
        assert!(is_ignored(ROOT, "**/foo/**", "src/foo/bar", false));
    }

    #[test]
    fn comments_and_blank_lines_skipped() {
        assert!(!is_ignored(ROOT, "#foo", "#foo", false));
        assert!(!is_ignored(ROOT, "\n\n\n", "foo", false));
    }
}
