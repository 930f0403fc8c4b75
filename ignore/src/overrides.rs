/*!
Override matchers implement the semantics of `-g`/`--include`/`--exclude`
style glob flags: a set of globs supplied directly on the command line or
via config, always checked before any ignore file.
*/

use std::path::{Path, PathBuf};

use crate::gitignore::{Gitignore, GitignoreBuilder, Match, Pattern};

/// A set of glob overrides supplied by the end user.
///
/// Unlike a `Gitignore`, a non-match against a set containing at least one
/// non-negated glob is itself meaningful: it means the path should be
/// excluded, since overrides are meant to narrow a search down to an
/// explicit whitelist.
#[derive(Clone, Debug)]
pub struct Override {
    gi: Gitignore,
    unmatched_pat: Pattern,
}

impl Override {
    fn new(gi: Gitignore) -> Override {
        Override {
            gi,
            unmatched_pat: Pattern {
                from: Path::new("<argv>").to_path_buf(),
                original: "<unmatched>".to_string(),
                whitelist: false,
                only_dir: false,
            },
        }
    }

    /// An empty override set that matches nothing and has no effect.
    pub fn empty() -> Override {
        Override::new(Gitignore::from_str("", "").expect("empty gitignore builds"))
    }

    /// True if at least one glob was added to this override set.
    pub fn is_empty(&self) -> bool {
        self.gi.num_ignores() == 0 && self.num_whitelists() == 0
    }

    fn num_whitelists(&self) -> u64 {
        // Gitignore only tracks ignore-pattern counts; overrides are
        // rewritten so a bare glob compiles as an ignore pattern.
        0
    }

    /// Matches `path` against the overrides.
    ///
    /// If no overrides were added, always returns `Match::None`. If
    /// overrides were added but none match a non-directory path, the path
    /// is implicitly ignored, since overrides express a whitelist.
    pub fn matched<P: AsRef<Path>>(&self, path: P, is_dir: bool) -> Match {
        let path = path.as_ref();
        let mat = self.gi.matched_stripped(path, is_dir).invert();
        if mat.is_none() && !is_dir && self.gi.num_ignores() > 0 {
            return Match::Ignored(&self.unmatched_pat);
        }
        mat
    }
}

/// Builds an `Override` matcher, one glob at a time.
#[derive(Clone, Debug)]
pub struct OverrideBuilder {
    root: PathBuf,
    builder: GitignoreBuilder,
}

impl OverrideBuilder {
    /// Creates a builder rooted at `root`, the directory relative to which
    /// non-absolute globs are matched.
    pub fn new<P: AsRef<Path>>(root: P) -> OverrideBuilder {
        OverrideBuilder {
            root: root.as_ref().to_path_buf(),
            builder: GitignoreBuilder::new(root),
        }
    }

    /// Builds the override matcher from every glob added so far.
    pub fn build(&self) -> Result<Override, crate::Error> {
        let gi = self.builder.clone().build()?;
        Ok(Override::new(gi))
    }

    /// Adds a single glob.
    ///
    /// Glob semantics mirror `--include`/`--exclude` flags: a leading `!`
    /// marks the glob as an explicit exclusion rather than part of the
    /// whitelist.
    pub fn add(&mut self, glob: &str) -> Result<&mut OverrideBuilder, crate::Error> {
        self.builder.add_line(&self.root, glob)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::OverrideBuilder;

    #[test]
    fn empty_override_matches_nothing() {
        let ov = OverrideBuilder::new("/root").build().unwrap();
        assert!(ov.matched("anything.txt", false).is_none());
    }

    #[test]
    fn whitelist_glob_excludes_others() {
        let mut builder = OverrideBuilder::new("/root");
        builder.add("*.rs").unwrap();
        let ov = builder.build().unwrap();

        assert!(!ov.matched("main.rs", false).is_ignored());
        assert!(ov.matched("main.c", false).is_ignored());
    }

    #[test]
    fn negated_override_excludes_explicitly() {
        let mut builder = OverrideBuilder::new("/root");
        builder.add("*").unwrap();
        builder.add("!*.rs").unwrap();
        let ov = builder.build().unwrap();

        assert!(ov.matched("main.rs", false).is_ignored());
        assert!(!ov.matched("main.c", false).is_ignored());
    }
}
