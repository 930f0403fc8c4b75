/*!
`Ignore` aggregates every source of "should this path be skipped" state
that applies during a single traversal: glob overrides, the stack of
ignore files found at each directory level, explicitly-added ignore
files, the file-type matcher, and the hidden-file check. `IgnoreBuilder`
assembles the shared, traversal-wide pieces (overrides, types, flags);
`Ignore` itself is cheap to clone and share one level per directory, with
each level linking back to its parent so a path can be checked against
every ancestor's ignore file without re-reading anything from disk.
*/

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::gitignore::{Gitignore, GitignoreBuilder, Match, Pattern};
use crate::overrides::Override;
use crate::pathutil::is_hidden;
use crate::types::Types;
use crate::{Error, PartialErrorBuilder};

const IGNORE_NAMES: &[&str] = &[".rgignore", ".ignore", ".gitignore"];

#[derive(Debug)]
struct Options {
    hidden: bool,
    no_ignore: bool,
    no_ignore_vcs: bool,
    ignore_names: Vec<&'static str>,
    git_exclude: bool,
    hidden_pattern: Pattern,
}

impl Options {
    fn ignore_file_names(&self) -> Vec<&'static str> {
        self.ignore_names
            .iter()
            .copied()
            .filter(|name| !(self.no_ignore_vcs && *name == ".gitignore"))
            .collect()
    }
}

struct IgnoreInner {
    parent: Option<Ignore>,
    dir: Option<Gitignore>,
    overrides: Arc<Override>,
    types: Arc<Types>,
    explicit: Arc<Vec<Gitignore>>,
    opts: Arc<Options>,
}

/// A single level of accumulated ignore state, shared cheaply across a
/// directory traversal.
#[derive(Clone)]
pub struct Ignore(Arc<IgnoreInner>);

impl Ignore {
    /// Returns whether `path` should be ignored, whitelisted, or left
    /// alone, applying overrides, every ancestor's ignore file, the
    /// explicitly-added ignore files, the file type matcher, and finally
    /// the hidden-file check, in that order of precedence.
    pub fn matched<'a, P: AsRef<Path>>(&'a self, path: P, is_dir: bool) -> Match<'a> {
        let path = path.as_ref();

        let mat = self.0.overrides.matched(path, is_dir);
        if !mat.is_none() {
            return mat;
        }

        let mut whitelisted = false;
        if !self.0.opts.no_ignore {
            let mut cur = Some(self);
            while let Some(ig) = cur {
                if let Some(ref gi) = ig.0.dir {
                    let mat = gi.matched(path, is_dir);
                    if mat.is_ignored() {
                        return mat;
                    } else if !mat.is_none() {
                        whitelisted = true;
                        break;
                    }
                }
                cur = ig.0.parent.as_ref();
            }
            if !whitelisted {
                for gi in self.0.explicit.iter() {
                    let mat = gi.matched(path, is_dir);
                    if mat.is_ignored() {
                        return mat;
                    } else if !mat.is_none() {
                        whitelisted = true;
                        break;
                    }
                }
            }
        }

        let mat = self.0.types.matched(path, is_dir);
        if !mat.is_none() {
            return mat;
        }

        if !whitelisted && self.0.opts.hidden && is_hidden(path) {
            return Match::Ignored(&self.0.opts.hidden_pattern);
        }
        Match::None
    }

    /// Walks up from `path` and returns an `Ignore` whose ancestor chain
    /// includes every directory between the filesystem root and `path`'s
    /// immediate parent, reading ignore files along the way.
    pub fn add_parents<P: AsRef<Path>>(&self, path: P) -> (Ignore, Option<Error>) {
        let path = match path.as_ref().canonicalize() {
            Ok(path) => path,
            Err(err) => return (self.clone(), Some(Error::Io(err))),
        };
        let mut components: Vec<&Path> = path.ancestors().skip(1).collect();
        components.reverse();

        let mut errs = PartialErrorBuilder::default();
        let mut ig = self.clone();
        for dir in components {
            let (next, err) = ig.add_child(dir);
            ig = next;
            if let Some(err) = err {
                errs.push(err);
            }
        }
        (ig, errs.into_error_option())
    }

    /// Returns a new `Ignore` one level deeper than `self`, reading any
    /// ignore files found directly inside `dir`.
    pub fn add_child<P: AsRef<Path>>(&self, dir: P) -> (Ignore, Option<Error>) {
        let dir = dir.as_ref();
        let mut errs = PartialErrorBuilder::default();
        let names = self.0.opts.ignore_file_names();
        let mut builder = GitignoreBuilder::new(dir);
        let mut found_any = false;
        for name in &names {
            let candidate = dir.join(name);
            if candidate.exists() {
                found_any = true;
                if let Some(err) = builder.add(&candidate) {
                    errs.push(err);
                }
            }
        }
        if self.0.opts.git_exclude && dir.join(".git").is_dir() {
            let candidate = dir.join(".git").join("info").join("exclude");
            if candidate.exists() {
                found_any = true;
                if let Some(err) = builder.add(&candidate) {
                    errs.push(err);
                }
            }
        }
        let gi = if found_any {
            match builder.build() {
                Ok(gi) => Some(gi),
                Err(err) => {
                    errs.push(err);
                    None
                }
            }
        } else {
            None
        };
        let ig = Ignore(Arc::new(IgnoreInner {
            parent: Some(self.clone()),
            dir: gi,
            overrides: Arc::clone(&self.0.overrides),
            types: Arc::clone(&self.0.types),
            explicit: Arc::clone(&self.0.explicit),
            opts: Arc::clone(&self.0.opts),
        }));
        (ig, errs.into_error_option())
    }

    /// Returns the parent level, if any.
    pub fn parent(&self) -> Option<Ignore> {
        self.0.parent.clone()
    }
}

/// Builds the traversal-wide state shared by every `Ignore` level.
pub struct IgnoreBuilder {
    overrides: Override,
    types: Types,
    explicit: Vec<Gitignore>,
    hidden: bool,
    no_ignore: bool,
    no_ignore_vcs: bool,
    git_exclude: bool,
    git_global: bool,
}

impl IgnoreBuilder {
    /// Creates a builder with every ignore source enabled by default.
    pub fn new() -> IgnoreBuilder {
        IgnoreBuilder {
            overrides: Override::empty(),
            types: Types::empty(),
            explicit: vec![],
            hidden: true,
            no_ignore: false,
            no_ignore_vcs: false,
            git_exclude: true,
            git_global: true,
        }
    }

    /// Builds the root `Ignore` level.
    pub fn build(&self) -> Ignore {
        let mut explicit = self.explicit.clone();
        if self.git_global && !self.no_ignore {
            if let Some(gi) = global_gitignore() {
                explicit.insert(0, gi);
            }
        }
        let opts = Options {
            hidden: self.hidden,
            no_ignore: self.no_ignore,
            no_ignore_vcs: self.no_ignore_vcs,
            ignore_names: IGNORE_NAMES.to_vec(),
            git_exclude: self.git_exclude && !self.no_ignore,
            hidden_pattern: Pattern {
                from: Path::new("<hidden>").to_path_buf(),
                original: "<hidden>".to_string(),
                whitelist: false,
                only_dir: false,
            },
        };
        Ignore(Arc::new(IgnoreInner {
            parent: None,
            dir: None,
            overrides: Arc::new(self.overrides.clone()),
            types: Arc::new(self.types.clone()),
            explicit: Arc::new(explicit),
            opts: Arc::new(opts),
        }))
    }

    /// Adds an explicit ignore file, checked after every per-directory
    /// ignore file but before the file-type matcher.
    pub fn add_ignore(&mut self, gi: Gitignore) -> &mut IgnoreBuilder {
        self.explicit.push(gi);
        self
    }

    /// Sets the glob override matcher.
    pub fn overrides(&mut self, overrides: Override) -> &mut IgnoreBuilder {
        self.overrides = overrides;
        self
    }

    /// Sets the file type matcher.
    pub fn types(&mut self, types: Types) -> &mut IgnoreBuilder {
        self.types = types;
        self
    }

    /// Enables ignoring hidden files.
    pub fn hidden(&mut self, yes: bool) -> &mut IgnoreBuilder {
        self.hidden = yes;
        self
    }

    /// When set, no ignore files (of any kind) are read at all.
    pub fn ignore(&mut self, yes: bool) -> &mut IgnoreBuilder {
        self.no_ignore = !yes;
        self
    }

    /// When set, `.gitignore` files are not read.
    pub fn git_ignore(&mut self, yes: bool) -> &mut IgnoreBuilder {
        self.no_ignore_vcs = !yes;
        self
    }

    /// When set, `.git/info/exclude` is not read.
    pub fn git_exclude(&mut self, yes: bool) -> &mut IgnoreBuilder {
        self.git_exclude = yes;
        self
    }

    /// When set, the global gitignore (`core.excludesFile`) is not read.
    pub fn git_global(&mut self, yes: bool) -> &mut IgnoreBuilder {
        self.git_global = yes;
        self
    }
}

impl Default for IgnoreBuilder {
    fn default() -> IgnoreBuilder {
        IgnoreBuilder::new()
    }
}

/// Reads the globally configured gitignore file, if one can be found.
///
/// This is a best-effort lookup: it checks `$XDG_CONFIG_HOME/git/ignore`
/// and falls back to `$HOME/.config/git/ignore`. It does not parse
/// `.gitconfig` for a `core.excludesFile` override.
fn global_gitignore() -> Option<Gitignore> {
    let path = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .map(|config| config.join("git").join("ignore"))?;
    if !path.exists() {
        return None;
    }
    let mut builder = GitignoreBuilder::new("/");
    if builder.add(&path).is_some() {
        return None;
    }
    builder.build().ok()
}

#[cfg(test)]
mod tests {
    use super::IgnoreBuilder;

    #[test]
    fn default_matcher_is_permissive() {
        let ig = IgnoreBuilder::new().git_global(false).build();
        assert!(!ig.matched("src/main.rs", false).is_ignore());
    }

    #[test]
    fn hidden_files_are_ignored_by_default() {
        let ig = IgnoreBuilder::new().git_global(false).build();
        assert!(ig.matched(".hidden", false).is_ignore());
    }

    #[test]
    fn hidden_can_be_disabled() {
        let ig = IgnoreBuilder::new().git_global(false).hidden(false).build();
        assert!(!ig.matched(".hidden", false).is_ignore());
    }
}
