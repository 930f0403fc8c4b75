/*!
Associates glob patterns on file names with named file types, for the
`-t`/`-T` file-type selection flags (spec component C6).
*/

use std::collections::HashMap;
use std::path::Path;

use crate::gitignore::{self, Gitignore, GitignoreBuilder, Match};

const TYPE_EXTENSIONS: &[(&str, &[&str])] = &[
    ("asm", &["*.asm", "*.s", "*.S"]),
    ("awk", &["*.awk"]),
    ("c", &["*.c", "*.h", "*.H"]),
    ("cbor", &["*.cbor"]),
    ("clojure", &["*.clj", "*.cljs"]),
    ("cmake", &["CMakeLists.txt"]),
    ("coffeescript", &["*.coffee"]),
    ("cpp", &["*.C", "*.cc", "*.cpp", "*.cxx", "*.h", "*.H", "*.hh", "*.hpp"]),
    ("csharp", &["*.cs"]),
    ("css", &["*.css"]),
    ("cython", &["*.pyx"]),
    ("dart", &["*.dart"]),
    ("d", &["*.d"]),
    ("elisp", &["*.el"]),
    ("erlang", &["*.erl", "*.hrl"]),
    ("fortran", &["*.f", "*.F", "*.f77", "*.F77", "*.pfo", "*.f90", "*.F90", "*.f95", "*.F95"]),
    ("go", &["*.go"]),
    ("groovy", &["*.groovy"]),
    ("haskell", &["*.hs", "*.lhs"]),
    ("html", &["*.htm", "*.html"]),
    ("java", &["*.java"]),
    ("js", &["*.js"]),
    ("json", &["*.json"]),
    ("jsonl", &["*.jsonl"]),
    ("lisp", &["*.el", "*.jl", "*.lisp", "*.lsp", "*.sc", "*.scm"]),
    ("lua", &["*.lua"]),
    ("m4", &["*.ac", "*.m4"]),
    ("make", &["gnumakefile", "Gnumakefile", "makefile", "Makefile", "*.mk"]),
    ("markdown", &["*.md"]),
    ("matlab", &["*.m"]),
    ("mk", &["mkfile"]),
    ("ml", &["*.ml"]),
    ("objc", &["*.h", "*.m"]),
    ("objcpp", &["*.h", "*.mm"]),
    ("ocaml", &["*.ml", "*.mli", "*.mll", "*.mly"]),
    ("perl", &["*.perl", "*.pl", "*.PL", "*.plh", "*.plx", "*.pm"]),
    ("php", &["*.php", "*.php3", "*.php4", "*.php5", "*.phtml"]),
    ("py", &["*.py"]),
    ("rr", &["*.R"]),
    ("rst", &["*.rst"]),
    ("ruby", &["*.rb"]),
    ("rust", &["*.rs"]),
    ("scala", &["*.scala"]),
    ("sh", &["*.bash", "*.csh", "*.ksh", "*.sh", "*.tcsh"]),
    ("sql", &["*.sql"]),
    ("tex", &["*.tex", "*.cls", "*.sty"]),
    ("txt", &["*.txt"]),
    ("toml", &["*.toml", "Cargo.lock"]),
    ("vala", &["*.vala"]),
    ("vimscript", &["*.vim"]),
    ("xml", &["*.xml"]),
    ("yacc", &["*.y"]),
    ("yaml", &["*.yaml", "*.yml"]),
];

/// Describes all the possible failure conditions for building a file type
/// matcher.
#[derive(Debug)]
pub enum Error {
    /// A type was selected or negated that has no definition.
    UnrecognizedFileType(String),
    /// A user-specified file type definition (`name:glob`) could not be
    /// parsed.
    InvalidDefinition,
    /// The underlying glob matcher failed to build.
    Gitignore(gitignore::Error),
}

impl ::std::error::Error for Error {
    fn source(&self) -> Option<&(dyn ::std::error::Error + 'static)> {
        match *self {
            Error::Gitignore(ref err) => Some(err),
            _ => None,
        }
    }
}

impl ::std::fmt::Display for Error {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match *self {
            Error::UnrecognizedFileType(ref ty) => write!(f, "unrecognized file type: {}", ty),
            Error::InvalidDefinition => write!(
                f,
                "invalid definition (format is type:glob, e.g., html:*.html)"
            ),
            Error::Gitignore(ref err) => err.fmt(f),
        }
    }
}

impl From<gitignore::Error> for Error {
    fn from(err: gitignore::Error) -> Error {
        Error::Gitignore(err)
    }
}

/// A single named file type definition.
#[derive(Clone, Debug)]
pub struct FileTypeDef {
    name: String,
    pats: Vec<String>,
}

impl FileTypeDef {
    /// The type's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The glob patterns used to recognize this file type.
    pub fn patterns(&self) -> &[String] {
        &self.pats
    }
}

/// A compiled file-type matcher.
#[derive(Clone, Debug)]
pub struct Types {
    gi: Option<Gitignore>,
    has_selected: bool,
}

impl Types {
    fn new(gi: Option<Gitignore>, has_selected: bool) -> Types {
        Types { gi, has_selected }
    }

    /// A matcher that never filters anything.
    pub fn empty() -> Types {
        Types::new(None, false)
    }

    /// Returns whether `path` belongs to a selected type (whitelisted), a
    /// negated type (ignored), or neither (`Match::None`). Never applies
    /// to directories.
    pub fn matched<P: AsRef<Path>>(&self, path: P, is_dir: bool) -> Match {
        if is_dir {
            return Match::None;
        }
        let path = path.as_ref();
        match self.gi {
            None => Match::None,
            Some(ref gi) => {
                let mat = gi.matched(path, is_dir).invert();
                if self.has_selected && mat.is_none() {
                    // Selecting at least one type means everything else
                    // should be filtered out, the same way a `!`-only
                    // gitignore whitelists instead of leaving things
                    // untouched.
                    Match::None
                } else {
                    mat
                }
            }
        }
    }

    /// True if at least one type was explicitly selected with `-t`.
    pub fn has_selection(&self) -> bool {
        self.has_selected
    }
}

/// Builds a `Types` matcher from named file type definitions and a set of
/// selections/negations.
#[derive(Clone, Debug, Default)]
pub struct TypesBuilder {
    types: HashMap<String, Vec<String>>,
    select: Vec<String>,
    select_not: Vec<String>,
}

impl TypesBuilder {
    /// Creates an empty builder.
    pub fn new() -> TypesBuilder {
        TypesBuilder::default()
    }

    /// Compiles the current definitions and selections into a `Types`.
    pub fn build(&self) -> Result<Types, Error> {
        if self.select.is_empty() && self.select_not.is_empty() {
            return Ok(Types::new(None, false));
        }
        let mut builder = GitignoreBuilder::new("/");
        for name in &self.select {
            let globs = self
                .types
                .get(name)
                .ok_or_else(|| Error::UnrecognizedFileType(name.clone()))?;
            for glob in globs {
                builder.add_line("<filetype>", glob)?;
            }
        }
        for name in &self.select_not {
            let globs = self
                .types
                .get(name)
                .ok_or_else(|| Error::UnrecognizedFileType(name.clone()))?;
            for glob in globs {
                builder.add_line("<filetype>", &format!("!{}", glob))?;
            }
        }
        Ok(Types::new(Some(builder.build()?), !self.select.is_empty()))
    }

    /// Returns every currently defined file type, sorted by name.
    pub fn definitions(&self) -> Vec<FileTypeDef> {
        let mut defs: Vec<_> = self
            .types
            .iter()
            .map(|(name, pats)| {
                let mut pats = pats.clone();
                pats.sort();
                FileTypeDef { name: name.clone(), pats }
            })
            .collect();
        defs.sort_by(|a, b| a.name().cmp(b.name()));
        defs
    }

    /// Selects a named file type for inclusion.
    pub fn select(&mut self, name: &str) -> &mut TypesBuilder {
        self.select.push(name.to_string());
        self
    }

    /// Excludes a named file type.
    pub fn select_not(&mut self, name: &str) -> &mut TypesBuilder {
        self.select_not.push(name.to_string());
        self
    }

    /// Removes any existing definition for `name`.
    pub fn clear(&mut self, name: &str) -> &mut TypesBuilder {
        self.types.remove(name);
        self
    }

    /// Adds a glob to the definition of `name`.
    pub fn add(&mut self, name: &str, pat: &str) -> &mut TypesBuilder {
        self.types.entry(name.to_string()).or_default().push(pat.to_string());
        self
    }

    /// Parses and adds a `name:glob` definition string.
    pub fn add_def(&mut self, def: &str) -> Result<(), Error> {
        let mut parts = def.splitn(2, ':');
        let name = parts.next().unwrap_or("");
        let pat = parts.next().unwrap_or("");
        if name.is_empty() || pat.is_empty() {
            return Err(Error::InvalidDefinition);
        }
        self.add(name, pat);
        Ok(())
    }

    /// Adds the built-in language/format definitions (the `-t list` set).
    pub fn add_defaults(&mut self) -> &mut TypesBuilder {
        for &(name, exts) in TYPE_EXTENSIONS {
            for ext in exts {
                self.add(name, ext);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::TypesBuilder;

    fn build(sel: &[&str], selnot: &[&str]) -> super::Types {
        let mut b = TypesBuilder::new();
        b.add_def("html:*.html").unwrap();
        b.add_def("html:*.htm").unwrap();
        b.add_def("rust:*.rs").unwrap();
        b.add_def("js:*.js").unwrap();
        for s in sel {
            b.select(s);
        }
        for s in selnot {
            b.select_not(s);
        }
        b.build().unwrap()
    }

    #[test]
    fn selects_matching_type() {
        let types = build(&["rust"], &[]);
        assert!(!types.matched("lib.rs", false).is_ignored());
    }

    #[test]
    fn selecting_excludes_other_types() {
        let types = build(&["rust"], &[]);
        assert!(types.matched("index.html", false).is_ignored());
    }

    #[test]
    fn negated_type_is_ignored() {
        let types = build(&[], &["rust"]);
        assert!(types.matched("main.rs", false).is_ignored());
        assert!(!types.matched("index.html", false).is_ignored());
    }

    #[test]
    fn no_selection_matches_everything() {
        let types = build(&[], &[]);
        assert!(!types.matched("index.html", false).is_ignored());
    }
}
