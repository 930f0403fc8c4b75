//! Translates parsed command-line flags (plus whatever `.quickgreprc`
//! supplied as defaults) into the structures the rest of the pipeline
//! consumes: a `worker::Matcher`, `worker::Worker`, `walk::TraversalOptions`
//! and `printer::PrinterOptions`.

use std::env;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use clap::ArgMatches;
use ignore::overrides::OverrideBuilder;
use ignore::types::{Types, TypesBuilder};
use grep_core::GrepBuilder;

use crate::app;
use crate::config;
use crate::printer::{OutputFormat, PrinterOptions};
use crate::searcher::SearchOptions;
use crate::selector::Selector;
use crate::sort::SortSpec;
use crate::walk::TraversalOptions;
use crate::worker::{Matcher, Worker};

/// Everything that can go wrong while turning argv into a runnable
/// configuration.
#[derive(Debug)]
pub enum Error {
    /// `clap` rejected the command line.
    Clap(clap::Error),
    /// No pattern was supplied anywhere (argv, `-e`, `-f`).
    NoPattern,
    /// A `-f` pattern file or `.quickgreprc` couldn't be read.
    Io(std::io::Error),
    /// The pattern, a glob, a type definition, a fuzzy spec or a boolean
    /// query failed to compile.
    Pattern(String),
}

impl StdError for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Clap(ref e) => write!(f, "{}", e),
            Error::NoPattern => write!(f, "no pattern given"),
            Error::Io(ref e) => write!(f, "{}", e),
            Error::Pattern(ref s) => write!(f, "{}", s),
        }
    }
}

impl From<clap::Error> for Error {
    fn from(e: clap::Error) -> Error {
        Error::Clap(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

/// The fully resolved configuration for one run.
pub struct Args {
    matches: ArgMatches<'static>,
}

impl Args {
    /// Parses `env::args_os()`, prepending whatever `.quickgreprc` (unless
    /// `--no-config` is given on the real command line) supplies as
    /// default flags.
    ///
    /// Config-file flags are synthesized as extra argv tokens ahead of the
    /// real ones, the same trick ripgrep's `RIPGREP_CONFIG_PATH` uses: for
    /// a repeatable flag like `-g` both the config's and argv's values
    /// apply, while for a plain switch argv simply repeats (harmlessly)
    /// whatever the config already turned on.
    pub fn parse() -> Result<Args, Error> {
        let real: Vec<String> = env::args().skip(1).collect();
        let skip_config = real.iter().any(|a| a == "--no-config");

        let mut argv = vec!["qgrep".to_string()];
        if !skip_config {
            for entry in config::load()? {
                argv.push(format!("--{}", entry.name));
                if !entry.value.is_empty() {
                    argv.push(entry.value);
                }
            }
        }
        argv.extend(real);

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off"))
            .try_init()
            .ok();

        let matches = app::app_long().get_matches_from_safe(argv)?;
        if matches.is_present("debug") {
            log::set_max_level(log::LevelFilter::Debug);
        }
        Ok(Args { matches })
    }

    fn unrestricted_level(&self) -> u64 {
        self.matches.occurrences_of("unrestricted")
    }

    /// True once `--type-list` should short-circuit the rest of the run.
    pub fn wants_type_list(&self) -> bool {
        self.matches.is_present("type-list")
    }

    /// Prints every built-in file type and its globs (`--type-list`).
    pub fn print_type_list(&self) {
        let mut builder = TypesBuilder::new();
        builder.add_defaults();
        for def in builder.definitions() {
            println!("{}: {}", def.name(), def.patterns().join(", "));
        }
    }

    /// Gathers every pattern source (positional, `-e`, `-f`) into one list
    /// of raw pattern strings.
    fn raw_patterns(&self) -> Result<Vec<String>, Error> {
        let mut pats = Vec::new();
        if let Some(p) = self.matches.value_of("pattern") {
            pats.push(p.to_string());
        }
        if let Some(es) = self.matches.values_of("regexp") {
            pats.extend(es.map(|s| s.to_string()));
        }
        if let Some(files) = self.matches.values_of("file") {
            for path in files {
                let contents = if path == "-" {
                    use std::io::Read;
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                } else {
                    fs::read_to_string(path)?
                };
                pats.extend(contents.lines().map(|l| l.to_string()));
            }
        }
        if pats.is_empty() {
            return Err(Error::NoPattern);
        }
        Ok(pats)
    }

    /// Gathers every `-N PAT` negative pattern given.
    fn negative_patterns(&self) -> Vec<String> {
        match self.matches.values_of("negative") {
            Some(ns) => ns.map(|s| s.to_string()).collect(),
            None => Vec::new(),
        }
    }

    /// Compiles the `-N` patterns into a single alternation matcher, if any
    /// were given. A candidate positive match is suppressed iff this
    /// matcher finds a region fully containing it at an equal-or-greater
    /// length within the same line.
    fn negative_matcher(&self, ci: bool) -> Result<Option<grep_core::Grep>, Error> {
        let negs = self.negative_patterns();
        if negs.is_empty() {
            return Ok(None);
        }
        let pattern = grep_core::join_alternates(&negs);
        let mut builder = GrepBuilder::new(&pattern);
        builder.case_insensitive(ci);
        let grep = builder.build().map_err(|e| Error::Pattern(e.to_string()))?;
        Ok(Some(grep))
    }

    /// True if the pattern's own casing should force case-sensitive
    /// matching under `--smart-case` (i.e. it contains an uppercase
    /// letter).
    fn smart_case_is_sensitive(pats: &[String]) -> bool {
        pats.iter().any(|p| p.chars().any(|c| c.is_uppercase()))
    }

    fn case_insensitive(&self, pats: &[String]) -> bool {
        if self.matches.is_present("ignore-case") {
            return true;
        }
        if self.matches.is_present("smart-case") {
            return !Self::smart_case_is_sensitive(pats);
        }
        false
    }

    /// Builds the compiled matcher: fuzzy, boolean query, or a single
    /// exact/regex pattern (possibly several `-e`/`-f` patterns joined
    /// with alternation).
    pub fn matcher(&self) -> Result<Matcher, Error> {
        if let Some(query) = self.matches.value_of("query") {
            let parsed =
                grep_core::parse_bool_expr(query).map_err(|e| Error::Pattern(e.to_string()))?;
            let ci = self.matches.is_present("ignore-case");
            let compiled = Self::compile_bool_expr(parsed, ci)?;
            return Ok(Matcher::Boolean(compiled));
        }

        let pats = self.raw_patterns()?;
        let ci = self.case_insensitive(&pats);

        if let Some(raw) = self.matches.value_of("fuzzy") {
            let (best, op, digits) = Self::parse_fuzzy_arg(raw);
            let max_distance: usize = if digits.is_empty() {
                1
            } else {
                digits.parse().unwrap_or(1)
            };
            let (allow_ins, allow_del, allow_sub) = match op {
                Some('+') => (true, false, false),
                Some('-') => (false, true, false),
                Some('~') => (false, false, true),
                _ => (true, true, true),
            };
            let pattern = pats.join(" ");
            let spec = grep_core::FuzzySpec::new(&pattern, max_distance, allow_ins, allow_del, allow_sub)
                .case_insensitive(ci)
                .best(best);
            return Ok(Matcher::Fuzzy(spec));
        }

        let mut pattern = if self.matches.is_present("fixed-strings") {
            grep_core::literal_escape(&pats.join("|"))
        } else {
            grep_core::join_alternates(&pats)
        };
        if self.matches.is_present("word-regexp") {
            pattern = grep_core::word_wrap(&pattern);
        }
        if self.matches.is_present("line-regexp") {
            pattern = format!("^(?:{})$", pattern);
        }

        let mut builder = GrepBuilder::new(&pattern);
        builder.case_insensitive(ci);
        builder.line_numbers(true);
        let grep = builder.build().map_err(|e| Error::Pattern(e.to_string()))?;
        let negative = self.negative_matcher(ci)?;
        Ok(Matcher::Exact(grep, negative))
    }

    /// Parses a `-Z[best][+-~]N` argument into (best mode, edit-kind
    /// restriction, the remaining digits). An empty `digits` means "use the
    /// default distance".
    fn parse_fuzzy_arg(raw: &str) -> (bool, Option<char>, &str) {
        let mut rest = raw;
        let best = match rest.strip_prefix("best") {
            Some(r) => {
                rest = r;
                true
            }
            None => false,
        };
        let op = match rest.chars().next() {
            Some(c @ ('+' | '-' | '~')) => {
                rest = &rest[c.len_utf8()..];
                Some(c)
            }
            _ => None,
        };
        (best, op, rest)
    }

    fn compile_bool_expr(
        expr: grep_core::BoolExpr<String>,
        ci: bool,
    ) -> Result<grep_core::BoolExpr<grep_core::Grep>, Error> {
        Self::compile_bool_node(expr, ci)
    }

    fn compile_bool_node(
        expr: grep_core::BoolExpr<String>,
        ci: bool,
    ) -> Result<grep_core::BoolExpr<grep_core::Grep>, Error> {
        use grep_core::BoolExpr as E;
        Ok(match expr {
            E::Leaf(pat, scope) => {
                let mut builder = GrepBuilder::new(&pat);
                builder.case_insensitive(ci);
                builder.line_numbers(true);
                let grep = builder.build().map_err(|e| Error::Pattern(e.to_string()))?;
                E::Leaf(grep, scope)
            }
            E::Not(inner) => E::Not(Box::new(Self::compile_bool_node(*inner, ci)?)),
            E::And(parts) => E::And(
                parts
                    .into_iter()
                    .map(|p| Self::compile_bool_node(p, ci))
                    .collect::<Result<Vec<_>, Error>>()?,
            ),
            E::Or(parts) => E::Or(
                parts
                    .into_iter()
                    .map(|p| Self::compile_bool_node(p, ci))
                    .collect::<Result<Vec<_>, Error>>()?,
            ),
        })
    }

    /// Root paths to search; `.` if none were given.
    pub fn paths(&self) -> Vec<PathBuf> {
        match self.matches.values_of("path") {
            Some(vs) => vs.map(PathBuf::from).collect(),
            None => vec![PathBuf::from(".")],
        }
    }

    fn glob_overrides(&self) -> Result<ignore::overrides::Override, Error> {
        let mut builder = OverrideBuilder::new(env::current_dir()?);
        if let Some(globs) = self.matches.values_of("glob") {
            for g in globs {
                builder.add(g).map_err(|e| Error::Pattern(e.to_string()))?;
            }
        }
        builder.build().map_err(|e| Error::Pattern(e.to_string()))
    }

    fn file_types(&self) -> Result<Types, Error> {
        let mut builder = TypesBuilder::new();
        builder.add_defaults();
        if let Some(sel) = self.matches.values_of("type") {
            for t in sel {
                builder.select(t);
            }
        }
        if let Some(sel) = self.matches.values_of("type-not") {
            for t in sel {
                builder.select_not(t);
            }
        }
        builder.build().map_err(|e| Error::Pattern(e.to_string()))
    }

    /// Builds the traversal configuration for `walk::run`.
    pub fn traversal_options(&self) -> Result<TraversalOptions, Error> {
        let unrestricted = self.unrestricted_level();
        Ok(TraversalOptions {
            paths: self.paths(),
            hidden: self.matches.is_present("hidden") || unrestricted >= 2,
            max_depth: self
                .matches
                .value_of("max-depth")
                .and_then(|s| s.parse().ok()),
            follow_links: self.matches.is_present("follow"),
            overrides: self.glob_overrides()?,
            types: self.file_types()?,
            use_ignore_files: !self.matches.is_present("no-ignore") && unrestricted == 0,
            threads: self.threads(),
        })
    }

    fn threads(&self) -> usize {
        match self.matches.value_of("threads").and_then(|s| s.parse().ok()) {
            Some(n) => n,
            None => std::cmp::min(12, num_cpus::get()),
        }
    }

    fn context(&self) -> (usize, usize) {
        if let Some(c) = self.matches.value_of("context").and_then(|s| s.parse().ok()) {
            return (c, c);
        }
        let before = self
            .matches
            .value_of("before-context")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let after = self
            .matches
            .value_of("after-context")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        (before, after)
    }

    /// Per-line search behavior for `searcher::search_exact`/`search_fuzzy`.
    pub fn search_options(&self) -> SearchOptions {
        let (before_context, after_context) = self.context();
        SearchOptions {
            invert_match: self.matches.is_present("invert-match"),
            max_count: self.matches.value_of("max-count").and_then(|s| s.parse().ok()),
            before_context,
            after_context,
            text: self.matches.is_present("text") || self.unrestricted_level() >= 3,
            unique: !self.matches.is_present("no-unique"),
        }
    }

    fn max_filesize(&self) -> Option<u64> {
        self.matches.value_of("max-filesize").and_then(|s| s.parse().ok())
    }

    fn zmax(&self) -> u32 {
        if !self.matches.is_present("search-zip") {
            return 0;
        }
        self.matches.value_of("zmax").and_then(|s| s.parse().ok()).unwrap_or(1)
    }

    /// Builds the worker that searches individual sources.
    ///
    /// The same overrides/types used to filter on-disk paths via
    /// `ignore::WalkBuilder` are reapplied here so an archive member's
    /// synthetic path is held to the same `-g`/`-t` rules as a plain file.
    pub fn worker(&self) -> Result<Worker, Error> {
        let selector = Selector::new(self.glob_overrides()?, self.file_types()?);
        let worker = Worker::new(self.matcher()?, self.search_options(), selector, self.zmax(), self.max_filesize());
        Ok(worker.report_no_match(self.files_without_match()))
    }

    fn output_format(&self) -> OutputFormat {
        match self.matches.value_of("format") {
            Some("csv") => OutputFormat::Csv,
            Some("json") => OutputFormat::Json,
            Some("xml") => OutputFormat::Xml,
            Some("hex") => OutputFormat::Hex { columns: 8, gutter: true },
            _ => OutputFormat::Plain,
        }
    }

    /// Rendering options for `printer::Printer`.
    pub fn printer_options(&self) -> PrinterOptions {
        let with_filename = if self.matches.is_present("no-filename") {
            false
        } else {
            self.matches.is_present("with-filename") || self.paths().len() > 1 || self.is_dir_search()
        };
        let line_number = !self.matches.is_present("no-line-number");
        PrinterOptions {
            with_filename,
            line_number,
            column: self.matches.is_present("column"),
            heading: self.matches.is_present("heading"),
            color: self.use_color(),
            quiet: self.matches.is_present("quiet"),
            context_separator: b"--".to_vec(),
        }
    }

    fn is_dir_search(&self) -> bool {
        self.paths().iter().any(|p| p.is_dir())
    }

    fn use_color(&self) -> bool {
        match self.matches.value_of("color") {
            Some("always") => true,
            Some("never") => false,
            _ => atty::is(atty::Stream::Stdout),
        }
    }

    /// The format to print results in.
    pub fn format(&self) -> OutputFormat {
        self.output_format()
    }

    /// The parsed `--sort` key, if any.
    pub fn sort(&self) -> Option<SortSpec> {
        self.matches.value_of("sort").and_then(|s| s.parse().ok())
    }

    /// The parsed `--max-files` cap, if any.
    pub fn max_files(&self) -> Option<usize> {
        self.matches.value_of("max-files").and_then(|s| s.parse().ok())
    }

    /// True if `-q`/`--quiet` was given: exit 0 on the first match and
    /// print nothing.
    pub fn quiet(&self) -> bool {
        self.matches.is_present("quiet")
    }

    /// True if only file names (no line content) should be printed
    /// (`-l`/`-L`).
    pub fn files_with_matches(&self) -> bool {
        self.matches.is_present("files-with-matches")
    }

    /// True if only files with *no* match should be printed (`-L`).
    pub fn files_without_match(&self) -> bool {
        self.matches.is_present("files-without-match")
    }

    /// True if only a per-file match count should be printed (`-c`).
    pub fn count(&self) -> bool {
        self.matches.is_present("count")
    }
}
