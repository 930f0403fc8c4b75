//! Traversal entry point (spec component C7): wires the CLI's selection
//! flags into `ignore::WalkBuilder` and drives either the sequential or
//! work-stealing parallel walker, feeding each matched file to a worker
//! and its results onto the output channel.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::Sender;
use ignore::overrides::Override;
use ignore::types::Types;
use ignore::{WalkBuilder, WalkState};

use crate::coordinator::Cancellation;
use crate::source::{FileResult, InputSource};
use crate::worker::Worker;

/// The subset of `ignore::WalkBuilder`'s configuration the CLI exposes.
pub struct TraversalOptions {
    /// Root paths to search.
    pub paths: Vec<PathBuf>,
    /// Search hidden files and directories.
    pub hidden: bool,
    /// Maximum recursion depth.
    pub max_depth: Option<usize>,
    /// Follow symbolic links.
    pub follow_links: bool,
    /// `-g`/`--glob` overrides.
    pub overrides: Override,
    /// `-t`/`-T` file-type selection.
    pub types: Types,
    /// Respect `.gitignore`/`.ignore` files.
    pub use_ignore_files: bool,
    /// Number of worker threads; `1` forces sequential, stable-order
    /// traversal.
    pub threads: usize,
}

fn build_walker(opts: &TraversalOptions) -> WalkBuilder {
    let mut paths = opts.paths.iter();
    let mut builder =
        WalkBuilder::new(paths.next().cloned().unwrap_or_else(|| PathBuf::from(".")));
    for path in paths {
        builder.add(path);
    }
    builder
        .hidden(!opts.hidden)
        .max_depth(opts.max_depth)
        .follow_links(opts.follow_links)
        .ignore(opts.use_ignore_files)
        .git_ignore(opts.use_ignore_files)
        .git_exclude(opts.use_ignore_files)
        .overrides(opts.overrides.clone())
        .types(opts.types.clone());
    builder
}

/// Walks every configured path, searching matched files with `worker` and
/// sending non-empty `FileResult`s to `tx`. Stops early once `cancel` is
/// set.
pub fn run(
    opts: &TraversalOptions,
    worker: Arc<Worker>,
    cancel: Cancellation,
    tx: Sender<FileResult>,
) {
    let builder = build_walker(opts);
    if opts.threads <= 1 {
        run_sequential(&builder, &worker, &cancel, &tx);
    } else {
        run_parallel(&builder, opts.threads, worker, cancel, tx);
    }
}

fn run_sequential(
    builder: &WalkBuilder,
    worker: &Worker,
    cancel: &Cancellation,
    tx: &Sender<FileResult>,
) {
    for dent in builder.build() {
        if cancel.is_cancelled() {
            return;
        }
        let dent = match dent {
            Ok(d) => d,
            Err(_) => continue,
        };
        if !dent.file_type().map(|t| t.is_file()).unwrap_or(dent.is_stdin()) {
            continue;
        }
        search_entry(dent.path().to_path_buf(), dent.is_stdin(), worker, tx);
    }
}

fn run_parallel(
    builder: &WalkBuilder,
    threads: usize,
    worker: Arc<Worker>,
    cancel: Cancellation,
    tx: Sender<FileResult>,
) {
    let parallel = builder.build_parallel(threads);
    parallel.run(|| {
        let worker = Arc::clone(&worker);
        let cancel = cancel.clone();
        let tx = tx.clone();
        Box::new(move |result| {
            if cancel.is_cancelled() {
                return WalkState::Quit;
            }
            if let Ok(dent) = result {
                if dent.file_type().map(|t| t.is_file()).unwrap_or(dent.is_stdin()) {
                    search_entry(dent.path().to_path_buf(), dent.is_stdin(), &worker, &tx);
                }
            }
            if cancel.is_cancelled() {
                WalkState::Quit
            } else {
                WalkState::Continue
            }
        })
    });
}

fn search_entry(path: PathBuf, is_stdin: bool, worker: &Worker, tx: &Sender<FileResult>) {
    let (source, data) = if is_stdin {
        use std::io::Read;
        let mut buf = Vec::new();
        if std::io::stdin().read_to_end(&mut buf).is_err() {
            return;
        }
        (InputSource::Stdin, buf)
    } else {
        let meta = match fs::metadata(&path) {
            Ok(m) => m,
            Err(_) => return,
        };
        if !worker.within_size_limit(meta.len()) {
            return;
        }
        let data = match fs::read(&path) {
            Ok(d) => d,
            Err(_) => return,
        };
        (InputSource::File(path), data)
    };
    for mut result in worker.search(source, data) {
        if let InputSource::File(ref p) = result.source {
            if let Ok(meta) = fs::metadata(p) {
                result.size = Some(meta.len());
                result.modified = meta.modified().ok();
                result.accessed = meta.accessed().ok();
                result.created = meta.created().ok();
            }
        }
        if tx.send(result).is_err() {
            return;
        }
    }
}
