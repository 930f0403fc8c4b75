//! Output coordination (spec component C8): collects `FileResult`s
//! produced by however many worker threads searched them, applies
//! `--sort` and `--max-files`, and holds the single cancellation flag
//! workers check at line and archive-member boundaries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::sort::SortSpec;
use crate::source::FileResult;

/// A single flag shared across every worker thread, set once matching can
/// stop early (`-q`, `-l` with no further files needed, or a signal from
/// the main thread).
#[derive(Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    /// Builds a fresh, unset cancellation flag.
    pub fn new() -> Cancellation {
        Cancellation { flag: Arc::new(AtomicBool::new(false)) }
    }

    /// Requests that all workers stop as soon as they next check.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// True once `cancel` has been called from any thread.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Gathers results from the worker pool's output channel and applies the
/// coordination-level policies (`--sort`, `--max-files`).
pub struct Coordinator {
    sort: Option<SortSpec>,
    max_files: Option<usize>,
}

impl Coordinator {
    /// Builds a coordinator with the given sort order and file cap.
    pub fn new(sort: Option<SortSpec>, max_files: Option<usize>) -> Coordinator {
        Coordinator { sort, max_files }
    }

    /// Drains `rx` to completion, then sorts and truncates the collected
    /// results.
    ///
    /// Draining to completion (rather than streaming results out as they
    /// arrive) is what makes `--sort` possible: a result can't be emitted
    /// until every other result it might be ordered against has arrived.
    /// Callers that don't pass `--sort` and want streaming output should
    /// read straight from the channel themselves instead of going through
    /// this method.
    pub fn collect(&self, rx: Receiver<FileResult>) -> Vec<FileResult> {
        let mut results: Vec<FileResult> = rx.iter().collect();
        if let Some(ref spec) = self.sort {
            spec.sort(&mut results);
        }
        if let Some(max) = self.max_files {
            results.truncate(max);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InputSource;
    use std::path::PathBuf;

    #[test]
    fn cancellation_starts_unset() {
        let c = Cancellation::new();
        assert!(!c.is_cancelled());
        c.cancel();
        assert!(c.is_cancelled());
    }

    #[test]
    fn collect_truncates_to_max_files() {
        let (tx, rx) = crossbeam_channel::unbounded();
        for name in ["a", "b", "c"] {
            tx.send(FileResult::new(InputSource::File(PathBuf::from(name)))).unwrap();
        }
        drop(tx);
        let coordinator = Coordinator::new(None, Some(2));
        let results = coordinator.collect(rx);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn collect_sorts_by_name() {
        let (tx, rx) = crossbeam_channel::unbounded();
        for name in ["c", "a", "b"] {
            tx.send(FileResult::new(InputSource::File(PathBuf::from(name)))).unwrap();
        }
        drop(tx);
        let spec = "name".parse().unwrap();
        let coordinator = Coordinator::new(Some(spec), None);
        let results = coordinator.collect(rx);
        let names: Vec<String> = results.iter().map(|r| r.source.to_string()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
