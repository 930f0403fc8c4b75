/*!
A work-stealing parallel directory walker, giving the traversal half of
spec component C7 a throughput path for large trees: each worker pulls
directories from a shared injector queue (falling back to stealing from
its siblings), applies the same `Ignore` filtering as the sequential
`Walk`, and hands matching entries to a per-thread visitor.
*/

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_deque::{Injector, Steal, Stealer, Worker};
use crossbeam_utils::Backoff;

use crate::dir::Ignore;
use crate::walk::DirEntry;
use crate::{Error, WalkBuilder};

/// Tells a `WalkParallel` visitor whether to keep walking, skip the rest
/// of the current directory, or stop the whole traversal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WalkState {
    /// Keep going.
    Continue,
    /// Don't descend into the directory just yielded (has no effect for
    /// a plain file entry).
    Skip,
    /// Stop the entire walk, across every thread.
    Quit,
}

struct WorkItem {
    path: PathBuf,
    ig: Ignore,
    depth: usize,
}

/// A parallel recursive directory iterator, built from `WalkBuilder`.
pub struct WalkParallel {
    paths: Vec<PathBuf>,
    ig_root: Ignore,
    max_depth: Option<usize>,
    follow_links: bool,
    threads: usize,
}

impl WalkParallel {
    pub(crate) fn new(builder: &WalkBuilder, threads: usize) -> WalkParallel {
        WalkParallel {
            paths: builder.roots(),
            ig_root: builder.ignore_root(),
            max_depth: builder.max_depth_value(),
            follow_links: builder.follow_links_value(),
            threads: threads.max(1),
        }
    }

    /// Runs the walk, calling `mk_visitor` once per worker thread to
    /// build that thread's visitor closure, which is then invoked once
    /// per yielded entry (and once per traversal error).
    pub fn run<F>(self, mut mk_visitor: F)
    where
        F: FnMut() -> Box<dyn FnMut(Result<DirEntry, Error>) -> WalkState + Send>,
    {
        let injector: Injector<WorkItem> = Injector::new();
        for path in &self.paths {
            injector.push(WorkItem { path: path.clone(), ig: self.ig_root.clone(), depth: 0 });
        }

        let quit = Arc::new(AtomicUsize::new(0));
        let active = Arc::new(AtomicUsize::new(0));
        let max_depth = self.max_depth;
        let follow_links = self.follow_links;

        let mut locals = Vec::with_capacity(self.threads);
        let mut stealers = Vec::with_capacity(self.threads);
        for _ in 0..self.threads {
            // Per-worker deques run LIFO: a worker pops from its own tail
            // (depth-first, favoring cache-warm recently-pushed directories)
            // while a thief pops from the opposite end.
            let w = Worker::new_lifo();
            stealers.push(w.stealer());
            locals.push(w);
        }

        thread::scope(|scope| {
            for local in locals {
                let injector = &injector;
                let stealers = &stealers;
                let quit = Arc::clone(&quit);
                let active = Arc::clone(&active);
                let visit = mk_visitor();
                scope.spawn(move || {
                    run_worker(
                        local,
                        injector,
                        stealers,
                        quit,
                        active,
                        max_depth,
                        follow_links,
                        visit,
                    );
                });
            }
        });
    }
}

fn run_worker(
    local: Worker<WorkItem>,
    injector: &Injector<WorkItem>,
    stealers: &[Stealer<WorkItem>],
    quit: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
    max_depth: Option<usize>,
    follow_links: bool,
    mut visit: Box<dyn FnMut(Result<DirEntry, Error>) -> WalkState + Send>,
) {
    let backoff = Backoff::new();
    loop {
        if quit.load(Ordering::SeqCst) > 0 {
            return;
        }
        let item = match find_task(&local, injector, stealers) {
            Some(item) => item,
            None => {
                if active.load(Ordering::SeqCst) == 0 {
                    return;
                }
                backoff.snooze();
                continue;
            }
        };
        backoff.reset();
        active.fetch_add(1, Ordering::SeqCst);
        let state = visit_one(&item, max_depth, follow_links, &local, &mut visit);
        if state == WalkState::Quit {
            quit.fetch_add(1, Ordering::SeqCst);
            active.fetch_sub(1, Ordering::SeqCst);
            return;
        }
        active.fetch_sub(1, Ordering::SeqCst);
    }
}

fn visit_one(
    item: &WorkItem,
    max_depth: Option<usize>,
    follow_links: bool,
    local: &Worker<WorkItem>,
    visit: &mut Box<dyn FnMut(Result<DirEntry, Error>) -> WalkState + Send>,
) -> WalkState {
    let metadata = fs::symlink_metadata(&item.path);
    let is_dir = metadata.as_ref().map(|m| m.is_dir()).unwrap_or(false);
    let is_symlink = metadata.as_ref().map(|m| m.file_type().is_symlink()).unwrap_or(false);

    if item.depth > 0 {
        let mat = item.ig.matched(&item.path, is_dir);
        if mat.is_ignore() {
            return WalkState::Continue;
        }
    }

    if is_dir {
        let (child_ig, ig_err) = item.ig.add_child(&item.path);
        if let Some(err) = ig_err {
            if visit(Err(err)) == WalkState::Quit {
                return WalkState::Quit;
            }
        }
        let state = visit(Ok(DirEntry::from_path(item.path.clone(), item.depth)));
        if state == WalkState::Quit {
            return WalkState::Quit;
        }
        let within_depth = max_depth.map(|m| item.depth < m).unwrap_or(true);
        if state != WalkState::Skip && within_depth && (!is_symlink || follow_links) {
            match fs::read_dir(&item.path) {
                Ok(entries) => {
                    for ent in entries.flatten() {
                        local.push(WorkItem {
                            path: ent.path(),
                            ig: child_ig.clone(),
                            depth: item.depth + 1,
                        });
                    }
                }
                Err(err) => {
                    let err = Error::WithPath {
                        path: item.path.clone(),
                        err: Box::new(Error::Io(err)),
                    };
                    if visit(Err(err)) == WalkState::Quit {
                        return WalkState::Quit;
                    }
                }
            }
        }
    } else {
        let mat = item.ig.matched(&item.path, false);
        if !mat.is_ignore() {
            let dent = DirEntry::from_path(item.path.clone(), item.depth);
            if visit(Ok(dent)) == WalkState::Quit {
                return WalkState::Quit;
            }
        }
    }
    WalkState::Continue
}

fn find_task(
    local: &Worker<WorkItem>,
    injector: &Injector<WorkItem>,
    stealers: &[Stealer<WorkItem>],
) -> Option<WorkItem> {
    if let Some(item) = local.pop() {
        return Some(item);
    }
    loop {
        match injector.steal_batch_and_pop(local) {
            Steal::Success(item) => return Some(item),
            Steal::Retry => continue,
            Steal::Empty => {}
        }
        for s in stealers {
            loop {
                match s.steal() {
                    Steal::Success(item) => return Some(item),
                    Steal::Retry => continue,
                    Steal::Empty => break,
                }
            }
        }
        return None;
    }
}
