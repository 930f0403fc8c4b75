//! `qgrep`: a recursive, archive- and encoding-aware content search tool.

extern crate archive;
extern crate atty;
extern crate clap;
extern crate crossbeam_channel;
extern crate encoding_rs;
extern crate env_logger;
extern crate grep_core;
extern crate ignore;
#[macro_use]
extern crate log;
extern crate memchr;
extern crate num_cpus;
extern crate serde;
extern crate serde_json;
extern crate termcolor;

mod app;
mod args;
mod config;
mod coordinator;
mod encoding;
mod printer;
mod searcher;
mod selector;
mod sort;
mod source;
mod walk;
mod worker;

use std::error::Error as StdError;
use std::io::{self, Write};
use std::process;
use std::sync::Arc;
use std::thread;

use termcolor::{ColorChoice, StandardStream};

use args::Args;
use coordinator::{Cancellation, Coordinator};
use printer::Printer;
use source::FileResult;

type Result<T> = std::result::Result<T, Box<dyn StdError + Send + Sync>>;

fn main() {
    match run() {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(err) => {
            let _ = writeln!(io::stderr(), "qgrep: {}", err);
            process::exit(2);
        }
    }
}

/// Returns `Ok(true)` if at least one match was found (or `-q` was given
/// and one was found before cancellation).
fn run() -> Result<bool> {
    let args = Args::parse()?;

    if args.wants_type_list() {
        args.print_type_list();
        return Ok(true);
    }

    let worker = Arc::new(args.worker()?);
    let topts = args.traversal_options()?;
    let cancel = Cancellation::new();
    let (tx, rx) = crossbeam_channel::bounded(256);

    let walk_topts = topts;
    let walk_worker = Arc::clone(&worker);
    let walk_cancel = cancel.clone();
    let producer = thread::spawn(move || {
        walk::run(&walk_topts, walk_worker, walk_cancel, tx);
    });

    let matched = if let Some(sort) = args.sort() {
        let coordinator = Coordinator::new(Some(sort), args.max_files());
        let results = coordinator.collect(rx);
        emit(&args, &results)?
    } else {
        stream_and_emit(&args, rx, &cancel)?
    };

    producer.join().ok();
    Ok(matched)
}

/// Prints results as they arrive, honoring `-q`/`--max-files` by setting
/// `cancel` as soon as enough work has been observed.
fn stream_and_emit(args: &Args, rx: crossbeam_channel::Receiver<FileResult>, cancel: &Cancellation) -> Result<bool> {
    let mut matched = false;
    let mut files_seen = 0usize;
    let stdout = StandardStream::stdout(color_choice(args));
    let mut printer = Printer::new(stdout, args.format(), args.printer_options());
    printer.start()?;

    for result in rx.iter() {
        matched = true;
        if args.quiet() {
            cancel.cancel();
            break;
        }
        print_one(args, &mut printer, &result)?;
        files_seen += 1;
        if let Some(max) = args.max_files() {
            if files_seen >= max {
                cancel.cancel();
                break;
            }
        }
    }
    if !args.quiet() {
        printer.finish()?;
    }
    Ok(matched)
}

/// Prints an already-collected (and possibly sorted/truncated) result set.
fn emit(args: &Args, results: &[FileResult]) -> Result<bool> {
    let matched = !results.is_empty();
    if args.quiet() {
        return Ok(matched);
    }
    let stdout = StandardStream::stdout(color_choice(args));
    let mut printer = Printer::new(stdout, args.format(), args.printer_options());
    printer.start()?;
    for result in results {
        print_one(args, &mut printer, result)?;
    }
    printer.finish()?;
    Ok(matched)
}

fn print_one<W: termcolor::WriteColor>(args: &Args, printer: &mut Printer<W>, result: &FileResult) -> io::Result<()> {
    if args.files_with_matches() {
        if !result.matches.is_empty() {
            println!("{}", result.source);
        }
    } else if args.files_without_match() {
        if result.matches.is_empty() {
            println!("{}", result.source);
        }
    } else if args.count() {
        println!("{}:{}", result.source, result.matches.len());
    } else {
        printer.print(result)?;
    }
    Ok(())
}

fn color_choice(args: &Args) -> ColorChoice {
    if args.printer_options().color {
        ColorChoice::Always
    } else {
        ColorChoice::Never
    }
}
