/*!
This module contains *integration* tests. Their purpose is to test the CLI
interface: that passing a flag does what it says on the tin.

Tests for more fine grained behavior (the matcher, the globber, the
selector) belong as unit tests in their respective modules.
*/

#![allow(dead_code, unused_imports)]

use std::io::Write;
use std::process::Command;

use workdir::WorkDir;

mod hay;
mod workdir;

fn path(unix: &str) -> String {
    if cfg!(windows) {
        unix.replace("/", "\\")
    } else {
        unix.to_string()
    }
}

macro_rules! sherlock {
    ($name:ident, $fun:expr) => {
        sherlock!($name, "Sherlock", $fun);
    };
    ($name:ident, $query:expr, $fun:expr) => {
        #[test]
        fn $name() {
            let wd = WorkDir::new(stringify!($name));
            wd.create("sherlock", hay::SHERLOCK);
            let mut cmd = wd.command();
            cmd.arg($query).arg("sherlock");
            $fun(wd, cmd);
        }
    };
}

sherlock!(basic_match, |wd: WorkDir, mut cmd: Command| {
    let lines: String = wd.stdout(&mut cmd);
    assert_eq!(lines.lines().count(), 2);
    assert!(lines.contains("Sherlock Holmeses"));
});

sherlock!(case_insensitive, "sherlock", |wd: WorkDir, mut cmd: Command| {
    cmd.arg("-i");
    let lines: String = wd.stdout(&mut cmd);
    assert_eq!(lines.lines().count(), 2);
});

sherlock!(invert_match, "Sherlock", |wd: WorkDir, mut cmd: Command| {
    cmd.arg("-v");
    let lines: String = wd.stdout(&mut cmd);
    assert_eq!(lines.lines().count(), 2);
});

sherlock!(count_only, "Sherlock", |wd: WorkDir, mut cmd: Command| {
    cmd.arg("-c");
    let out: String = wd.stdout(&mut cmd);
    assert!(out.trim_end().ends_with(":2"));
});

sherlock!(word_regexp, "Doctor", |wd: WorkDir, mut cmd: Command| {
    cmd.arg("-w");
    let lines: String = wd.stdout(&mut cmd);
    assert_eq!(lines.lines().count(), 1);
});

sherlock!(max_count, "e", |wd: WorkDir, mut cmd: Command| {
    cmd.arg("-m").arg("2");
    let lines: String = wd.stdout(&mut cmd);
    assert_eq!(lines.lines().count(), 2);
});

sherlock!(after_context, "luck", |wd: WorkDir, mut cmd: Command| {
    cmd.arg("-A").arg("1");
    let lines: String = wd.stdout(&mut cmd);
    assert!(lines.contains("Sherlock Holmes never"));
});

sherlock!(fixed_strings, "Hol.es", |wd: WorkDir, mut cmd: Command| {
    cmd.arg("-F");
    wd.assert_err(&mut cmd);
});

sherlock!(files_with_matches, "Sherlock", |wd: WorkDir, mut cmd: Command| {
    cmd.arg("-l");
    let out: String = wd.stdout(&mut cmd);
    assert!(out.trim_end().ends_with("sherlock"));
});

#[test]
fn files_without_match_reports_non_matching_files() {
    let wd = WorkDir::new("files_without_match_reports_non_matching_files");
    wd.create("sherlock", hay::SHERLOCK);
    wd.create("empty", "nothing to find here\n");
    let mut cmd = wd.command();
    cmd.arg("-L").arg("Sherlock").arg(".");
    let out: String = wd.stdout(&mut cmd);
    assert!(out.contains("empty"));
}

#[test]
fn quiet_suppresses_output_but_exits_zero_on_match() {
    let wd = WorkDir::new("quiet_suppresses_output_but_exits_zero_on_match");
    wd.create("sherlock", hay::SHERLOCK);
    let mut cmd = wd.command();
    cmd.arg("-q").arg("Sherlock").arg("sherlock");
    let out = wd.output(&mut cmd);
    assert!(out.stdout.is_empty());
}

#[test]
fn glob_filters_which_files_are_searched() {
    let wd = WorkDir::new("glob_filters_which_files_are_searched");
    wd.create("a.txt", "needle\n");
    wd.create("a.log", "needle\n");
    let mut cmd = wd.command();
    cmd.arg("-g").arg("*.txt").arg("needle").arg(".");
    let out: String = wd.stdout(&mut cmd);
    assert!(out.contains("a.txt"));
    assert!(!out.contains("a.log"));
}

#[test]
fn hidden_files_are_skipped_by_default() {
    let wd = WorkDir::new("hidden_files_are_skipped_by_default");
    wd.create(".hidden", "needle\n");
    let mut cmd = wd.command();
    cmd.arg("needle").arg(".");
    wd.assert_err(&mut cmd);

    let mut cmd = wd.command();
    cmd.arg("--hidden").arg("needle").arg(".");
    let out: String = wd.stdout(&mut cmd);
    assert!(out.contains(".hidden"));
}

#[test]
fn sort_by_name_orders_results_across_files() {
    let wd = WorkDir::new("sort_by_name_orders_results_across_files");
    wd.create("b.txt", "needle\n");
    wd.create("a.txt", "needle\n");
    let mut cmd = wd.command();
    cmd.arg("--sort").arg("name").arg("needle").arg(".");
    let out: String = wd.stdout(&mut cmd);
    let a_pos = out.find(&path("a.txt")).unwrap();
    let b_pos = out.find(&path("b.txt")).unwrap();
    assert!(a_pos < b_pos);
}

#[test]
fn csv_format_quotes_fields() {
    let wd = WorkDir::new("csv_format_quotes_fields");
    wd.create("sherlock", hay::SHERLOCK);
    let mut cmd = wd.command();
    cmd.arg("--format").arg("csv").arg("Sherlock").arg("sherlock");
    let out: String = wd.stdout(&mut cmd);
    assert!(out.lines().count() >= 2);
}

#[test]
fn json_format_emits_one_object_per_file() {
    let wd = WorkDir::new("json_format_emits_one_object_per_file");
    wd.create("sherlock", hay::SHERLOCK);
    let mut cmd = wd.command();
    cmd.arg("--format").arg("json").arg("Sherlock").arg("sherlock");
    let out: String = wd.stdout(&mut cmd);
    assert!(out.contains("\"file\""));
    assert!(out.contains("\"matches\""));
}

#[test]
fn fuzzy_match_tolerates_one_typo() {
    let wd = WorkDir::new("fuzzy_match_tolerates_one_typo");
    wd.create("sherlock", hay::SHERLOCK);
    let mut cmd = wd.command();
    cmd.arg("-Z").arg("Sherlok").arg("sherlock");
    let out: String = wd.stdout(&mut cmd);
    assert!(!out.is_empty());
}

#[test]
fn fuzzy_reports_per_line_edit_distance_in_order() {
    let wd = WorkDir::new("fuzzy_reports_per_line_edit_distance_in_order");
    wd.create("f", "foobar\nfobar\nfoo_bar\nxxx\n");
    let mut cmd = wd.command();
    cmd.arg("-Z1").arg("foobar").arg("f");
    let out: String = wd.stdout(&mut cmd);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("1:") && lines[0].contains("foobar"));
    assert!(lines[1].starts_with("2:") && lines[1].contains("fobar"));
    assert!(lines[2].starts_with("3:") && lines[2].contains("foo_bar"));
}

#[test]
fn multiline_regex_spans_several_lines() {
    let wd = WorkDir::new("multiline_regex_spans_several_lines");
    wd.create("f", "begin\nmid\nend\nother\n");
    let mut cmd = wd.command();
    cmd.arg("-n").arg(r"begin(.|\n)*?end").arg("f");
    let out: String = wd.stdout(&mut cmd);
    assert!(out.starts_with("1:"));
    assert!(out.contains("begin\nmid\nend"));
    assert!(!out.contains("other"));
}

#[test]
fn negative_pattern_suppresses_contained_matches() {
    let wd = WorkDir::new("negative_pattern_suppresses_contained_matches");
    wd.create("f", "0\n01\n123\n555\n");
    let mut cmd = wd.command();
    cmd.arg(r"\d+").arg("-N").arg(r"0\d+").arg("-N").arg("555").arg("f");
    let out: String = wd.stdout(&mut cmd);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("1:0"));
    assert!(lines[1].starts_with("3:123"));
}

#[test]
fn archive_search_finds_match_inside_zip_member() {
    let wd = WorkDir::new("archive_search_finds_match_inside_zip_member");
    let zip_bytes = build_zip(&[("a.txt", b"hit\n".as_slice()), ("b.bin", &[0xDE, 0xAD, 0xBE, 0xEF])]);
    wd.create_bytes("p.zip", &zip_bytes);
    let mut cmd = wd.command();
    cmd.arg("-z").arg("-l").arg("-g").arg("*.txt").arg("hit").arg("p.zip");
    let out: String = wd.stdout(&mut cmd);
    assert!(out.contains("a.txt"));
    assert!(!out.contains("b.bin"));
}

/// Builds an in-memory zip archive with stored (uncompressed) entries, for
/// tests that need an actual archive on disk without shipping one as a
/// binary fixture.
fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    {
        let mut zw = zip::ZipWriter::new(&mut buf);
        let opts = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, data) in entries {
            zw.start_file(*name, opts).unwrap();
            zw.write_all(data).unwrap();
        }
        zw.finish().unwrap();
    }
    buf.into_inner()
}

#[test]
fn boolean_query_requires_both_terms() {
    let wd = WorkDir::new("boolean_query_requires_both_terms");
    wd.create("sherlock", hay::SHERLOCK);
    let mut cmd = wd.command();
    cmd.arg("--query").arg("Sherlock AND luck").arg("sherlock");
    let out: String = wd.stdout(&mut cmd);
    assert!(!out.is_empty());

    let mut cmd = wd.command();
    cmd.arg("--query").arg("Sherlock AND zzzznotfound").arg("sherlock");
    wd.assert_err(&mut cmd);
}

#[test]
fn type_filter_restricts_to_matching_extensions() {
    let wd = WorkDir::new("type_filter_restricts_to_matching_extensions");
    wd.create("a.rs", "needle\n");
    wd.create("a.py", "needle\n");
    let mut cmd = wd.command();
    cmd.arg("-t").arg("rust").arg("needle").arg(".");
    let out: String = wd.stdout(&mut cmd);
    assert!(out.contains("a.rs"));
    assert!(!out.contains("a.py"));
}

#[test]
fn max_filesize_skips_large_files() {
    let wd = WorkDir::new("max_filesize_skips_large_files");
    wd.create("small.txt", "needle\n");
    wd.create("big.txt", &"needle\n".repeat(1000));
    let mut cmd = wd.command();
    cmd.arg("--max-filesize").arg("16").arg("needle").arg(".");
    let out: String = wd.stdout(&mut cmd);
    assert!(out.contains("small.txt"));
    assert!(!out.contains("big.txt"));
}
