//! Output emission (spec component C9): renders `FileResult`s in one of
//! plain, CSV, JSON, XML or hexdump form, colorizing matches in plain mode
//! via `termcolor` the same way the old `term`-crate-based printer did.

use std::io::{self, Write};

use serde::Serialize;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::source::{FileResult, MatchRecord};

/// Which shape the emitted output takes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    /// `path:line:column:text`, the default.
    Plain,
    /// `file,line,column,offset,match` with `""`-quoted fields.
    Csv,
    /// A JSON array of `{file, matches: [...]}` objects.
    Json,
    /// `<grep><file name="..."><match .../></file></grep>`.
    Xml,
    /// A hexdump of each match's line, 1-8 octet columns per row.
    Hex {
        /// Octets per row.
        columns: u8,
        /// Whether to print the printable-character gutter.
        gutter: bool,
    },
}

/// Rendering options orthogonal to the format itself.
#[derive(Clone, Debug)]
pub struct PrinterOptions {
    /// Prefix each line with the source path.
    pub with_filename: bool,
    /// Include the 1-based line number.
    pub line_number: bool,
    /// Include the 1-based column number.
    pub column: bool,
    /// Group matches from the same file under one heading instead of
    /// repeating the filename on every line.
    pub heading: bool,
    /// Colorize matches (plain format only).
    pub color: bool,
    /// Suppress all output; only the process exit code matters.
    pub quiet: bool,
    /// Printed between files when there's more than one context group.
    pub context_separator: Vec<u8>,
}

impl Default for PrinterOptions {
    fn default() -> PrinterOptions {
        PrinterOptions {
            with_filename: false,
            line_number: true,
            column: false,
            heading: false,
            color: false,
            quiet: false,
            context_separator: b"--".to_vec(),
        }
    }
}

/// Emits search results in the configured `OutputFormat`.
pub struct Printer<W> {
    wtr: W,
    format: OutputFormat,
    opts: PrinterOptions,
    results_written: usize,
    json_started: bool,
}

impl<W: WriteColor> Printer<W> {
    /// Builds a printer writing to `wtr` in `format`.
    pub fn new(wtr: W, format: OutputFormat, opts: PrinterOptions) -> Printer<W> {
        Printer { wtr, format, opts, results_written: 0, json_started: false }
    }

    /// Emits whatever header the format needs before the first result
    /// (only JSON and XML have one).
    pub fn start(&mut self) -> io::Result<()> {
        if self.opts.quiet {
            return Ok(());
        }
        match self.format {
            OutputFormat::Json => self.wtr.write_all(b"["),
            OutputFormat::Xml => self.wtr.write_all(b"<grep>\n"),
            OutputFormat::Plain | OutputFormat::Csv | OutputFormat::Hex { .. } => Ok(()),
        }
    }

    /// Emits whatever footer the format needs after the last result.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.opts.quiet {
            return Ok(());
        }
        match self.format {
            OutputFormat::Json => self.wtr.write_all(b"]\n"),
            OutputFormat::Xml => self.wtr.write_all(b"</grep>\n"),
            OutputFormat::Plain | OutputFormat::Csv | OutputFormat::Hex { .. } => Ok(()),
        }
    }

    /// Renders one source's matches. Does nothing if `result.matches` is
    /// empty.
    pub fn print(&mut self, result: &FileResult) -> io::Result<()> {
        if result.matches.is_empty() || self.opts.quiet {
            return Ok(());
        }
        match self.format {
            OutputFormat::Plain => self.print_plain(result)?,
            OutputFormat::Csv => self.print_csv(result)?,
            OutputFormat::Json => self.print_json(result)?,
            OutputFormat::Xml => self.print_xml(result)?,
            OutputFormat::Hex { columns, gutter } => {
                self.print_hex(result, columns, gutter)?
            }
        }
        self.results_written += 1;
        Ok(())
    }

    fn print_plain(&mut self, result: &FileResult) -> io::Result<()> {
        let path = result.source.to_string();
        if self.opts.heading && self.opts.with_filename {
            if self.results_written > 0 {
                self.wtr.write_all(&self.opts.context_separator)?;
                self.wtr.write_all(b"\n")?;
            }
            self.write_heading(&path)?;
        }
        for m in &result.matches {
            if self.opts.with_filename && !self.opts.heading {
                self.write_path(&path)?;
                self.wtr.write_all(b":")?;
            }
            if self.opts.line_number {
                self.write_line_number(m.line)?;
                self.wtr.write_all(b":")?;
            }
            if self.opts.column {
                write!(self.wtr, "{}:", m.column + 1)?;
            }
            self.write_line_with_match(m)?;
        }
        Ok(())
    }

    fn write_path(&mut self, path: &str) -> io::Result<()> {
        if self.opts.color {
            self.wtr.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
            write!(self.wtr, "{}", path)?;
            self.wtr.reset()
        } else {
            write!(self.wtr, "{}", path)
        }
    }

    fn write_heading(&mut self, path: &str) -> io::Result<()> {
        if self.opts.color {
            self.wtr
                .set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
            writeln!(self.wtr, "{}", path)?;
            self.wtr.reset()
        } else {
            writeln!(self.wtr, "{}", path)
        }
    }

    fn write_line_number(&mut self, line: u64) -> io::Result<()> {
        if self.opts.color {
            self.wtr
                .set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true))?;
            write!(self.wtr, "{}", line)?;
            self.wtr.reset()
        } else {
            write!(self.wtr, "{}", line)
        }
    }

    fn write_line_with_match(&mut self, m: &MatchRecord) -> io::Result<()> {
        let (start, end) = m.match_span;
        self.wtr.write_all(&m.text[..start])?;
        if self.opts.color {
            self.wtr
                .set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            self.wtr.write_all(&m.text[start..end])?;
            self.wtr.reset()?;
        } else {
            self.wtr.write_all(&m.text[start..end])?;
        }
        self.wtr.write_all(&m.text[end..])?;
        if !m.text.ends_with(b"\n") {
            self.wtr.write_all(b"\n")?;
        }
        Ok(())
    }

    fn print_csv(&mut self, result: &FileResult) -> io::Result<()> {
        let path = result.source.to_string();
        for m in &result.matches {
            let matched = String::from_utf8_lossy(&m.text[m.match_span.0..m.match_span.1]);
            writeln!(
                self.wtr,
                "{},{},{},{},{}",
                csv_quote(&path),
                m.line,
                m.column + 1,
                m.byte_offset,
                csv_quote(&matched)
            )?;
        }
        Ok(())
    }

    fn print_json(&mut self, result: &FileResult) -> io::Result<()> {
        #[derive(Serialize)]
        struct JsonMatch {
            line: u64,
            column: usize,
            offset: u64,
            #[serde(rename = "match")]
            matched: String,
        }
        #[derive(Serialize)]
        struct JsonFile {
            file: String,
            matches: Vec<JsonMatch>,
        }
        let file = JsonFile {
            file: result.source.to_string(),
            matches: result
                .matches
                .iter()
                .map(|m| JsonMatch {
                    line: m.line,
                    column: m.column + 1,
                    offset: m.byte_offset,
                    matched: String::from_utf8_lossy(&m.text[m.match_span.0..m.match_span.1])
                        .into_owned(),
                })
                .collect(),
        };
        if self.json_started {
            self.wtr.write_all(b",")?;
        }
        self.json_started = true;
        serde_json::to_writer(&mut self.wtr, &file)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    fn print_xml(&mut self, result: &FileResult) -> io::Result<()> {
        writeln!(self.wtr, "<file name=\"{}\">", xml_escape(&result.source.to_string()))?;
        for m in &result.matches {
            let matched = String::from_utf8_lossy(&m.text[m.match_span.0..m.match_span.1]);
            writeln!(
                self.wtr,
                "  <match line=\"{}\" column=\"{}\" offset=\"{}\">{}</match>",
                m.line,
                m.column + 1,
                m.byte_offset,
                xml_escape(&matched)
            )?;
        }
        writeln!(self.wtr, "</file>")
    }

    fn print_hex(&mut self, result: &FileResult, columns: u8, gutter: bool) -> io::Result<()> {
        let columns = columns.clamp(1, 8) as usize;
        let path = result.source.to_string();
        for m in &result.matches {
            writeln!(self.wtr, "{}:{}", path, m.line)?;
            for chunk in m.text.chunks(columns * 8) {
                write!(self.wtr, "  ")?;
                for byte in chunk {
                    write!(self.wtr, "{:02x} ", byte)?;
                }
                if gutter {
                    write!(self.wtr, " |")?;
                    for &byte in chunk {
                        let c = if byte.is_ascii_graphic() || byte == b' ' {
                            byte as char
                        } else {
                            '.'
                        };
                        write!(self.wtr, "{}", c)?;
                    }
                    write!(self.wtr, "|")?;
                }
                writeln!(self.wtr)?;
            }
        }
        Ok(())
    }

    /// Total number of sources printed so far.
    pub fn count(&self) -> usize {
        self.results_written
    }
}

fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FileResult, InputSource, MatchRecord};
    use std::path::PathBuf;
    use termcolor::NoColor;

    fn sample_result() -> FileResult {
        let mut r = FileResult::new(InputSource::File(PathBuf::from("a.rs")));
        r.matches.push(MatchRecord {
            line: 1,
            column: 0,
            byte_offset: 0,
            text: b"hello world\n".to_vec(),
            match_span: (0, 5),
            capture_spans: vec![],
            fuzzy_cost: None,
            is_binary: false,
            before_context: vec![],
            after_context: vec![],
        });
        r
    }

    #[test]
    fn plain_prints_line_number_and_text() {
        let mut out = Vec::new();
        {
            let mut p = Printer::new(
                NoColor::new(&mut out),
                OutputFormat::Plain,
                PrinterOptions { with_filename: true, ..Default::default() },
            );
            p.print(&sample_result()).unwrap();
        }
        let s = String::from_utf8(out).unwrap();
        assert_eq!(s, "a.rs:1:hello world\n");
    }

    #[test]
    fn xml_escapes_reserved_characters() {
        assert_eq!(xml_escape("a & b <c>"), "a &amp; b &lt;c&gt;");
    }

    #[test]
    fn csv_quotes_commas() {
        assert_eq!(csv_quote("a,b"), "\"a,b\"");
        assert_eq!(csv_quote("plain"), "plain");
    }
}
