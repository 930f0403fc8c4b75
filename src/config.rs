//! Parses `.quickgreprc` configuration files: `NAME=VALUE` lines that
//! supply default command-line flags, read from the current directory and
//! then `$HOME` before argv is parsed.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One `NAME=VALUE` entry from a config file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigEntry {
    /// The option name, e.g. `"smart-case"` or `"type"`.
    pub name: String,
    /// The option's value, empty for boolean flags.
    pub value: String,
}

/// Finds and parses the applicable `.quickgreprc`, returning its entries in
/// file order. Returns an empty vec if no config file exists.
///
/// The current directory is checked first, then `$HOME`. A `config=FILE`
/// entry chains to another file, which is parsed in place of (not in
/// addition to) the remaining lines; chaining does not recurse further than
/// one hop.
pub fn load() -> io::Result<Vec<ConfigEntry>> {
    let path = match find_default_path() {
        Some(p) => p,
        None => return Ok(Vec::new()),
    };
    parse_file(&path)
}

fn find_default_path() -> Option<PathBuf> {
    let cwd = env::current_dir().ok()?.join(".quickgreprc");
    if cwd.is_file() {
        return Some(cwd);
    }
    if let Some(home) = env::var_os("HOME") {
        let home = Path::new(&home).join(".quickgreprc");
        if home.is_file() {
            return Some(home);
        }
    }
    None
}

fn parse_file(path: &Path) -> io::Result<Vec<ConfigEntry>> {
    let contents = fs::read_to_string(path)?;
    let mut entries = parse_str(&contents);
    if let Some(pos) = entries.iter().position(|e| e.name == "config") {
        let chained = entries.remove(pos);
        if !chained.value.is_empty() {
            let chained_path = PathBuf::from(&chained.value);
            return parse_file(&chained_path);
        }
    }
    Ok(entries)
}

fn parse_str(contents: &str) -> Vec<ConfigEntry> {
    let mut entries = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.split_once('=') {
            Some((name, value)) => {
                entries.push(ConfigEntry {
                    name: name.trim().to_string(),
                    value: value.trim().to_string(),
                });
            }
            None => {
                entries.push(ConfigEntry { name: line.to_string(), value: String::new() });
            }
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::parse_str;

    #[test]
    fn parses_name_value_lines() {
        let entries = parse_str("smart-case\nthreads=4\n# a comment\n\ncolor=always\n");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "smart-case");
        assert_eq!(entries[0].value, "");
        assert_eq!(entries[1].name, "threads");
        assert_eq!(entries[1].value, "4");
        assert_eq!(entries[2].name, "color");
        assert_eq!(entries[2].value, "always");
    }

    #[test]
    fn ignores_comments_and_blank_lines() {
        let entries = parse_str("# hello\n\n   \nfoo=bar\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "foo");
    }
}
