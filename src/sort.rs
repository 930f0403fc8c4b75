//! Sort-key comparison for `--sort=KEY` (spec component C8).

use std::cmp::Ordering;
use std::str::FromStr;

use crate::source::FileResult;

/// The field results are ordered by.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortKey {
    /// Display path, lexicographic.
    Name,
    /// Lowest fuzzy-match cost first (ties broken by name).
    Best,
    /// File size.
    Size,
    /// Last-accessed time.
    Used,
    /// Last-modified time.
    Changed,
    /// Creation time.
    Created,
}

/// A sort key plus direction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SortSpec {
    /// Which field to compare.
    pub key: SortKey,
    /// Descending instead of ascending.
    pub reverse: bool,
}

impl FromStr for SortSpec {
    type Err = String;

    /// Parses a `--sort` value: an optional leading `r` reverses the
    /// order, e.g. `rsize` sorts largest-first.
    fn from_str(s: &str) -> Result<SortSpec, String> {
        let (reverse, rest) = match s.strip_prefix('r') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let key = match rest {
            "name" => SortKey::Name,
            "best" => SortKey::Best,
            "size" => SortKey::Size,
            "used" => SortKey::Used,
            "changed" => SortKey::Changed,
            "created" => SortKey::Created,
            other => return Err(format!("unrecognized sort key: {}", other)),
        };
        Ok(SortSpec { key, reverse })
    }
}

impl SortSpec {
    /// Orders two results by this spec's key, applying `reverse` last.
    pub fn compare(&self, a: &FileResult, b: &FileResult) -> Ordering {
        let ord = match self.key {
            SortKey::Name => a.source.to_string().cmp(&b.source.to_string()),
            SortKey::Best => a.best_score().cmp(&b.best_score()),
            SortKey::Size => a.size.unwrap_or(0).cmp(&b.size.unwrap_or(0)),
            SortKey::Used => a.accessed.cmp(&b.accessed),
            SortKey::Changed => a.modified.cmp(&b.modified),
            SortKey::Created => a.created.cmp(&b.created),
        };
        if self.reverse {
            ord.reverse()
        } else {
            ord
        }
    }

    /// Sorts `results` in place according to this spec.
    pub fn sort(&self, results: &mut [FileResult]) {
        results.sort_by(|a, b| self.compare(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InputSource;
    use std::path::PathBuf;

    fn result(name: &str, size: u64) -> FileResult {
        let mut r = FileResult::new(InputSource::File(PathBuf::from(name)));
        r.size = Some(size);
        r
    }

    #[test]
    fn parses_plain_and_reversed() {
        let s: SortSpec = "size".parse().unwrap();
        assert_eq!(s.key, SortKey::Size);
        assert!(!s.reverse);

        let s: SortSpec = "rsize".parse().unwrap();
        assert_eq!(s.key, SortKey::Size);
        assert!(s.reverse);
    }

    #[test]
    fn rejects_unknown_key() {
        assert!("rsize2".parse::<SortSpec>().is_err());
    }

    #[test]
    fn sorts_by_size_ascending_then_reversed() {
        let mut results = vec![result("b", 30), result("a", 10), result("c", 20)];
        let spec: SortSpec = "size".parse().unwrap();
        spec.sort(&mut results);
        let sizes: Vec<u64> = results.iter().map(|r| r.size.unwrap()).collect();
        assert_eq!(sizes, vec![10, 20, 30]);

        let spec: SortSpec = "rsize".parse().unwrap();
        spec.sort(&mut results);
        let sizes: Vec<u64> = results.iter().map(|r| r.size.unwrap()).collect();
        assert_eq!(sizes, vec![30, 20, 10]);
    }
}
