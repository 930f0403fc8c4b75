//! Bounded approximate ("fuzzy") string matching, the fuzzy half of C1.
//!
//! Full Sellers/Ukkonen-style bounded edit distance scanning over an
//! entire line is wasteful when the line is long and the pattern is short:
//! most starting positions cannot possibly produce a match within the
//! distance bound. This implementation anchors the scan at positions where
//! the first pattern character matches exactly, then runs a banded dynamic
//! program only in a window around that anchor. A pattern's first
//! character is far more likely to survive a typo-distance edit unchanged
//! than any other single character, so this catches the overwhelming
//! majority of real fuzzy matches while skipping almost all non-candidate
//! positions in long lines.

/// A cost large enough that it can never survive a `max_distance` bound
/// after a handful of `+1` steps, used to disable a DP transition whose
/// edit kind isn't allowed by this spec.
const BLOCKED: usize = usize::MAX / 4;

/// Configuration for a fuzzy search: how many edits are tolerated, which
/// edit kinds (insertion, deletion, substitution) are allowed, and whether
/// transpositions (swapped adjacent characters) count as a single edit, as
/// in Damerau-Levenshtein distance.
#[derive(Clone, Debug)]
pub struct FuzzySpec {
    pattern: Vec<char>,
    max_distance: usize,
    allow_ins: bool,
    allow_del: bool,
    allow_sub: bool,
    transposition: bool,
    best: bool,
    case_insensitive: bool,
}

impl FuzzySpec {
    /// Builds a fuzzy spec for `pattern`, tolerating up to `max_distance`
    /// edits, restricted to whichever of insertion/deletion/substitution
    /// are allowed (`-Z+N`/`-Z-N`/`-Z~N` pass exactly one of these as
    /// `true`; plain `-ZN` passes all three).
    pub fn new(
        pattern: &str,
        max_distance: usize,
        allow_ins: bool,
        allow_del: bool,
        allow_sub: bool,
    ) -> FuzzySpec {
        FuzzySpec {
            pattern: pattern.chars().collect(),
            max_distance,
            allow_ins,
            allow_del,
            allow_sub,
            transposition: true,
            best: false,
            case_insensitive: false,
        }
    }

    /// Enables case-insensitive comparison of both the anchor character and
    /// the banded edit-distance computation.
    pub fn case_insensitive(mut self, yes: bool) -> FuzzySpec {
        self.case_insensitive = yes;
        self
    }

    /// Controls whether an adjacent transposition counts as a single edit
    /// rather than two substitutions. Only takes effect when substitutions
    /// are allowed; on by default.
    pub fn transposition(mut self, yes: bool) -> FuzzySpec {
        self.transposition = yes;
        self
    }

    /// With `best` set, `find_all` reports only the match(es) at the
    /// minimum distance found in `text`, as `-Z best` does across a whole
    /// file.
    pub fn best(mut self, yes: bool) -> FuzzySpec {
        self.best = yes;
        self
    }

    /// True if this spec was built with `.best(true)`.
    pub fn is_best(&self) -> bool {
        self.best
    }

    /// Finds every non-overlapping fuzzy match in `text`, scanning
    /// left to right and preferring the earliest, shortest match at each
    /// anchor. With `best` set, only the minimum-distance match(es) are
    /// kept.
    pub fn find_all(&self, text: &str) -> Vec<FuzzyMatch> {
        if self.pattern.is_empty() {
            return Vec::new();
        }
        let chars: Vec<char> = text.chars().collect();
        let byte_offsets = char_byte_offsets(text);
        let mut out = Vec::new();
        let mut i = 0;
        let first = self.normalize(self.pattern[0]);
        while i < chars.len() {
            if self.normalize(chars[i]) != first {
                i += 1;
                continue;
            }
            if let Some((end_char, distance)) = self.match_at(&chars, i) {
                let start_byte = byte_offsets[i];
                let end_byte = byte_offsets
                    .get(end_char)
                    .copied()
                    .unwrap_or_else(|| text.len());
                out.push(FuzzyMatch {
                    start: start_byte,
                    end: end_byte,
                    distance,
                });
                i = end_char.max(i + 1);
            } else {
                i += 1;
            }
        }
        if self.best {
            if let Some(min) = out.iter().map(|m| m.distance).min() {
                out.retain(|m| m.distance == min);
            }
        }
        out
    }

    fn normalize(&self, c: char) -> char {
        if self.case_insensitive {
            c.to_ascii_lowercase()
        } else {
            c
        }
    }

    /// Runs a banded Damerau-Levenshtein (or plain Levenshtein, depending
    /// on `self.transposition`) computation anchored at `start`, returning
    /// the end position and distance of the best match within the band, if
    /// one exists within `max_distance`. Edit kinds this spec disallows are
    /// priced at `BLOCKED` so the DP never selects them.
    fn match_at(&self, text: &[char], start: usize) -> Option<(usize, usize)> {
        let m = self.pattern.len();
        let k = self.max_distance;
        let window_end = (start + m + k).min(text.len());
        let window = &text[start..window_end];
        let n = window.len();

        // prev2/prev/cur are rows of the DP table; prev2 is needed only
        // for transposition lookahead. Row 0 (prev, before the loop) is
        // dp[i][0]: i pattern-character deletions with no text consumed.
        let mut prev: Vec<usize> = (0..=m)
            .map(|i| if i == 0 || self.allow_del { i } else { BLOCKED })
            .collect();
        let mut prev2: Vec<usize> = prev.clone();
        let mut best: Option<(usize, usize)> = None;

        for j in 1..=n {
            let mut cur = vec![0usize; m + 1];
            // dp[0][j]: j text-character insertions with no pattern consumed.
            cur[0] = if self.allow_ins { j } else { BLOCKED };
            for i in 1..=m {
                let cost = if self.normalize(self.pattern[i - 1]) == self.normalize(window[j - 1])
                {
                    0
                } else {
                    1
                };
                let del_cost = if self.allow_del { cur[i - 1].saturating_add(1) } else { BLOCKED };
                let ins_cost = if self.allow_ins { prev[i].saturating_add(1) } else { BLOCKED };
                let sub_cost =
                    if cost == 0 || self.allow_sub { prev[i - 1].saturating_add(cost) } else { BLOCKED };
                let mut val = del_cost.min(ins_cost).min(sub_cost);
                if self.transposition
                    && self.allow_sub
                    && i > 1
                    && j > 1
                    && self.normalize(self.pattern[i - 1]) == self.normalize(window[j - 2])
                    && self.normalize(self.pattern[i - 2]) == self.normalize(window[j - 1])
                {
                    val = val.min(prev2[i - 2].saturating_add(1));
                }
                cur[i] = val;
            }
            if cur[m] <= k {
                let better = match best {
                    None => true,
                    Some((_, bd)) => cur[m] < bd,
                };
                if better {
                    best = Some((start + j, cur[m]));
                }
            }
            prev2 = prev;
            prev = cur;
        }
        best
    }
}

fn char_byte_offsets(text: &str) -> Vec<usize> {
    let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    offsets.push(text.len());
    offsets
}

/// A single fuzzy match, with the edit distance that produced it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FuzzyMatch {
    start: usize,
    end: usize,
    distance: usize,
}

impl FuzzyMatch {
    /// Byte offset where the match begins.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset where the match ends.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The number of edits between the pattern and the matched substring.
    pub fn distance(&self) -> usize {
        self.distance
    }
}

#[cfg(test)]
mod tests {
    use super::FuzzySpec;

    #[test]
    fn exact_match_has_zero_distance() {
        let spec = FuzzySpec::new("hello", 1, true, true, true);
        let ms = spec.find_all("say hello there");
        assert_eq!(ms.len(), 1);
        assert_eq!(ms[0].distance(), 0);
    }

    #[test]
    fn tolerates_one_substitution() {
        let spec = FuzzySpec::new("hello", 1, true, true, true);
        let ms = spec.find_all("say hallo there");
        assert_eq!(ms.len(), 1);
        assert_eq!(ms[0].distance(), 1);
    }

    #[test]
    fn rejects_beyond_distance() {
        let spec = FuzzySpec::new("hello", 1, true, true, true);
        let ms = spec.find_all("say xyzzz there");
        assert!(ms.is_empty());
    }

    #[test]
    fn transposition_counts_as_one_edit() {
        let with_transposition = FuzzySpec::new("form", 1, true, true, true);
        let ms = with_transposition.find_all("a from b");
        assert_eq!(ms.len(), 1);
        assert_eq!(ms[0].distance(), 1);

        let without = FuzzySpec::new("form", 1, true, true, true).transposition(false);
        let ms2 = without.find_all("a from b");
        assert!(ms2.is_empty());
    }

    #[test]
    fn insertion_only_rejects_substitutions() {
        // "hallo" differs from "hello" by one substitution; with only
        // insertions allowed that edit can't be priced within distance 1.
        let spec = FuzzySpec::new("hello", 1, true, false, false);
        assert!(spec.find_all("say hallo there").is_empty());
    }

    #[test]
    fn deletion_only_rejects_insertions() {
        // "helllo" has an extra "l" relative to "hello": an insertion, not
        // a deletion, so a deletion-only spec must not match it.
        let spec = FuzzySpec::new("hello", 1, false, true, false);
        assert!(spec.find_all("say helllo there").is_empty());
    }

    #[test]
    fn best_keeps_only_minimum_distance_matches() {
        let spec = FuzzySpec::new("foobar", 2, true, true, true).best(true);
        let ms = spec.find_all("foobar fobar xx");
        assert!(ms.iter().all(|m| m.distance() == 0));
    }
}
