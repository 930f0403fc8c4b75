//! Path selection (spec component C6) for entries that don't pass through
//! `ignore::Walk` directly: archive members are extracted in memory, so
//! they need the same glob/type filtering re-applied to their inner paths
//! by hand.
//!
//! Top-level traversal instead wires `ignore::Override`/`ignore::Types`
//! straight into `ignore::WalkBuilder`, which already implements this
//! precedence for on-disk paths (see `walk.rs`).

use std::path::Path;

use ignore::overrides::Override;
use ignore::types::Types;

/// Combines glob overrides and file-type selection into the one check an
/// archive member's synthetic path needs to pass.
#[derive(Clone)]
pub struct Selector {
    overrides: Override,
    types: Types,
}

impl Selector {
    /// Builds a selector from an already-compiled override set and type
    /// matcher, normally the same ones handed to `ignore::WalkBuilder`.
    pub fn new(overrides: Override, types: Types) -> Selector {
        Selector { overrides, types }
    }

    /// A selector that accepts every path.
    pub fn everything() -> Selector {
        Selector { overrides: Override::empty(), types: Types::empty() }
    }

    /// True if `path` should be searched.
    ///
    /// Overrides take precedence: an explicit whitelist narrows to exactly
    /// those globs, and an explicit exclude always wins. Type selection is
    /// then applied the same way `ignore::dir::Ignore` layers it on top of
    /// gitignore rules.
    pub fn matches<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        let ov = self.overrides.matched(path, false);
        if ov.is_ignore() {
            return false;
        }
        if ov.is_whitelist() {
            return true;
        }
        !self.types.matched(path, false).is_ignore()
    }
}

#[cfg(test)]
mod tests {
    use super::Selector;
    use ignore::overrides::OverrideBuilder;
    use ignore::types::{Types, TypesBuilder};

    #[test]
    fn everything_accepts_all() {
        let sel = Selector::everything();
        assert!(sel.matches("anything.bin"));
    }

    #[test]
    fn type_selection_filters() {
        let mut tb = TypesBuilder::new();
        tb.add_def("rust:*.rs").unwrap();
        tb.select("rust");
        let types = tb.build().unwrap();
        let sel = Selector::new(ignore::overrides::Override::empty(), types);
        assert!(sel.matches("main.rs"));
        assert!(!sel.matches("main.c"));
    }

    #[test]
    fn override_whitelist_wins_over_types() {
        let mut ob = OverrideBuilder::new("/root");
        ob.add("*.log").unwrap();
        let overrides = ob.build().unwrap();
        let sel = Selector::new(overrides, Types::empty());
        assert!(sel.matches("a.log"));
        assert!(!sel.matches("a.txt"));
    }
}
