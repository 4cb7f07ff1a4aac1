//! Click-time wikilink resolution.
//!
//! Wikilinks carry only a title; the title→path mapping lives in an
//! index the caller caches and explicitly invalidates whenever a note
//! is created, renamed, or deleted. Resolution happens when the link
//! is activated, never at render time, so a stale render cannot bake
//! in a wrong target.

use std::collections::HashMap;

/// External resolver contract: note title in, note path out (or
/// nothing; unresolved titles are a notification, not an error).
pub trait WikilinkResolver {
    fn resolve(&self, title: &str) -> Option<String>;
}

/// Case-insensitive title→path index.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    entries: HashMap<String, String>,
}

impl TitleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (title, path) pairs; a later pair wins on duplicate
    /// titles.
    pub fn from_entries<I, T, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (T, P)>,
        T: AsRef<str>,
        P: Into<String>,
    {
        let mut index = Self::new();
        for (title, path) in entries {
            index.insert(title.as_ref(), path);
        }
        index
    }

    pub fn insert(&mut self, title: &str, path: impl Into<String>) {
        self.entries.insert(Self::key(title), path.into());
    }

    pub fn remove(&mut self, title: &str) {
        self.entries.remove(&Self::key(title));
    }

    /// Drop everything. Callers rebuild after note create/rename/delete.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(title: &str) -> String {
        title.trim().to_lowercase()
    }
}

impl WikilinkResolver for TitleIndex {
    fn resolve(&self, title: &str) -> Option<String> {
        self.entries.get(&Self::key(title)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_is_case_insensitive() {
        let index = TitleIndex::from_entries([("Rust Safety", "notes/rust-safety.md")]);

        assert_eq!(
            index.resolve("rust safety").as_deref(),
            Some("notes/rust-safety.md")
        );
        assert_eq!(
            index.resolve("  RUST SAFETY ").as_deref(),
            Some("notes/rust-safety.md")
        );
    }

    #[test]
    fn unknown_title_resolves_to_none() {
        let index = TitleIndex::new();
        assert_eq!(index.resolve("Ghost"), None);
    }

    #[test]
    fn clear_invalidates_the_cache() {
        let mut index = TitleIndex::from_entries([("A", "a.md")]);
        assert!(!index.is_empty());

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.resolve("A"), None);
    }

    #[test]
    fn later_duplicate_title_wins() {
        let index = TitleIndex::from_entries([("Note", "old.md"), ("note", "new.md")]);
        assert_eq!(index.resolve("Note").as_deref(), Some("new.md"));
    }
}
