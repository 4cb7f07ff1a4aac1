//! Note storage interface.
//!
//! Persistence is an external CRUD layer; the engine only needs
//! [`NoteStore`]'s contract, in particular that content round-trips
//! byte-for-byte when unmodified. [`MemoryStore`] is the reference
//! implementation used by tests and the CLI.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("note not found: {0}")]
    NotFound(String),

    #[error("storage failure: {0}")]
    Backend(String),
}

/// A stored note as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    pub content: String,
    pub title: String,
    pub tags: Vec<String>,
}

/// External note CRUD contract.
pub trait NoteStore {
    fn get_note(&self, path: &str) -> Result<NoteRecord, StoreError>;

    fn save_note(&mut self, path: &str, content: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and tooling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    notes: HashMap<String, NoteRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, record: NoteRecord) {
        self.notes.insert(path.into(), record);
    }

    /// Stored note paths, for building a title index.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.notes.keys().map(String::as_str)
    }
}

impl NoteStore for MemoryStore {
    fn get_note(&self, path: &str) -> Result<NoteRecord, StoreError> {
        self.notes
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    fn save_note(&mut self, path: &str, content: &str) -> Result<(), StoreError> {
        match self.notes.get_mut(path) {
            Some(record) => record.content = content.to_string(),
            None => {
                self.notes.insert(
                    path.to_string(),
                    NoteRecord {
                        content: content.to_string(),
                        title: title_from_path(path),
                        tags: Vec::new(),
                    },
                );
            }
        }
        Ok(())
    }
}

fn title_from_path(path: &str) -> String {
    path.rsplit('/')
        .next()
        .unwrap_or(path)
        .trim_end_matches(".md")
        .to_string()
}
