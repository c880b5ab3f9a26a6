use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One bibliography record: citation key, entry type and its raw fields.
///
/// Field names are lowercase. The `journal` field holds the normalized
/// (uppercased) journal name once the entry has gone through the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibEntry {
    pub key: String,
    pub entry_type: String,
    pub fields: BTreeMap<String, String>,
}

impl BibEntry {
    pub const JOURNAL: &'static str = "journal";

    pub fn new(key: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entry_type: entry_type.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// The journal name, if present and not blank.
    pub fn journal(&self) -> Option<&str> {
        self.get(Self::JOURNAL)
            .filter(|journal| !journal.trim().is_empty())
    }
}

/// Normalizes a journal name for matching: whitespace runs collapse to a
/// single space and the result is uppercased.
pub fn normalize_journal_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
