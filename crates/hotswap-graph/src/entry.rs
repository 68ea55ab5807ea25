//! Program entry points and the synthetic entry that replaces them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// File name of the synthetic entry, which later becomes the manager module.
pub const MANAGER_FILENAME: &str = "__hmr_manager.js";

/// Entry point identities in the order the host emitted them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryList(Vec<String>);

impl EntryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: impl Into<String>) {
        self.0.push(id.into());
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Source of the synthetic entry: one `require` per entry, in order.
    pub fn require_source(&self) -> String {
        self.iter()
            .map(|id| format!("require({});\n", json_string(id)))
            .collect()
    }

    /// Identity of the synthetic entry.
    ///
    /// It sits next to the first entry so transforms that resolve paths
    /// relative to the module see the same directory as the real entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoEntries`] when the list is empty.
    pub fn manager_id(&self) -> Result<String> {
        let first = self.first().ok_or(Error::NoEntries)?;
        let dir = Path::new(first).parent().unwrap_or_else(|| Path::new(""));
        Ok(dir.join(MANAGER_FILENAME).to_string_lossy().into_owned())
    }
}

impl<S: Into<String>> FromIterator<S> for EntryList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

fn json_string(value: &str) -> String {
    // Serializing a &str cannot fail
    serde_json::Value::String(value.to_string()).to_string()
}
