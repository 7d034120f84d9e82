//! Where schema description documents come from.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::util::{Error, Result};

/// Provides description documents by relative name, e.g. `Prime/Master.xml`.
pub trait DescriptionSource {
    fn read(&self, name: &str) -> Result<String>;
}

/// Reads descriptions from a directory tree.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DescriptionSource for DirectorySource {
    fn read(&self, name: &str) -> Result<String> {
        let path = self.root.join(name);
        fs::read_to_string(&path)
            .map_err(|e| Error::other(format!("{}: {e}", path.display())))
    }
}

/// In-memory descriptions, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    files: BTreeMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.files.insert(name.into(), text.into());
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }
}

impl DescriptionSource for MemorySource {
    fn read(&self, name: &str) -> Result<String> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| Error::other(format!("no description named {name}")))
    }
}

/// Resolve `file` relative to the directory of `base`.
pub(crate) fn sibling_path(base: &str, file: &str) -> String {
    match base.rfind('/') {
        Some(pos) => format!("{}/{}", &base[..pos], file),
        None => file.to_string(),
    }
}
