use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeType {
    Add,
    Modify,
    Delete,
    Rename,
    Copy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAction {
    /// Path after the change, `None` for deletions
    pub new_path: Option<String>,
    pub change_type: ChangeType,
}

impl FileAction {
    #[must_use]
    pub fn new(change_type: ChangeType, new_path: Option<&str>) -> Self {
        Self {
            new_path: new_path.map(str::to_string),
            change_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub hash: String,
    /// First line of the commit message
    pub title: String,
    pub author: Option<String>,
    pub committer: Option<String>,
    pub file_actions: Vec<FileAction>,
}

/// Ordered, non-empty set of distinct bunch suffixes such as `kt183` or `as32`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extensions(Vec<String>);

impl Extensions {
    /// Builds the set, rejecting an empty list and duplicates.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` when the list is empty or repeats an extension.
    pub fn new(extensions: Vec<String>) -> Result<Self> {
        if extensions.is_empty() {
            return Err(Error::ConfigError("no bunch extensions given".to_string()));
        }
        for (i, ext) in extensions.iter().enumerate() {
            if extensions[..i].contains(ext) {
                return Err(Error::ConfigError(format!(
                    "duplicate bunch extension '{ext}'"
                )));
            }
        }
        Ok(Self(extensions))
    }

    /// Parses a comma-separated list like `kt183,as32`. Blank items are skipped.
    ///
    /// # Errors
    ///
    /// Same as [`Extensions::new`].
    pub fn parse_list(list: &str) -> Result<Self> {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|ext| !ext.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, ext: &str) -> bool {
        self.0.iter().any(|e| e == ext)
    }

    /// Whether `path` itself is a bunch file, judged by its file extension.
    #[must_use]
    pub fn is_bunch_path(&self, path: &str) -> bool {
        file_extension(path).is_some_and(|ext| self.contains(ext))
    }
}

/// Text after the last `.` of the final path component.
#[must_use]
pub fn file_extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.').map(|(_, ext)| ext)
}
