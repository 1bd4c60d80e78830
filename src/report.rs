use serde::Serialize;

use crate::error::Result;
use crate::types::CommitInfo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub hash: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForgottenFile {
    pub path: String,
    /// The bunch file exists but is empty, i.e. the variant was dropped on purpose
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemCommit {
    pub hash: String,
    pub title: String,
    pub author: String,
    pub forgotten: Vec<ForgottenFile>,
}

/// Outcome of a check run. Problems are data here; the caller picks the exit code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub commits: Vec<CommitSummary>,
    pub problems: Vec<ProblemCommit>,
}

impl CheckReport {
    #[must_use]
    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }

    /// Pretty-printed JSON form of the report
    ///
    /// # Errors
    ///
    /// Returns `Error::SerializationError` if the report can't be serialized
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl From<&CommitInfo> for CommitSummary {
    fn from(commit: &CommitInfo) -> Self {
        Self {
            hash: commit.hash.clone(),
            title: commit.title.clone(),
        }
    }
}

/// Formats the author and committer names, e.g. `[amy (bob)]`.
#[must_use]
pub fn author_string(author: Option<&str>, committer: Option<&str>) -> String {
    match (author, committer) {
        (None, None) => String::new(),
        (None, Some(committer)) => format!("[{committer}]"),
        (Some(author), Some(committer)) if author != committer => {
            format!("[{author} ({committer})]")
        }
        (Some(author), _) => format!("[{author}]"),
    }
}
