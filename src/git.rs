use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::types::{ChangeType, CommitInfo, FileAction};

const RECORD_SEPARATOR: char = '\x1e';
const FIELD_SEPARATOR: char = '\x1f';
const PATH_SEPARATOR: char = '\0';
const LOG_FORMAT: &str = "--format=%x1e%H%x1f%an%x1f%cn%x1f%s";

/// Trait defining Git operations required by the library
pub trait Git {
    /// Clone a Git repository from a URL into the workspace
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be cloned
    fn clone_repo(&self, url: &str) -> Result<()>;

    /// Run a Git command with the given arguments
    ///
    /// # Errors
    ///
    /// Returns an error if the git command cannot be executed
    fn run_git_command(&self, args: &[&str]) -> Result<String>;

    /// Working tree the commands run in
    fn repo_path(&self) -> &Path;
}

/// Implementation of Git operations using the local Git CLI
pub struct GitCli {
    repo_path: PathBuf,
    _temp_workspace: Option<tree_fs::Tree>, // To manage lifetime of temp dir
}

impl GitCli {
    /// Creates a new `GitCli` instance with the given repository path
    #[must_use]
    pub const fn new(repo_path: PathBuf) -> Self {
        Self {
            repo_path,
            _temp_workspace: None,
        }
    }

    /// Creates a new `GitCli` instance with a temporary workspace
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary workspace cannot be created
    pub fn new_with_temp_workspace() -> Result<Self> {
        debug!("Creating temporary workspace");
        let tree = tree_fs::TreeBuilder::default()
            .create()
            .map_err(|e| Error::TempDirError(e.to_string()))?;

        let repo_path = tree.root.clone();

        debug!("Temporary workspace created");

        Ok(Self {
            repo_path,
            _temp_workspace: Some(tree),
        })
    }
}

impl Git for GitCli {
    #[instrument(skip(self), fields(url = %url, target_dir = %self.repo_path.display()))]
    fn clone_repo(&self, url: &str) -> Result<()> {
        let output = Command::new("git")
            .args(["clone", url, &self.repo_path.to_string_lossy()])
            .output()
            .map_err(|e| Error::GitCommandError(e.to_string()))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            debug!(error = %error, "Clone failed");
            return Err(Error::GitCommandError(error.to_string()));
        }

        debug!("Repository cloned successfully");
        Ok(())
    }

    #[instrument(skip(self), fields(args = ?args, repo_path = %self.repo_path.display()))]
    fn run_git_command(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .map_err(|e| Error::GitCommandError(e.to_string()))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            debug!(error = %error, "Git command failed");
            return Err(Error::GitCommandError(error.to_string()));
        }

        let result = String::from_utf8(output.stdout)
            .map(|s| s.trim().to_string())
            .map_err(|e| Error::GitCommandError(e.to_string()))?;

        debug!(
            output_length = result.len(),
            "Git command completed successfully"
        );
        Ok(result)
    }

    fn repo_path(&self) -> &Path {
        &self.repo_path
    }
}

/// Reads the commits reachable from `since` but not from `until`, newest first.
///
/// # Errors
///
/// Returns an error if `git log` fails or its output can't be parsed
#[instrument(skip(git))]
pub fn read_commits(git: &impl Git, since: &str, until: Option<&str>) -> Result<Vec<CommitInfo>> {
    let range = until.map_or_else(|| since.to_string(), |until| format!("{until}..{since}"));
    let output = git.run_git_command(&[
        "-c",
        "core.quotePath=false",
        "log",
        "-z",
        LOG_FORMAT,
        "--name-status",
        "-M",
        "-C",
        &range,
        "--",
    ])?;
    let commits = parse_log(&output)?;
    debug!(range = %range, commits_count = commits.len(), "Commits read");
    Ok(commits)
}

pub(crate) fn parse_log(output: &str) -> Result<Vec<CommitInfo>> {
    output
        .split(RECORD_SEPARATOR)
        .filter(|record| !record.trim().is_empty())
        .map(parse_record)
        .collect()
}

/// One `-z` record: `header NUL [LF] (status NUL path NUL [path NUL])*`.
fn parse_record(record: &str) -> Result<CommitInfo> {
    let (header, changes) = record.split_once(PATH_SEPARATOR).unwrap_or((record, ""));
    let mut fields = header.splitn(4, FIELD_SEPARATOR);
    let hash = fields
        .next()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::LogParseError(format!("missing commit hash in '{header}'")))?;
    let author = non_empty(fields.next());
    let committer = non_empty(fields.next());
    let title = fields.next().unwrap_or_default().trim_end().to_string();

    let mut tokens = changes
        .strip_prefix('\n')
        .unwrap_or(changes)
        .split(PATH_SEPARATOR)
        .filter(|token| !token.is_empty());
    let mut file_actions = Vec::new();
    while let Some(status) = tokens.next() {
        file_actions.push(parse_change(status.trim(), &mut tokens)?);
    }

    Ok(CommitInfo {
        hash: hash.to_string(),
        title,
        author,
        committer,
        file_actions,
    })
}

fn parse_change<'a>(
    status: &str,
    paths: &mut impl Iterator<Item = &'a str>,
) -> Result<FileAction> {
    let mut next_path = || {
        paths
            .next()
            .ok_or_else(|| Error::LogParseError(format!("missing path for status '{status}'")))
    };

    let action = match status.chars().next() {
        Some('A') => FileAction::new(ChangeType::Add, Some(next_path()?)),
        Some('M' | 'T') => FileAction::new(ChangeType::Modify, Some(next_path()?)),
        Some('D') => {
            next_path()?;
            FileAction::new(ChangeType::Delete, None)
        }
        Some('R') => {
            next_path()?;
            FileAction::new(ChangeType::Rename, Some(next_path()?))
        }
        Some('C') => {
            next_path()?;
            FileAction::new(ChangeType::Copy, Some(next_path()?))
        }
        _ => {
            return Err(Error::LogParseError(format!(
                "unknown change status '{status}'"
            )))
        }
    };
    Ok(action)
}

fn non_empty(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}
