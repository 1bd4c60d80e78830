use crate::config;
use crate::error::Result;
use crate::git::{self, Git, GitCli};
use crate::report::{author_string, CheckReport, ForgottenFile, ProblemCommit};
use crate::types::{ChangeType, CommitInfo, Extensions};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, instrument};

/// Bunch-file path to the index of the first checked commit that added it.
pub type CreationIndex = HashMap<String, usize>;

/// Everything a single check run needs, passed explicitly.
#[derive(Debug, Clone)]
pub struct CheckSettings {
    /// Newest commit of the range (inclusive)
    pub since: String,
    /// Oldest boundary of the range (exclusive); whole history when `None`
    pub until: Option<String>,
    /// Overrides the `.bunch` file when set
    pub extensions: Option<Extensions>,
}

/// Checks the history of a Git repository for forgotten bunch files
pub struct BunchChecker {
    git: GitCli,
}

impl BunchChecker {
    /// Create a checker for a local git repository
    #[instrument]
    pub fn new_from_local(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Creating checker from local repository");

        Ok(Self {
            git: GitCli::new(path.to_path_buf()),
        })
    }

    /// Create a checker by cloning a remote repository
    #[instrument]
    pub fn new_from_remote(repo_url: &str) -> Result<Self> {
        debug!(repo_url = %repo_url, "Creating checker from remote repository");

        let git = GitCli::new_with_temp_workspace()?;
        git.clone_repo(repo_url)?;
        debug!(repo_url = %repo_url, "Repository cloned successfully");

        Ok(Self { git })
    }

    /// Creates a new `BunchChecker` from a repository source
    /// The source can be either a local path or a remote URL (HTTPS/SSH)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - For remote URLs: The repository cannot be cloned or the temporary workspace
    ///   cannot be created
    /// - Git operations fail
    #[instrument]
    pub fn new(repo: &str) -> Result<Self> {
        let is_url = repo.starts_with("https://") || repo.starts_with("git@");

        if is_url {
            debug!("Repository is a remote URL, creating from remote");
            Self::new_from_remote(repo)
        } else {
            debug!("Repository is a local path, creating from local");
            Self::new_from_local(Path::new(repo))
        }
    }

    /// Extensions given in the settings, or the ones from the repository's `.bunch` file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no extensions are given and the file can't be used.
    pub fn resolve_extensions(&self, settings: &CheckSettings) -> Result<Extensions> {
        match &settings.extensions {
            Some(extensions) => Ok(extensions.clone()),
            None => config::read_extensions(self.git.repo_path()),
        }
    }

    /// Reads the commit range and reports every commit with forgotten bunch files.
    ///
    /// # Errors
    ///
    /// Configuration, git and filesystem errors abort the run.
    #[instrument(skip(self))]
    pub fn check(&self, settings: &CheckSettings) -> Result<CheckReport> {
        let extensions = self.resolve_extensions(settings)?;
        let commits = git::read_commits(&self.git, &settings.since, settings.until.as_deref())?;
        check_commits(&commits, &extensions, self.git.repo_path())
    }
}

/// Runs the detector over every commit and collects the problem commits.
///
/// # Errors
///
/// Returns an error if a flagged bunch file can't be read.
#[instrument(skip_all, fields(commits_count = commits.len(), root = %root.display()))]
pub fn check_commits(
    commits: &[CommitInfo],
    extensions: &Extensions,
    root: &Path,
) -> Result<CheckReport> {
    let creation_index = build_creation_index(commits, extensions);
    let mut deletion_cache = DeletionCache::default();
    let mut report = CheckReport {
        commits: commits.iter().map(Into::into).collect(),
        problems: Vec::new(),
    };

    for (index, commit) in commits.iter().enumerate() {
        let forgotten = check_one_commit(commit, extensions, root, &creation_index, index);
        if forgotten.is_empty() {
            continue;
        }
        debug!(hash = %commit.hash, forgotten = ?forgotten, "Commit forgot bunch files");

        let forgotten = forgotten
            .into_iter()
            .map(|path| -> Result<ForgottenFile> {
                let deleted = deletion_cache.is_deleted(root, &path)?;
                Ok(ForgottenFile { path, deleted })
            })
            .collect::<Result<Vec<_>>>()?;

        report.problems.push(ProblemCommit {
            hash: commit.hash.clone(),
            title: commit.title.clone(),
            author: author_string(commit.author.as_deref(), commit.committer.as_deref()),
            forgotten,
        });
    }
    Ok(report)
}

/// Records, per bunch file, the first commit index with an ADD of that path.
#[must_use]
pub fn build_creation_index(commits: &[CommitInfo], extensions: &Extensions) -> CreationIndex {
    let mut index = CreationIndex::new();
    for (commit_index, commit) in commits.iter().enumerate() {
        for action in &commit.file_actions {
            if action.change_type != ChangeType::Add {
                continue;
            }
            let Some(path) = &action.new_path else {
                continue;
            };
            if extensions.is_bunch_path(path) {
                index.entry(path.clone()).or_insert(commit_index);
            }
        }
    }
    index
}

/// Bunch files that exist on disk, sit next to a file changed by `commit`, and
/// were not updated with it.
///
/// A sibling added later in the list than `commit_index` doesn't count.
#[must_use]
pub fn check_one_commit(
    commit: &CommitInfo,
    extensions: &Extensions,
    root: &Path,
    creation_index: &CreationIndex,
    commit_index: usize,
) -> Vec<String> {
    let affected: HashSet<&str> = commit
        .file_actions
        .iter()
        .filter_map(|action| action.new_path.as_deref())
        .collect();

    let mut forgotten = Vec::new();
    for path in commit
        .file_actions
        .iter()
        .filter_map(|action| action.new_path.as_deref())
        .filter(|path| !extensions.is_bunch_path(path))
    {
        for ext in extensions.iter() {
            let sibling = format!("{path}.{ext}");
            if affected.contains(sibling.as_str()) || !root.join(&sibling).exists() {
                continue;
            }
            let created_later = creation_index
                .get(&sibling)
                .is_some_and(|&created| commit_index < created);
            if !created_later {
                forgotten.push(sibling);
            }
        }
    }
    forgotten
}

/// Whether the bunch file exists and is blank, which marks an intentionally dropped variant.
///
/// # Errors
///
/// Returns an error if the file exists but can't be read. Non-UTF-8 content
/// counts as text with something in it.
pub fn is_deleted_bunch_file(root: &Path, path: &str) -> Result<bool> {
    let full_path = root.join(path);
    if !full_path.is_file() {
        return Ok(false);
    }
    let bytes = fs::read(full_path)?;
    Ok(String::from_utf8_lossy(&bytes).trim().is_empty())
}

/// Memoizes [`is_deleted_bunch_file`] for the duration of a run.
#[derive(Debug, Default)]
pub struct DeletionCache {
    entries: HashMap<String, bool>,
}

impl DeletionCache {
    /// # Errors
    ///
    /// Propagates read errors from [`is_deleted_bunch_file`]; failures aren't cached.
    pub fn is_deleted(&mut self, root: &Path, path: &str) -> Result<bool> {
        if let Some(&deleted) = self.entries.get(path) {
            return Ok(deleted);
        }
        let deleted = is_deleted_bunch_file(root, path)?;
        self.entries.insert(path.to_string(), deleted);
        Ok(deleted)
    }
}
