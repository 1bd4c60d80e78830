pub use checker::{BunchChecker, CheckSettings, CreationIndex, DeletionCache};
pub use error::{Error, Result};
pub use report::{author_string, CheckReport, CommitSummary, ForgottenFile, ProblemCommit};
pub use types::{ChangeType, CommitInfo, Extensions, FileAction};

pub mod checker;
pub mod config;
mod error;
pub mod git;
mod report;
mod types;

/// Creates a new `BunchChecker` for a local path or a remote URL (HTTPS/SSH).
///
/// # Errors
///
/// when the remote repository could not be cloned.
pub fn new(repo: &str) -> Result<BunchChecker> {
    BunchChecker::new(repo)
}

/// Checks the commit range of `repo` described by `settings`.
///
/// # Arguments
///
/// * `repo`: local path or remote URL of the repository.
/// * `settings`: commit range and optional explicit extensions.
///
/// # Errors
///
/// Returns an error on configuration, git or filesystem failures. Forgotten
/// bunch files are not an error; see [`CheckReport::has_problems`].
pub fn check(repo: &str, settings: &CheckSettings) -> Result<CheckReport> {
    BunchChecker::new(repo)?.check(settings)
}
