use std::fs;
use std::path::Path;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::types::Extensions;

pub const BUNCH_FILE_NAME: &str = ".bunch";

/// Reads the bunch extensions from the `.bunch` file at the repository root.
///
/// The first non-blank line names the base branch; every following line is a
/// rule `ext1_ext2_...` whose first token is a recognized extension.
///
/// # Errors
///
/// Returns `Error::ConfigError` if the file is missing, unreadable or has no rules.
#[instrument(skip_all, fields(repo_path = %repo_path.display()))]
pub fn read_extensions(repo_path: &Path) -> Result<Extensions> {
    let path = repo_path.join(BUNCH_FILE_NAME);
    let content = fs::read_to_string(&path)
        .map_err(|e| Error::ConfigError(format!("can't read {}: {e}", path.display())))?;
    let extensions = parse_bunch_file(&content)?;
    debug!(extensions = ?extensions, "Extensions loaded from bunch file");
    Ok(extensions)
}

pub(crate) fn parse_bunch_file(content: &str) -> Result<Extensions> {
    let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
    if lines.next().is_none() {
        return Err(Error::ConfigError(format!("{BUNCH_FILE_NAME} is empty")));
    }

    let mut extensions: Vec<String> = Vec::new();
    for rule in lines {
        let first = rule.split('_').next().unwrap_or(rule).to_string();
        if !extensions.contains(&first) {
            extensions.push(first);
        }
    }
    if extensions.is_empty() {
        return Err(Error::ConfigError(format!(
            "{BUNCH_FILE_NAME} should list at least one rule after the base branch"
        )));
    }
    Extensions::new(extensions)
}
