use crate::infrastructure::git::GitRepositoryError;
use async_trait::async_trait;
use std::path::Path;

/// Version control operations needed to keep a local working copy current
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Clone a repository from the given URL to the specified path
    async fn clone_repository(
        &self,
        url: &str,
        dest_path: &Path,
        options: &CloneOptions,
    ) -> Result<(), ScmError>;

    /// Fast-forward an existing working copy and report what it touched
    async fn pull(&self, repo_path: &Path) -> Result<PullSummary, ScmError>;

    /// Check if a directory is a valid repository for this SCM
    fn is_repository(&self, path: &Path) -> bool;
}

/// Options for cloning repositories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneOptions {
    /// Branch to check out instead of the remote default
    pub branch: Option<String>,
}

impl CloneOptions {
    pub fn with_branch(branch: Option<String>) -> Self {
        Self { branch }
    }
}

/// What a pull changed in the working copy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullSummary {
    pub files: Vec<String>,
    pub insertions: usize,
    pub deletions: usize,
}

impl PullSummary {
    pub fn has_changes(&self) -> bool {
        !self.files.is_empty() || self.insertions + self.deletions > 0
    }
}

/// Errors that can occur during SCM operations
#[derive(Debug, thiserror::Error)]
pub enum ScmError {
    #[error("Command execution failed: {command}, exit code: {exit_code}, stderr: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Repository inspection failed: {0}")]
    Inspection(#[from] GitRepositoryError),

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ScmError {
    /// Create a command failed error
    pub fn command_failed(
        command: impl Into<String>,
        exit_code: i32,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Tool output best suited for classifying the failure
    pub fn diagnostic_text(&self) -> String {
        match self {
            Self::CommandFailed { stderr, .. } if !stderr.trim().is_empty() => {
                stderr.trim().to_string()
            }
            other => other.to_string(),
        }
    }
}
