use super::scm_interface::{CloneOptions, PullSummary, ScmError, VersionControl};
use crate::infrastructure::git::GitRepository;
use crate::infrastructure::process::{
    CommandExecutionResult, CommandRunner, CommandSpec, ExecutionConfig, ProcessCommandRunner,
};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Git implementation of version control operations.
///
/// Network operations go through the `git` executable so the user's
/// credential helpers and SSH configuration apply; history inspection
/// uses libgit2.
pub struct GitScm {
    git_executable: String,
    runner: Arc<dyn CommandRunner>,
}

impl Default for GitScm {
    fn default() -> Self {
        Self {
            git_executable: "git".to_string(),
            runner: Arc::new(ProcessCommandRunner::new()),
        }
    }
}

impl GitScm {
    /// Create a new Git SCM instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new Git SCM instance with custom executable path
    pub fn with_executable(executable: impl Into<String>) -> Self {
        Self {
            git_executable: executable.into(),
            ..Self::default()
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Execute a git command in the given directory
    async fn execute_git_command(
        &self,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> CommandExecutionResult {
        // Never block on an interactive credential prompt
        let mut config = ExecutionConfig::new().with_environment_variable("GIT_TERMINAL_PROMPT", "0");
        if let Some(dir) = working_dir {
            config = config.with_working_directory(dir);
        }

        let spec = CommandSpec::new(self.git_executable.as_str(), args.iter().copied())
            .with_config(config);
        self.runner.execute(&spec).await
    }

    /// Execute a git command and check for success
    async fn execute_git_command_checked(
        &self,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> Result<String, ScmError> {
        let result = self.execute_git_command(args, working_dir).await;

        if result.exit_code != 0 {
            let stderr = if result.stderr.trim().is_empty() {
                result.message
            } else {
                result.stderr
            };
            return Err(ScmError::command_failed(result.command, result.exit_code, stderr));
        }

        Ok(result.stdout.trim().to_string())
    }
}

#[async_trait]
impl VersionControl for GitScm {
    async fn clone_repository(
        &self,
        url: &str,
        dest_path: &Path,
        options: &CloneOptions,
    ) -> Result<(), ScmError> {
        let dest = dest_path.to_str().ok_or_else(|| ScmError::Internal {
            message: format!("Destination path is not valid UTF-8: {}", dest_path.display()),
        })?;

        let mut args = vec!["clone"];

        if let Some(branch) = &options.branch {
            args.push("--branch");
            args.push(branch);
        }

        args.push("--");
        args.push(url);
        args.push(dest);

        let working_dir = dest_path.parent().filter(|p| p.is_dir());
        self.execute_git_command_checked(&args, working_dir).await?;

        debug!("Cloned {} into {}", url, dest_path.display());
        Ok(())
    }

    async fn pull(&self, repo_path: &Path) -> Result<PullSummary, ScmError> {
        let before = GitRepository::open(repo_path)?.head_commit()?;

        self.execute_git_command_checked(&["pull", "--ff-only"], Some(repo_path))
            .await?;

        let repo = GitRepository::open(repo_path)?;
        let after = match repo.head_commit()? {
            Some(after) => after,
            None => return Ok(PullSummary::default()),
        };

        let diff = repo.diff_summary(before, after)?;
        debug!(
            "Pull in {} touched {} file(s), +{} -{}",
            repo_path.display(),
            diff.files.len(),
            diff.insertions,
            diff.deletions
        );

        Ok(PullSummary {
            files: diff.files,
            insertions: diff.insertions,
            deletions: diff.deletions,
        })
    }

    fn is_repository(&self, path: &Path) -> bool {
        path.join(".git").exists()
    }
}
