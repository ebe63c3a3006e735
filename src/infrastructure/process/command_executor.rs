use crate::domain::value_objects::{ExitClassification, ExitCodePolicy};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use tracing::debug;

/// Exit code recorded when no real exit status exists (spawn failure, timeout, signal)
pub const NO_EXIT_CODE: i32 = -1;

/// Command construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandExecutorError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

/// Configuration for command execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Working directory for command execution
    pub working_directory: Option<PathBuf>,

    /// Environment variables to set for the process
    pub environment_variables: HashMap<String, String>,

    /// Timeout for command execution in seconds
    pub timeout_seconds: Option<u64>,
}

impl ExecutionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_directory<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_directory = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_environment_variable(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.environment_variables.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: Option<u64>) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// A program plus its arguments; arguments are never re-split on whitespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub config: ExecutionConfig,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            config: ExecutionConfig::default(),
        }
    }

    /// Build from an argv-style list (first element is the program)
    pub fn from_argv(argv: &[String]) -> Result<Self, CommandExecutorError> {
        match argv.split_first() {
            Some((program, args)) if !program.trim().is_empty() => {
                Ok(Self::new(program.clone(), args.iter().cloned()))
            }
            _ => Err(CommandExecutorError::InvalidCommand(
                "Command is empty".to_string(),
            )),
        }
    }

    pub fn with_config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_working_directory<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config = self.config.with_working_directory(dir);
        self
    }

    /// Human-readable command line
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of one external process invocation; created once, never mutated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandExecutionResult {
    pub command: String,
    pub working_directory: String,
    pub exit_code: i32,
    /// Failure description; empty when the process exited with code 0
    pub message: String,
    pub stdout: String,
    pub stderr: String,
}

impl CommandExecutionResult {
    pub fn classify(&self, policy: &ExitCodePolicy) -> ExitClassification {
        policy.classify(self.exit_code)
    }

    /// One-line summary carrying everything needed to diagnose a failure
    pub fn diagnostic(&self) -> String {
        let mut text = format!(
            "'{}' in {} exited with code {}",
            self.command, self.working_directory, self.exit_code
        );
        if !self.message.is_empty() && self.exit_code == NO_EXIT_CODE {
            text.push_str(&format!(": {}", self.message));
        }
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            text.push_str(&format!(": {}", stderr));
        }
        text
    }
}

/// Runs an external process to completion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(&self, spec: &CommandSpec) -> CommandExecutionResult;
}

/// Command runner backed by `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCommandRunner;

impl ProcessCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn execute(&self, spec: &CommandSpec) -> CommandExecutionResult {
        let start_time = Instant::now();
        let command = spec.command_line();
        let working_directory = match &spec.config.working_directory {
            Some(dir) => dir.display().to_string(),
            None => std::env::current_dir()
                .map(|dir| dir.display().to_string())
                .unwrap_or_default(),
        };

        let failed = |message: String| CommandExecutionResult {
            command: command.clone(),
            working_directory: working_directory.clone(),
            exit_code: NO_EXIT_CODE,
            message,
            stdout: String::new(),
            stderr: String::new(),
        };

        let mut cmd = TokioCommand::new(&spec.program);
        cmd.args(&spec.args)
            .envs(&spec.config.environment_variables)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &spec.config.working_directory {
            cmd.current_dir(dir);
        }

        debug!("Executing '{}' in {}", command, working_directory);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return failed(format!("Failed to spawn '{}': {}", command, e)),
        };

        let output = match spec.config.timeout_seconds {
            Some(timeout_secs) => {
                match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
                    Ok(output) => output,
                    Err(_) => {
                        return failed(format!(
                            "Command timed out after {} seconds",
                            timeout_secs
                        ))
                    }
                }
            }
            None => child.wait_with_output().await,
        };

        let output = match output {
            Ok(output) => output,
            Err(e) => return failed(format!("Failed to wait for '{}': {}", command, e)),
        };

        let exit_code = output.status.code().unwrap_or(NO_EXIT_CODE);
        let message = if output.status.success() {
            String::new()
        } else if output.status.code().is_none() {
            "Process terminated by signal".to_string()
        } else {
            format!("Command '{}' exited with code {}", command, exit_code)
        };

        debug!(
            "'{}' finished with code {} in {} ms",
            command,
            exit_code,
            start_time.elapsed().as_millis()
        );

        CommandExecutionResult {
            command,
            working_directory,
            exit_code,
            message,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_simple_command_execution() {
        let spec = CommandSpec::new("echo", ["Hello, World!"]);
        let result = ProcessCommandRunner::new().execute(&spec).await;

        assert_eq!(result.exit_code, 0);
        assert!(result.message.is_empty());
        assert!(result.stdout.contains("Hello, World!"));
        assert_eq!(result.command, "echo Hello, World!");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_with_working_directory() {
        let temp_dir = TempDir::new().unwrap();
        let spec = CommandSpec::new("pwd", Vec::<String>::new()).with_working_directory(temp_dir.path());

        let result = ProcessCommandRunner::new().execute(&spec).await;

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.working_directory, temp_dir.path().display().to_string());
        let reported = std::fs::canonicalize(result.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(temp_dir.path()).unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_command() {
        let spec = CommandSpec::new("sh", ["-c", "echo broken >&2; exit 3"]);
        let result = ProcessCommandRunner::new().execute(&spec).await;

        assert_eq!(result.exit_code, 3);
        assert!(result.message.contains("exited with code 3"));
        assert_eq!(result.stderr.trim(), "broken");
        assert!(result.diagnostic().contains("broken"));
        assert_eq!(
            result.classify(&ExitCodePolicy::new([0], [3])),
            ExitClassification::Warning
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_timeout() {
        let spec = CommandSpec::new("sleep", ["3"])
            .with_config(ExecutionConfig::new().with_timeout(Some(1)));
        let result = ProcessCommandRunner::new().execute(&spec).await;

        assert_eq!(result.exit_code, NO_EXIT_CODE);
        assert!(result.message.contains("timed out after 1 seconds"));
    }

    #[tokio::test]
    async fn test_missing_program_is_reported_not_raised() {
        let spec = CommandSpec::new("definitely-not-a-real-program-7f3a", ["--version"]);
        let result = ProcessCommandRunner::new().execute(&spec).await;

        assert_eq!(result.exit_code, NO_EXIT_CODE);
        assert!(result.message.starts_with("Failed to spawn"));
        assert!(result.classify(&ExitCodePolicy::default()).is_error());
    }

    #[test]
    fn test_from_argv() {
        let argv = vec!["npm".to_string(), "run".to_string(), "build".to_string()];
        let spec = CommandSpec::from_argv(&argv).unwrap();
        assert_eq!(spec.program, "npm");
        assert_eq!(spec.args, vec!["run", "build"]);
        assert_eq!(spec.command_line(), "npm run build");

        assert!(CommandSpec::from_argv(&[]).is_err());
        assert!(CommandSpec::from_argv(&[" ".to_string()]).is_err());
    }

    #[test]
    fn test_execution_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = ExecutionConfig::new()
            .with_working_directory(temp_dir.path())
            .with_environment_variable("KEY", "value")
            .with_timeout(Some(30));

        assert_eq!(config.working_directory, Some(temp_dir.path().to_path_buf()));
        assert_eq!(config.environment_variables.get("KEY"), Some(&"value".to_string()));
        assert_eq!(config.timeout_seconds, Some(30));
    }
}
