use crate::domain::entities::addon_config::ControlScriptSettings;
use crate::domain::value_objects::failure_kind::{classify_message, SCRIPT_FAILURE_PATTERNS};
use crate::domain::value_objects::FailureKind;
use crate::infrastructure::process::{CommandRunner, CommandSpec, ProcessCommandRunner};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Control-script invocation errors
#[derive(Debug, Error)]
pub enum ControlScriptError {
    #[error("Control-script function '{function}' failed (exit code {exit_code}): {message}")]
    FunctionFailed {
        function: String,
        exit_code: i32,
        message: String,
    },

    #[error("Control-script function '{function}' returned invalid output: {message}")]
    InvalidOutput { function: String, message: String },

    #[error("Failed to encode arguments for '{function}': {source}")]
    ArgumentEncoding {
        function: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ControlScriptError {
    pub fn function_failed(
        function: impl Into<String>,
        exit_code: i32,
        message: impl Into<String>,
    ) -> Self {
        Self::FunctionFailed {
            function: function.into(),
            exit_code,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::FunctionFailed { message, .. } => {
                classify_message(message, SCRIPT_FAILURE_PATTERNS)
            }
            Self::InvalidOutput { .. } | Self::ArgumentEncoding { .. } => FailureKind::Unclassified,
        }
    }
}

/// Narrow capability over the automation system's control-script facility.
///
/// Only named functions are invoked; callers never build script source.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ControlScriptRuntime: Send + Sync {
    async fn run_function(&self, function: &str, args: &[Value]) -> Result<Value, ControlScriptError>;
}

/// Runs `<executable> [extra args] <script> <function> <json args>` and
/// reads the function's return value as JSON from stdout
pub struct ProcessScriptRuntime {
    executable: String,
    script: PathBuf,
    extra_args: Vec<String>,
    runner: Arc<dyn CommandRunner>,
}

impl ProcessScriptRuntime {
    pub fn new(settings: &ControlScriptSettings) -> Self {
        Self {
            executable: settings.executable.clone(),
            script: settings.script.clone(),
            extra_args: settings.extra_args.clone(),
            runner: Arc::new(ProcessCommandRunner::new()),
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    fn build_spec(&self, function: &str, args: &[Value]) -> Result<CommandSpec, ControlScriptError> {
        let encoded = serde_json::to_string(args).map_err(|source| {
            ControlScriptError::ArgumentEncoding {
                function: function.to_string(),
                source,
            }
        })?;

        let mut argv = self.extra_args.clone();
        argv.push(self.script.display().to_string());
        argv.push(function.to_string());
        argv.push(encoded);

        Ok(CommandSpec::new(self.executable.as_str(), argv))
    }
}

#[async_trait]
impl ControlScriptRuntime for ProcessScriptRuntime {
    async fn run_function(&self, function: &str, args: &[Value]) -> Result<Value, ControlScriptError> {
        let spec = self.build_spec(function, args)?;
        debug!("Calling control-script function '{}'", function);

        let result = self.runner.execute(&spec).await;
        if result.exit_code != 0 {
            let message = if result.stderr.trim().is_empty() {
                result.message
            } else {
                result.stderr.trim().to_string()
            };
            return Err(ControlScriptError::function_failed(
                function,
                result.exit_code,
                message,
            ));
        }

        let stdout = result.stdout.trim();
        if stdout.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(stdout).map_err(|e| ControlScriptError::InvalidOutput {
            function: function.to_string(),
            message: e.to_string(),
        })
    }
}
