//! Recording stubs for the outbound traits
//!
//! Every stub appends a readable line per call to a shared history so tests
//! can assert on ordering across collaborators.

use async_trait::async_trait;
use oa_addons::domain::entities::remote_repository::PageQuery;
use oa_addons::domain::entities::RemoteRepositoryRecord;
use oa_addons::infrastructure::control_script::{ControlScriptError, ControlScriptRuntime};
use oa_addons::infrastructure::process::{CommandExecutionResult, CommandRunner, CommandSpec};
use oa_addons::infrastructure::remote::{RemoteApiError, RepositoryMetadataApi};
use oa_addons::infrastructure::scm::{CloneOptions, PullSummary, ScmError, VersionControl};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Shared call history
pub type CallHistory = Arc<Mutex<Vec<String>>>;

pub fn new_history() -> CallHistory {
    Arc::new(Mutex::new(Vec::new()))
}

fn record(history: &CallHistory, line: String) {
    history.lock().unwrap().push(line);
}

/// Version control stub that materializes clones as directories with a `.git` marker
pub struct StubVersionControl {
    history: CallHistory,
    manifest: Option<(String, String)>,
    pull_files: Vec<String>,
    clone_error: Option<String>,
}

impl StubVersionControl {
    pub fn new(history: CallHistory) -> Self {
        Self {
            history,
            manifest: None,
            pull_files: Vec::new(),
            clone_error: None,
        }
    }

    /// Write this manifest file into every fresh clone
    pub fn with_manifest(mut self, file_name: &str, content: &str) -> Self {
        self.manifest = Some((file_name.to_string(), content.to_string()));
        self
    }

    /// Files every pull reports as touched
    pub fn with_pull_files(mut self, files: &[&str]) -> Self {
        self.pull_files = files.iter().map(|file| file.to_string()).collect();
        self
    }

    /// Make every clone fail with this stderr
    pub fn with_clone_error(mut self, stderr: &str) -> Self {
        self.clone_error = Some(stderr.to_string());
        self
    }
}

#[async_trait]
impl VersionControl for StubVersionControl {
    async fn clone_repository(
        &self,
        url: &str,
        dest_path: &Path,
        options: &CloneOptions,
    ) -> Result<(), ScmError> {
        record(
            &self.history,
            format!(
                "clone {} -> {} ({})",
                url,
                dest_path.display(),
                options.branch.as_deref().unwrap_or("default")
            ),
        );

        if let Some(stderr) = &self.clone_error {
            return Err(ScmError::command_failed("git clone", 128, stderr.clone()));
        }

        std::fs::create_dir_all(dest_path.join(".git"))?;
        if let Some((file_name, content)) = &self.manifest {
            std::fs::write(dest_path.join(file_name), content)?;
        }
        Ok(())
    }

    async fn pull(&self, repo_path: &Path) -> Result<PullSummary, ScmError> {
        record(&self.history, format!("pull {}", repo_path.display()));
        Ok(PullSummary {
            files: self.pull_files.clone(),
            insertions: self.pull_files.len(),
            deletions: 0,
        })
    }

    fn is_repository(&self, path: &Path) -> bool {
        path.join(".git").exists()
    }
}

/// Control-script runtime stub keeping an in-memory sub-project registry
pub struct StubScriptRuntime {
    history: CallHistory,
    registry: Mutex<Vec<String>>,
    failing_managers: Vec<String>,
    failing_functions: Vec<String>,
    project_path: Option<PathBuf>,
}

impl StubScriptRuntime {
    pub fn new(history: CallHistory) -> Self {
        Self {
            history,
            registry: Mutex::new(Vec::new()),
            failing_managers: Vec::new(),
            failing_functions: Vec::new(),
            project_path: None,
        }
    }

    /// Attaching any of these managers fails
    pub fn failing_managers(mut self, names: &[&str]) -> Self {
        self.failing_managers = names.iter().map(|name| name.to_string()).collect();
        self
    }

    /// Calling any of these functions fails
    pub fn failing_functions(mut self, names: &[&str]) -> Self {
        self.failing_functions = names.iter().map(|name| name.to_string()).collect();
        self
    }

    pub fn with_project_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_path = Some(path.into());
        self
    }

    pub fn registered(&self) -> Vec<String> {
        self.registry.lock().unwrap().clone()
    }
}

#[async_trait]
impl ControlScriptRuntime for StubScriptRuntime {
    async fn run_function(&self, function: &str, args: &[Value]) -> Result<Value, ControlScriptError> {
        let first = args.first().and_then(Value::as_str).unwrap_or_default().to_string();

        match function {
            "appendManager" => {
                let name = args.get(1).and_then(Value::as_str).unwrap_or_default();
                record(&self.history, format!("appendManager {}", name));
                if self.failing_managers.iter().any(|failing| failing == name) {
                    return Err(ControlScriptError::function_failed(
                        function,
                        1,
                        format!("manager {} could not be started", name),
                    ));
                }
                return Ok(Value::Null);
            }
            _ => record(&self.history, format!("{} {}", function, first).trim_end().to_string()),
        }

        if self.failing_functions.iter().any(|failing| failing == function) {
            return Err(ControlScriptError::function_failed(
                function,
                1,
                "sub-project already registered",
            ));
        }

        match function {
            "addSubProject" => {
                self.registry.lock().unwrap().push(first);
                Ok(Value::Null)
            }
            "removeSubProject" => {
                self.registry.lock().unwrap().retain(|path| *path != first);
                Ok(Value::Null)
            }
            "listSubProjects" => Ok(json!(self.registered())),
            "getProjectPath" => Ok(self
                .project_path
                .as_ref()
                .map(|path| json!(path.display().to_string()))
                .unwrap_or(Value::Null)),
            _ => Ok(Value::Null),
        }
    }
}

/// Hosting API stub serving a fixed number of repositories page by page
pub struct StubMetadataApi {
    total: usize,
    pages: Arc<Mutex<Vec<u32>>>,
    status: Option<u16>,
}

impl StubMetadataApi {
    pub fn with_repositories(total: usize) -> Self {
        Self {
            total,
            pages: Arc::new(Mutex::new(Vec::new())),
            status: None,
        }
    }

    pub fn failing_with(status: u16) -> Self {
        Self {
            total: 0,
            pages: Arc::new(Mutex::new(Vec::new())),
            status: Some(status),
        }
    }

    /// Pages requested so far, in request order
    pub fn requested_pages(&self) -> Vec<u32> {
        self.pages.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepositoryMetadataApi for StubMetadataApi {
    async fn list_for_organization(
        &self,
        organization: &str,
        query: &PageQuery,
    ) -> Result<Vec<RemoteRepositoryRecord>, RemoteApiError> {
        self.pages.lock().unwrap().push(query.page);

        if let Some(status) = self.status {
            return Err(RemoteApiError::Status {
                status,
                message: "stubbed failure".to_string(),
            });
        }

        let start = (query.page as usize - 1) * query.per_page as usize;
        let end = (start + query.per_page as usize).min(self.total);
        Ok((start..end.max(start))
            .map(|index| RemoteRepositoryRecord {
                name: format!("repo-{:03}", index),
                full_name: Some(format!("{}/repo-{:03}", organization, index)),
                clone_url: Some(format!("https://example.com/{}/repo-{:03}.git", organization, index)),
                default_branch: Some("main".to_string()),
                ..Default::default()
            })
            .collect())
    }
}

/// Command runner stub that succeeds unless the working directory ends with `failing_dir`
pub struct StubCommandRunner {
    history: CallHistory,
    failing_dir: Option<String>,
}

impl StubCommandRunner {
    pub fn new(history: CallHistory) -> Self {
        Self {
            history,
            failing_dir: None,
        }
    }

    pub fn failing_in(mut self, dir_name: &str) -> Self {
        self.failing_dir = Some(dir_name.to_string());
        self
    }
}

#[async_trait]
impl CommandRunner for StubCommandRunner {
    async fn execute(&self, spec: &CommandSpec) -> CommandExecutionResult {
        let working_directory = spec
            .config
            .working_directory
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();
        let dir_name = Path::new(&working_directory)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        record(&self.history, format!("{} @ {}", spec.command_line(), dir_name));

        let failed = self.failing_dir.as_deref() == Some(dir_name.as_str());
        CommandExecutionResult {
            command: spec.command_line(),
            working_directory,
            exit_code: if failed { 1 } else { 0 },
            message: if failed {
                format!("Command '{}' exited with code 1", spec.command_line())
            } else {
                String::new()
            },
            stdout: String::new(),
            stderr: if failed { "ERR! install failed".to_string() } else { String::new() },
        }
    }
}
