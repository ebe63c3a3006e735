use super::install_dependencies::{DependencyInstaller, InstallError, InstallOutcome};
use crate::common::error::{AddonError, InvalidInput};
use crate::domain::entities::addon_config::ScriptFunctions;
use crate::domain::entities::{ManagerConfig, RegisteredSubProject, StartMode, SubProjectConfig};
use crate::domain::value_objects::FailureKind;
use crate::infrastructure::control_script::{ControlScriptError, ControlScriptRuntime};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// サブプロジェクト登録関連のエラー
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error("Sub-project directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error("Dependency installation failed in {} ({failures} failing step(s)): {diagnostic}", path.display())]
    DependencyInstallFailed {
        path: PathBuf,
        failures: usize,
        diagnostic: String,
    },

    #[error("Failed to {operation} {}: {source}", path.display())]
    ScriptFailed {
        operation: String,
        path: PathBuf,
        #[source]
        source: ControlScriptError,
    },

    #[error("Unexpected response from '{function}': {message}")]
    InvalidResponse { function: String, message: String },
}

impl RegistrationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidInput(_) => FailureKind::InvalidInput,
            Self::DirectoryNotFound { .. } => FailureKind::NotFound,
            Self::Install(InstallError::DirectoryNotFound { .. }) => FailureKind::NotFound,
            Self::Install(InstallError::InvalidCommand { .. }) => FailureKind::InvalidInput,
            Self::Install(InstallError::ScanFailed { .. }) => FailureKind::Unclassified,
            Self::ScriptFailed { source, .. } => source.kind(),
            Self::DependencyInstallFailed { .. } | Self::InvalidResponse { .. } => {
                FailureKind::Unclassified
            }
        }
    }

    fn script_failed(operation: &str, path: &Path, source: ControlScriptError) -> Self {
        Self::ScriptFailed {
            operation: operation.to_string(),
            path: path.to_path_buf(),
            source,
        }
    }

    fn target(&self) -> Option<String> {
        match self {
            Self::DirectoryNotFound { path }
            | Self::DependencyInstallFailed { path, .. }
            | Self::ScriptFailed { path, .. } => Some(path.display().to_string()),
            _ => None,
        }
    }
}

impl From<RegistrationError> for AddonError {
    fn from(error: RegistrationError) -> Self {
        match error {
            RegistrationError::InvalidInput(invalid) => AddonError::InvalidInput(invalid),
            other => {
                let target = other.target();
                AddonError::from_kind(other.kind(), other.to_string(), target)
            }
        }
    }
}

/// マネージャ1件分の接続結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerOutcome {
    pub name: String,
    pub start_mode: StartMode,
    pub attached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
}

impl ManagerOutcome {
    fn attached(manager: &ManagerConfig) -> Self {
        Self {
            name: manager.name.clone(),
            start_mode: manager.start_mode,
            attached: true,
            error: None,
            kind: None,
        }
    }

    fn failed(manager: &ManagerConfig, error: &ControlScriptError) -> Self {
        Self {
            name: manager.name.clone(),
            start_mode: manager.start_mode,
            attached: false,
            error: Some(error.to_string()),
            kind: Some(error.kind()),
        }
    }
}

/// 登録全体の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Complete,
    /// 登録は済んだが一部のマネージャが接続できていない
    Partial,
}

impl RegistrationStatus {
    fn from_managers(managers: &[ManagerOutcome]) -> Self {
        if managers.iter().all(|manager| manager.attached) {
            Self::Complete
        } else {
            Self::Partial
        }
    }
}

/// 1パス分の登録結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOutcome {
    pub path: PathBuf,
    pub install: InstallOutcome,
    pub registered: bool,
    pub managers: Vec<ManagerOutcome>,
    pub status: RegistrationStatus,
}

impl RegistrationOutcome {
    fn new(path: PathBuf, install: InstallOutcome, registered: bool, managers: Vec<ManagerOutcome>) -> Self {
        let status = RegistrationStatus::from_managers(&managers);
        Self {
            path,
            install,
            registered,
            managers,
            status,
        }
    }

    /// 再試行が必要なマネージャ名（設定順）
    pub fn failed_managers(&self) -> Vec<&str> {
        self.managers
            .iter()
            .filter(|manager| !manager.attached)
            .map(|manager| manager.name.as_str())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.status == RegistrationStatus::Complete
    }
}

/// サブプロジェクトの登録・解除・一覧とマネージャ接続を調整する
///
/// 実行中プロジェクトの変更はすべて制御スクリプト側に委ねる。
/// トランザクションではないため、一部のマネージャだけ失敗した状態も
/// 正常な終了状態として結果に残る。
pub struct SubProjectRegistrar {
    runtime: Arc<dyn ControlScriptRuntime>,
    functions: ScriptFunctions,
    installer: Option<DependencyInstaller>,
}

impl SubProjectRegistrar {
    pub fn new(runtime: Arc<dyn ControlScriptRuntime>, functions: ScriptFunctions) -> Self {
        Self {
            runtime,
            functions,
            installer: None,
        }
    }

    /// 登録前に依存インストールを行う（無効設定なら何もしない）
    pub fn with_installer(mut self, installer: DependencyInstaller) -> Self {
        self.installer = installer.is_enabled().then_some(installer);
        self
    }

    /// 依存インストール、登録、マネージャ接続の順に行う
    ///
    /// インストールで Error 判定が出た場合と登録自体が失敗した場合は中断する。
    /// マネージャは設定順に1つずつ接続し、失敗しても残りを続ける。
    pub async fn register(
        &self,
        path: &Path,
        config: &SubProjectConfig,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        ensure_directory(path)?;

        let install = self.install_dependencies(path).await?;
        if install.has_errors() {
            let failures: Vec<_> = install.errors().collect();
            let diagnostic = failures
                .first()
                .map(|step| format!("{}: {}", step.stage, step.result.diagnostic()))
                .unwrap_or_default();
            return Err(RegistrationError::DependencyInstallFailed {
                path: path.to_path_buf(),
                failures: failures.len(),
                diagnostic,
            });
        }

        let config_value = serde_json::to_value(config).map_err(|e| {
            RegistrationError::InvalidInput(InvalidInput::new("config", e.to_string()))
        })?;
        self.runtime
            .run_function(
                &self.functions.register_sub_project,
                &[json!(path_arg(path)), config_value],
            )
            .await
            .map_err(|e| RegistrationError::script_failed("register sub-project", path, e))?;
        info!("Registered sub-project {}", path.display());

        let managers = self.attach_each(path, &config.managers).await;
        let outcome = RegistrationOutcome::new(path.to_path_buf(), install, true, managers);

        if !outcome.is_complete() {
            warn!(
                "Sub-project {} registered with failed managers: {}",
                path.display(),
                outcome.failed_managers().join(", ")
            );
        }
        Ok(outcome)
    }

    /// 失敗したマネージャだけを再接続する
    pub async fn attach_managers(
        &self,
        path: &Path,
        managers: &[ManagerConfig],
    ) -> Result<RegistrationOutcome, RegistrationError> {
        ensure_directory(path)?;
        let managers = self.attach_each(path, managers).await;
        Ok(RegistrationOutcome::new(
            path.to_path_buf(),
            InstallOutcome::default(),
            false,
            managers,
        ))
    }

    /// 依存インストールのみ行う
    pub async fn install_dependencies(&self, path: &Path) -> Result<InstallOutcome, RegistrationError> {
        match &self.installer {
            Some(installer) => Ok(installer.install(path).await?),
            None => Ok(InstallOutcome::default()),
        }
    }

    /// サブプロジェクトの登録を外す（接続済みマネージャには触れない）
    pub async fn unregister(&self, path: &Path) -> Result<(), RegistrationError> {
        if path.as_os_str().is_empty() {
            return Err(InvalidInput::new("path", "must not be empty").into());
        }

        self.runtime
            .run_function(&self.functions.unregister_sub_project, &[json!(path_arg(path))])
            .await
            .map_err(|e| RegistrationError::script_failed("unregister sub-project", path, e))?;
        info!("Unregistered sub-project {}", path.display());
        Ok(())
    }

    /// 実行中プロジェクトに登録済みのサブプロジェクト
    pub async fn list_registered(&self) -> Result<Vec<RegisteredSubProject>, RegistrationError> {
        let function = &self.functions.list_sub_projects;
        let response = self
            .runtime
            .run_function(function, &[])
            .await
            .map_err(|e| RegistrationError::script_failed("list sub-projects", Path::new(""), e))?;

        let entries = match response {
            Value::Null => return Ok(Vec::new()),
            Value::Array(entries) => entries,
            other => {
                return Err(RegistrationError::InvalidResponse {
                    function: function.clone(),
                    message: format!("expected a list, got {}", other),
                })
            }
        };

        entries
            .into_iter()
            .map(|entry| parse_registered(entry, function))
            .collect()
    }

    /// 制御スクリプト側が知っているプロジェクトのパス
    pub async fn project_path(&self) -> Result<Option<PathBuf>, RegistrationError> {
        let function = &self.functions.project_path;
        let response = self
            .runtime
            .run_function(function, &[])
            .await
            .map_err(|e| RegistrationError::script_failed("resolve project path", Path::new(""), e))?;

        Ok(response
            .as_str()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from))
    }

    async fn attach_each(&self, path: &Path, managers: &[ManagerConfig]) -> Vec<ManagerOutcome> {
        let mut outcomes = Vec::with_capacity(managers.len());

        // 順序に意味があるので並列にしない
        for manager in managers {
            let args = [
                json!(path_arg(path)),
                json!(manager.name),
                json!(manager.start_mode.to_string()),
                json!(manager.options),
            ];

            match self
                .runtime
                .run_function(&self.functions.attach_manager, &args)
                .await
            {
                Ok(_) => {
                    info!("Attached manager '{}' ({})", manager.name, manager.start_mode);
                    outcomes.push(ManagerOutcome::attached(manager));
                }
                Err(e) => {
                    warn!("Failed to attach manager '{}': {}", manager.name, e);
                    outcomes.push(ManagerOutcome::failed(manager, &e));
                }
            }
        }

        outcomes
    }
}

fn ensure_directory(path: &Path) -> Result<(), RegistrationError> {
    if path.as_os_str().is_empty() {
        return Err(InvalidInput::new("path", "must not be empty").into());
    }
    if !path.is_dir() {
        return Err(RegistrationError::DirectoryNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

fn parse_registered(entry: Value, function: &str) -> Result<RegisteredSubProject, RegistrationError> {
    match entry {
        Value::String(path) => Ok(RegisteredSubProject::from_path(path)),
        Value::Object(ref fields) => {
            let path = fields.get("path").and_then(Value::as_str);
            let name = fields.get("name").and_then(Value::as_str);
            match (name, path) {
                (Some(name), Some(path)) => Ok(RegisteredSubProject {
                    name: name.to_string(),
                    path: PathBuf::from(path),
                }),
                (None, Some(path)) => Ok(RegisteredSubProject::from_path(path)),
                _ => Err(RegistrationError::InvalidResponse {
                    function: function.to_string(),
                    message: format!("entry without a path: {}", entry),
                }),
            }
        }
        other => Err(RegistrationError::InvalidResponse {
            function: function.to_string(),
            message: format!("unsupported entry: {}", other),
        }),
    }
}
