use crate::common::error::AddonError;
use crate::domain::entities::addon_config::InstallerSettings;
use crate::domain::value_objects::ExitClassification;
use crate::infrastructure::process::{
    CommandExecutionResult, CommandExecutorError, CommandRunner, CommandSpec, ExecutionConfig,
};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// 依存パッケージのインストール関連のエラー
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Sub-project directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("Invalid {stage} command: {source}")]
    InvalidCommand {
        stage: InstallStage,
        #[source]
        source: CommandExecutorError,
    },

    #[error("Scanning {} for package manifests failed: {message}", path.display())]
    ScanFailed { path: PathBuf, message: String },
}

impl From<InstallError> for AddonError {
    fn from(error: InstallError) -> Self {
        match &error {
            InstallError::DirectoryNotFound { path } => {
                AddonError::not_found(error.to_string(), Some(path.display().to_string()))
            }
            InstallError::InvalidCommand { .. } => AddonError::config_error(error.to_string(), None),
            InstallError::ScanFailed { .. } => AddonError::unclassified(error.to_string()),
        }
    }
}

/// インストール処理の段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallStage {
    Install,
    Build,
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallStage::Install => write!(f, "install"),
            InstallStage::Build => write!(f, "build"),
        }
    }
}

/// 1ディレクトリ・1段階分の実行結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallStep {
    pub directory: PathBuf,
    pub stage: InstallStage,
    pub classification: ExitClassification,
    pub result: CommandExecutionResult,
}

/// 依存インストール全体の結果（走査順）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallOutcome {
    pub steps: Vec<InstallStep>,
}

impl InstallOutcome {
    pub fn has_errors(&self) -> bool {
        self.steps.iter().any(|step| step.classification.is_error())
    }

    pub fn errors(&self) -> impl Iterator<Item = &InstallStep> {
        self.steps.iter().filter(|step| step.classification.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &InstallStep> {
        self.steps
            .iter()
            .filter(|step| step.classification == ExitClassification::Warning)
    }

    pub fn directories(&self) -> Vec<&Path> {
        let mut directories: Vec<&Path> = Vec::new();
        for step in &self.steps {
            if directories.last() != Some(&step.directory.as_path()) {
                directories.push(step.directory.as_path());
            }
        }
        directories
    }
}

/// サブプロジェクト配下のパッケージマニフェストを探してインストール／ビルドする
///
/// ディレクトリは1つずつ順に処理し、あるディレクトリの失敗で他を止めない。
pub struct DependencyInstaller {
    runner: Arc<dyn CommandRunner>,
    settings: InstallerSettings,
}

impl DependencyInstaller {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: InstallerSettings) -> Self {
        Self { runner, settings }
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// パッケージマニフェストを含むディレクトリ（深さ優先、名前順）
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>, InstallError> {
        scan_package_directories(
            root,
            &self.settings.package_manifest,
            &self.settings.excluded_directories,
        )
    }

    /// ブロッキングスレッド上で [`Self::discover`] を行う
    async fn discover_off_thread(&self, root: &Path) -> Result<Vec<PathBuf>, InstallError> {
        let root = root.to_path_buf();
        let package_manifest = self.settings.package_manifest.clone();
        let excluded = self.settings.excluded_directories.clone();
        let path = root.clone();

        tokio::task::spawn_blocking(move || scan_package_directories(&root, &package_manifest, &excluded))
            .await
            .map_err(|e| InstallError::ScanFailed {
                path,
                message: e.to_string(),
            })?
    }

    /// 見つかった各ディレクトリでインストール、ビルドスクリプトがあればビルド
    pub async fn install(&self, root: &Path) -> Result<InstallOutcome, InstallError> {
        let install_command = CommandSpec::from_argv(&self.settings.install_command)
            .map_err(|source| InstallError::InvalidCommand {
                stage: InstallStage::Install,
                source,
            })?;
        let build_command = CommandSpec::from_argv(&self.settings.build_command).map_err(|source| {
            InstallError::InvalidCommand {
                stage: InstallStage::Build,
                source,
            }
        })?;

        let mut outcome = InstallOutcome::default();

        for directory in self.discover_off_thread(root).await? {
            info!("Installing dependencies in {}", directory.display());
            let install = self
                .run_step(&install_command, &directory, InstallStage::Install)
                .await;
            let install_failed = install.classification.is_error();
            outcome.steps.push(install);

            if install_failed {
                continue;
            }

            if self.declares_build_script(&directory).await {
                let build = self
                    .run_step(&build_command, &directory, InstallStage::Build)
                    .await;
                outcome.steps.push(build);
            }
        }

        Ok(outcome)
    }

    async fn run_step(&self, command: &CommandSpec, directory: &Path, stage: InstallStage) -> InstallStep {
        let spec = command.clone().with_config(
            ExecutionConfig::new()
                .with_working_directory(directory)
                .with_timeout(self.settings.timeout_seconds),
        );

        let result = self.runner.execute(&spec).await;
        let classification = result.classify(&self.settings.exit_codes);

        match classification {
            ExitClassification::Success => debug!("{} succeeded in {}", stage, directory.display()),
            ExitClassification::Warning => warn!("{} finished with warnings: {}", stage, result.diagnostic()),
            ExitClassification::Error => warn!("{} failed: {}", stage, result.diagnostic()),
        }

        InstallStep {
            directory: directory.to_path_buf(),
            stage,
            classification,
            result,
        }
    }

    async fn declares_build_script(&self, directory: &Path) -> bool {
        let manifest_path = directory.join(&self.settings.package_manifest);
        let content = match tokio::fs::read_to_string(&manifest_path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {}", manifest_path.display(), e);
                return false;
            }
        };

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(manifest) => manifest
                .get("scripts")
                .and_then(|scripts| scripts.get(&self.settings.build_script))
                .is_some(),
            Err(e) => {
                warn!("Ignoring unparseable {}: {}", manifest_path.display(), e);
                false
            }
        }
    }
}

fn scan_package_directories(
    root: &Path,
    package_manifest: &str,
    excluded: &[String],
) -> Result<Vec<PathBuf>, InstallError> {
    if !root.is_dir() {
        return Err(InstallError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut directories = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry, excluded));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if entry.file_type().is_dir() && entry.path().join(package_manifest).is_file() {
            directories.push(entry.into_path());
        }
    }

    debug!("Found {} package manifest(s) under {}", directories.len(), root.display());
    Ok(directories)
}

fn is_excluded(entry: &DirEntry, excluded: &[String]) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && excluded
            .iter()
            .any(|name| entry.file_name() == name.as_str())
}
