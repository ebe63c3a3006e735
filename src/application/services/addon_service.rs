use crate::application::services::path_resolver::PathResolver;
use crate::application::use_cases::install_dependencies::{DependencyInstaller, InstallOutcome};
use crate::application::use_cases::list_remote_repositories::{ListOptions, RemoteRepositoryLister};
use crate::application::use_cases::register_sub_project::{RegistrationOutcome, SubProjectRegistrar};
use crate::application::use_cases::sync_repository::{RepositorySynchronizer, SyncResult};
use crate::common::error::AddonError;
use crate::common::result::{AddonResult, AddonResultExt, OptionExt};
use crate::domain::entities::{
    AddonConfig, ManagerConfig, RegisteredSubProject, RepositoryReference, SubProjectConfig,
};
use crate::infrastructure::control_script::{ControlScriptRuntime, ProcessScriptRuntime};
use crate::infrastructure::filesystem::AddonManifestReader;
use crate::infrastructure::process::{CommandRunner, ProcessCommandRunner};
use crate::infrastructure::remote::{GitHubClient, RepositoryMetadataApi};
use crate::infrastructure::scm::{GitScm, VersionControl};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 外部システムへのアダプタ一式
#[derive(Clone)]
pub struct Collaborators {
    pub vcs: Arc<dyn VersionControl>,
    pub runtime: Arc<dyn ControlScriptRuntime>,
    pub metadata_api: Arc<dyn RepositoryMetadataApi>,
    pub runner: Arc<dyn CommandRunner>,
}

impl Collaborators {
    /// 設定から実際のアダプタを組み立てる
    pub fn from_config(config: &AddonConfig) -> AddonResult<Self> {
        let runner: Arc<dyn CommandRunner> = Arc::new(ProcessCommandRunner::new());
        let github = GitHubClient::new(&config.github).map_err(|e| {
            AddonError::config_error_with_source("Failed to create GitHub client", None, e)
        })?;

        Ok(Self {
            vcs: Arc::new(GitScm::new().with_runner(runner.clone())),
            runtime: Arc::new(
                ProcessScriptRuntime::new(&config.control_script).with_runner(runner.clone()),
            ),
            metadata_api: Arc::new(github),
            runner,
        })
    }
}

/// `clone` の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneResult {
    pub repository_path: PathBuf,
    pub manifest_content: Option<String>,
    #[serde(skip)]
    pub sync: SyncResult,
}

/// 登録時のサブプロジェクト設定の出どころ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigSource {
    /// ディレクトリ名だけの最小構成
    #[default]
    Placeholder,
    /// リポジトリ直下のアドオンマニフェストから読む
    Manifest,
}

/// 複数パスに対する操作の結果
///
/// 最初のエラーで中断するが、それまでに終わったパスの結果は残す。
#[derive(Debug)]
pub struct BatchOutcome<T> {
    /// 処理を終えたパスの結果（入力順）
    pub completed: Vec<T>,
    /// 中断の原因になったパスとエラー
    pub failure: Option<(PathBuf, AddonError)>,
    /// 中断により手を付けなかったパス
    pub skipped: Vec<PathBuf>,
}

impl<T> BatchOutcome<T> {
    fn new(capacity: usize) -> Self {
        Self {
            completed: Vec::with_capacity(capacity),
            failure: None,
            skipped: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// 途中の結果を捨ててエラーだけを返す
    pub fn into_result(self) -> AddonResult<Vec<T>> {
        match self.failure {
            Some((_, error)) => Err(error),
            None => Ok(self.completed),
        }
    }
}

/// 外部（CLIやRPC層）に公開する操作の窓口
pub struct AddonService {
    config: AddonConfig,
    synchronizer: RepositorySynchronizer,
    lister: RemoteRepositoryLister,
    registrar: SubProjectRegistrar,
    manifest_reader: AddonManifestReader,
}

impl AddonService {
    /// 既定ディレクトリは 設定 → 制御スクリプトのプロジェクトパス → カレントディレクトリ の順で決める
    pub async fn new(config: AddonConfig, collaborators: Collaborators) -> Self {
        let registrar = build_registrar(&config, &collaborators);
        let base_directory = match &config.repositories.base_directory {
            Some(base) => base.clone(),
            None => match registrar.project_path().await.map_err(AddonError::from).to_option_logged() {
                Some(Some(project_path)) => project_path,
                _ => current_directory(),
            },
        };
        debug!("Default base directory: {}", base_directory.display());

        Self::assemble(config, collaborators, registrar, base_directory)
    }

    /// 既定ディレクトリを明示して組み立てる
    pub fn with_base_directory(
        config: AddonConfig,
        collaborators: Collaborators,
        base_directory: impl Into<PathBuf>,
    ) -> Self {
        let registrar = build_registrar(&config, &collaborators);
        Self::assemble(config, collaborators, registrar, base_directory.into())
    }

    fn assemble(
        config: AddonConfig,
        collaborators: Collaborators,
        registrar: SubProjectRegistrar,
        base_directory: PathBuf,
    ) -> Self {
        let manifest_reader = AddonManifestReader::new(config.repositories.manifest_file.clone());
        let synchronizer =
            RepositorySynchronizer::new(PathResolver::new(base_directory), collaborators.vcs)
                .with_manifest_reader(manifest_reader.clone());

        Self {
            lister: RemoteRepositoryLister::new(collaborators.metadata_api),
            synchronizer,
            registrar,
            manifest_reader,
            config,
        }
    }

    pub fn base_directory(&self) -> &Path {
        self.synchronizer.resolver().default_base()
    }

    /// サブプロジェクトを順に登録する（最初のエラーで中断）
    pub async fn register(&self, paths: &[PathBuf], source: ConfigSource) -> BatchOutcome<RegistrationOutcome> {
        let mut batch = BatchOutcome::new(paths.len());
        for (index, path) in paths.iter().enumerate() {
            let path = self.locate(path);
            match self.register_one(&path, source).await {
                Ok(outcome) => batch.completed.push(outcome),
                Err(error) => {
                    warn!("Registration of {} failed: {}", path.display(), error);
                    batch.failure = Some((path, error));
                    batch.skipped = paths[index + 1..].iter().map(|p| self.locate(p)).collect();
                    break;
                }
            }
        }
        batch
    }

    async fn register_one(&self, path: &Path, source: ConfigSource) -> AddonResult<RegistrationOutcome> {
        let config = self.sub_project_config(path, source).await?;
        Ok(self.registrar.register(path, &config).await?)
    }

    /// 登録を順に解除する（最初のエラーで中断）
    pub async fn unregister(&self, paths: &[PathBuf]) -> BatchOutcome<PathBuf> {
        let mut batch = BatchOutcome::new(paths.len());
        for (index, path) in paths.iter().enumerate() {
            let path = self.locate(path);
            match self.registrar.unregister(&path).await {
                Ok(()) => batch.completed.push(path),
                Err(error) => {
                    batch.failure = Some((path, error.into()));
                    batch.skipped = paths[index + 1..].iter().map(|p| self.locate(p)).collect();
                    break;
                }
            }
        }
        batch
    }

    /// 登録済みサブプロジェクトのパス
    pub async fn list_projects(&self) -> AddonResult<Vec<String>> {
        Ok(self
            .list_registered()
            .await?
            .into_iter()
            .map(|project| project.path.display().to_string())
            .collect())
    }

    pub async fn list_registered(&self) -> AddonResult<Vec<RegisteredSubProject>> {
        Ok(self.registrar.list_registered().await?)
    }

    /// 既存の作業コピーを更新し、変更のあったファイル数を返す
    ///
    /// 引数は既存パスか、既定ディレクトリ配下のサブプロジェクト名。
    pub async fn pull(&self, path_or_name: &str) -> AddonResult<usize> {
        let path_or_name = Some(path_or_name.trim())
            .filter(|value| !value.is_empty())
            .ok_or_invalid_input("path", "must not be empty")?;

        let path = self.synchronizer.resolver().locate(path_or_name);
        let result = self.synchronizer.pull_existing(&path).await?;
        info!("Pulled {} ({} file(s) changed)", path.display(), result.files_touched.len());
        Ok(result.files_touched.len())
    }

    /// クローンまたは更新し、作業コピーのパスとマニフェストを返す
    pub async fn clone_repository(&self, reference: &RepositoryReference) -> AddonResult<CloneResult> {
        let sync = self.synchronizer.sync_repository(reference).await?;
        Ok(CloneResult {
            repository_path: sync.path.clone(),
            manifest_content: sync.manifest_content.clone(),
            sync,
        })
    }

    /// 組織のリポジトリ一覧をJSON文字列で返す
    pub async fn list_repos(&self, organization: Option<&str>) -> AddonResult<String> {
        let organization = organization
            .map(str::to_string)
            .or_else(|| self.config.github.organization.clone())
            .ok_or_invalid_input("organization", "not given and not configured")?;

        let options = ListOptions::from(&self.config.github);
        let repositories = self
            .lister
            .list_organization_repositories(&organization, &options)
            .await?;
        Ok(serde_json::to_string(&repositories)?)
    }

    /// 依存インストールのみ行う
    pub async fn install(&self, path: &Path) -> AddonResult<InstallOutcome> {
        Ok(self.registrar.install_dependencies(&self.locate(path)).await?)
    }

    /// マニフェストに定義されたマネージャを接続し直す（名前指定なしなら全部）
    pub async fn attach_managers(&self, path: &Path, names: &[String]) -> AddonResult<RegistrationOutcome> {
        let path = self.locate(path);
        let config = self.sub_project_config(&path, ConfigSource::Manifest).await?;

        let managers: Vec<ManagerConfig> = if names.is_empty() {
            config.managers
        } else {
            names
                .iter()
                .map(|name| {
                    config
                        .managers
                        .iter()
                        .find(|manager| &manager.name == name)
                        .cloned()
                        .ok_or_invalid_input("manager", format!("'{}' is not defined in the manifest", name))
                })
                .collect::<AddonResult<_>>()?
        };

        Ok(self.registrar.attach_managers(&path, &managers).await?)
    }

    async fn sub_project_config(&self, path: &Path, source: ConfigSource) -> AddonResult<SubProjectConfig> {
        match source {
            ConfigSource::Placeholder => Ok(SubProjectConfig::placeholder(path)),
            ConfigSource::Manifest => {
                let manifest = self.manifest_reader.read(path).await.ok_or_else(|| {
                    AddonError::not_found(
                        format!(
                            "No readable {} in {}",
                            self.config.repositories.manifest_file,
                            path.display()
                        ),
                        Some(path.display().to_string()),
                    )
                })?;
                Ok(SubProjectConfig::from_manifest(&manifest, path)?)
            }
        }
    }

    fn locate(&self, path: &Path) -> PathBuf {
        self.synchronizer
            .resolver()
            .locate(&path.display().to_string())
    }
}

fn build_registrar(config: &AddonConfig, collaborators: &Collaborators) -> SubProjectRegistrar {
    SubProjectRegistrar::new(
        collaborators.runtime.clone(),
        config.control_script.functions.clone(),
    )
    .with_installer(DependencyInstaller::new(
        collaborators.runner.clone(),
        config.installer.clone(),
    ))
}

fn current_directory() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
