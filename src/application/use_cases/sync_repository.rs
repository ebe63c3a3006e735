use crate::application::services::path_resolver::PathResolver;
use crate::common::error::{AddonError, InvalidInput};
use crate::domain::entities::RepositoryReference;
use crate::domain::value_objects::failure_kind::{classify_message, GIT_FAILURE_PATTERNS};
use crate::domain::value_objects::{FailureKind, ResolvedTarget};
use crate::infrastructure::filesystem::AddonManifestReader;
use crate::infrastructure::scm::{CloneOptions, PullSummary, ScmError, VersionControl};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// リポジトリ同期関連のエラー
///
/// どれも対象のURLまたはパスを含む。
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error("Repository {url} not found or not accessible: {message}")]
    RepositoryNotFound { url: String, message: String },

    #[error("Destination {} conflicts with an existing path: {message}", path.display())]
    DestinationConflict { path: PathBuf, message: String },

    #[error("Authentication failed for {url}: {message}")]
    AuthenticationFailed { url: String, message: String },

    #[error("Cannot fast-forward {}: {message}", path.display())]
    MergeConflict { path: PathBuf, message: String },

    #[error("Synchronization of {target} failed: {message}")]
    SynchronizationFailed { target: String, message: String },
}

impl SyncError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidInput(_) => FailureKind::InvalidInput,
            Self::RepositoryNotFound { .. } => FailureKind::NotFound,
            Self::DestinationConflict { .. } => FailureKind::Conflict,
            Self::AuthenticationFailed { .. } => FailureKind::AuthenticationFailed,
            Self::MergeConflict { .. } => FailureKind::MergeConflict,
            Self::SynchronizationFailed { .. } => FailureKind::Unclassified,
        }
    }

    /// VCSのエラーメッセージを分類して利用者向けのエラーにする
    ///
    /// 分類は stderr で行い、メッセージにはコマンドと終了コードも残す。
    fn from_scm(error: ScmError, url: &str, path: &Path) -> Self {
        let kind = classify_message(&error.diagnostic_text(), GIT_FAILURE_PATTERNS);
        let message = error.to_string();
        match kind {
            FailureKind::NotFound | FailureKind::AccessDenied => Self::RepositoryNotFound {
                url: url.to_string(),
                message,
            },
            FailureKind::Conflict => Self::DestinationConflict {
                path: path.to_path_buf(),
                message,
            },
            FailureKind::AuthenticationFailed => Self::AuthenticationFailed {
                url: url.to_string(),
                message,
            },
            FailureKind::MergeConflict => Self::MergeConflict {
                path: path.to_path_buf(),
                message,
            },
            FailureKind::InvalidInput | FailureKind::Unclassified => Self::SynchronizationFailed {
                target: format!("{} ({})", url, path.display()),
                message,
            },
        }
    }
}

impl From<SyncError> for AddonError {
    fn from(error: SyncError) -> Self {
        match error {
            SyncError::InvalidInput(invalid) => AddonError::InvalidInput(invalid),
            SyncError::RepositoryNotFound { ref url, .. } => {
                let target = Some(url.clone());
                AddonError::from_kind(FailureKind::NotFound, error.to_string(), target)
            }
            SyncError::AuthenticationFailed { ref url, .. } => {
                let target = Some(url.clone());
                AddonError::from_kind(FailureKind::AuthenticationFailed, error.to_string(), target)
            }
            SyncError::DestinationConflict { ref path, .. } => {
                let target = Some(path.display().to_string());
                AddonError::from_kind(FailureKind::Conflict, error.to_string(), target)
            }
            SyncError::MergeConflict { ref path, .. } => {
                let target = Some(path.display().to_string());
                AddonError::from_kind(FailureKind::MergeConflict, error.to_string(), target)
            }
            SyncError::SynchronizationFailed { .. } => AddonError::unclassified(error.to_string()),
        }
    }
}

/// 同期操作の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    /// 作業コピーの絶対パス
    pub path: PathBuf,

    /// 今回新規にクローンしたか
    pub cloned: bool,

    /// 最後のpullで何か変わったか
    pub changed: bool,

    pub insertions: usize,
    pub deletions: usize,
    pub files_touched: Vec<String>,

    /// アドオンマニフェスト（正規化済みJSON）
    pub manifest_content: Option<String>,
}

impl SyncResult {
    fn new(path: PathBuf, cloned: bool, summary: PullSummary, manifest_content: Option<String>) -> Self {
        Self {
            path,
            cloned,
            changed: summary.has_changes(),
            insertions: summary.insertions,
            deletions: summary.deletions,
            files_touched: summary.files,
            manifest_content,
        }
    }
}

/// クローンまたは更新を冪等に行うユースケース
pub struct RepositorySynchronizer {
    resolver: PathResolver,
    vcs: Arc<dyn VersionControl>,
    manifest_reader: AddonManifestReader,
}

impl RepositorySynchronizer {
    pub fn new(resolver: PathResolver, vcs: Arc<dyn VersionControl>) -> Self {
        Self {
            resolver,
            vcs,
            manifest_reader: AddonManifestReader::default(),
        }
    }

    pub fn with_manifest_reader(mut self, manifest_reader: AddonManifestReader) -> Self {
        self.manifest_reader = manifest_reader;
        self
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// 配置先を解決し、なければクローンしてからpull、あればpullのみ行う
    ///
    /// 既存の作業コピーではブランチ指定は無視する（チェックアウト済みのため）。
    pub async fn sync_repository(&self, reference: &RepositoryReference) -> Result<SyncResult, SyncError> {
        reference.check()?;

        let url = reference.url();
        let target = self.resolver.resolve(url, reference.target_hint());
        debug!("Resolved {} to {:?}", url, target);

        let cloned = !target.already_exists;
        if cloned {
            self.clone_into(url, &target, reference.branch_name()).await?;
        } else {
            info!("Updating existing working copy at {}", target.full_path.display());
        }

        // クローン直後もpullして、その間に進んだ上流に追いつく
        let summary = self
            .vcs
            .pull(&target.full_path)
            .await
            .map_err(|e| SyncError::from_scm(e, url, &target.full_path))?;

        let manifest_content = self.manifest_reader.read_canonical(&target.full_path).await;

        let result = SyncResult::new(target.full_path, cloned, summary, manifest_content);
        info!(
            "Synchronized {} ({} file(s) changed)",
            result.path.display(),
            result.files_touched.len()
        );
        Ok(result)
    }

    /// 既存の作業コピーを更新する
    pub async fn pull_existing(&self, path: &Path) -> Result<SyncResult, SyncError> {
        if !self.vcs.is_repository(path) {
            return Err(SyncError::RepositoryNotFound {
                url: path.display().to_string(),
                message: "no working copy at this path".to_string(),
            });
        }

        let origin = path.display().to_string();
        let summary = self
            .vcs
            .pull(path)
            .await
            .map_err(|e| SyncError::from_scm(e, &origin, path))?;
        let manifest_content = self.manifest_reader.read_canonical(path).await;

        Ok(SyncResult::new(path.to_path_buf(), false, summary, manifest_content))
    }

    async fn clone_into(
        &self,
        url: &str,
        target: &ResolvedTarget,
        branch: Option<&str>,
    ) -> Result<(), SyncError> {
        let path = &target.full_path;

        if path.is_file() {
            return Err(SyncError::DestinationConflict {
                path: path.clone(),
                message: "a file already exists at the destination".to_string(),
            });
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::SynchronizationFailed {
                    target: parent.display().to_string(),
                    message: format!("failed to create parent directory: {}", e),
                })?;
        }

        info!("Cloning {} into {}", url, path.display());
        let options = CloneOptions::with_branch(branch.map(String::from));
        self.vcs
            .clone_repository(url, path, &options)
            .await
            .map_err(|e| SyncError::from_scm(e, url, path))
    }
}
