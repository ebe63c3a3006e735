use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// マネージャの起動モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartMode {
    #[serde(alias = "Always")]
    Always,
    #[serde(alias = "Manual")]
    Manual,
    #[serde(alias = "Once")]
    Once,
    #[serde(other)]
    Unknown,
}

impl Default for StartMode {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for StartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartMode::Always => write!(f, "always"),
            StartMode::Manual => write!(f, "manual"),
            StartMode::Once => write!(f, "once"),
            StartMode::Unknown => write!(f, "unknown"),
        }
    }
}

/// プロジェクトに追加する補助プロセス（マネージャ）の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    #[serde(alias = "Name")]
    pub name: String,

    #[serde(default, alias = "StartMode")]
    pub start_mode: StartMode,

    #[serde(default, alias = "Options")]
    pub options: String,
}

impl ManagerConfig {
    pub fn new(name: impl Into<String>, start_mode: StartMode) -> Self {
        Self {
            name: name.into(),
            start_mode,
            options: String::new(),
        }
    }

    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = options.into();
        self
    }
}

/// サブプロジェクト登録時に呼び出し側が渡す設定
///
/// マニフェストのキー名（`RepoName`, `Managers`, `Dplists` ...）でも
/// デシリアライズできる。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubProjectConfig {
    #[serde(default, alias = "RepoName")]
    pub repo_name: String,

    #[serde(default, alias = "Keywords")]
    pub keywords: Vec<String>,

    #[serde(default, alias = "Subproject")]
    pub subproject: String,

    #[serde(default, alias = "Version")]
    pub version: String,

    #[serde(default, alias = "Description")]
    pub description: String,

    #[serde(default, alias = "OaVersion", alias = "PlatformVersion")]
    pub platform_version: String,

    #[serde(default, alias = "Managers")]
    pub managers: Vec<ManagerConfig>,

    #[serde(default, alias = "Dplists", alias = "DataLists")]
    pub data_lists: Vec<String>,

    #[serde(default, alias = "UpdateScripts")]
    pub update_scripts: Vec<String>,
}

impl SubProjectConfig {
    /// マネージャ等を含まない最小構成（ディレクトリ名のみ）
    pub fn placeholder(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            repo_name: name.clone(),
            subproject: name,
            ..Default::default()
        }
    }

    /// アドオンマニフェストの内容から構成を作る
    ///
    /// 欠けている名前はディレクトリ名で補う。
    pub fn from_manifest(manifest: &serde_json::Value, path: &Path) -> Result<Self, serde_json::Error> {
        let mut config: SubProjectConfig = serde_json::from_value(manifest.clone())?;
        let fallback = Self::placeholder(path);
        if config.repo_name.is_empty() {
            config.repo_name = fallback.repo_name;
        }
        if config.subproject.is_empty() {
            config.subproject = fallback.subproject;
        }
        Ok(config)
    }

    pub fn with_manager(mut self, manager: ManagerConfig) -> Self {
        self.managers.push(manager);
        self
    }
}

/// 実行中プロジェクトに登録済みのサブプロジェクト
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredSubProject {
    pub name: String,
    pub path: PathBuf,
}

impl RegisteredSubProject {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}
