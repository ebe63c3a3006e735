use super::remote_repository::{SortDirection, SortKey, Visibility};
use crate::domain::value_objects::ExitCodePolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// アドオンマニフェストの既定ファイル名
pub const DEFAULT_ADDON_MANIFEST: &str = "package.winccoa.json";

/// 設定ファイル（oa-addons.yaml）の構造
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct AddonConfig {
    #[serde(default)]
    #[validate(nested)]
    pub repositories: RepositorySettings,

    #[serde(default)]
    #[validate(nested)]
    pub github: GitHubSettings,

    #[serde(default)]
    #[validate(nested)]
    pub control_script: ControlScriptSettings,

    #[serde(default)]
    #[validate(nested)]
    pub installer: InstallerSettings,
}

/// クローン先と同期に関する設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RepositorySettings {
    /// ヒントなしでクローンする際の基準ディレクトリ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_directory: Option<PathBuf>,

    /// リポジトリ直下で探すアドオンマニフェスト
    #[serde(default = "default_addon_manifest")]
    #[validate(length(min = 1))]
    pub manifest_file: String,
}

fn default_addon_manifest() -> String {
    DEFAULT_ADDON_MANIFEST.to_string()
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            base_directory: None,
            manifest_file: default_addon_manifest(),
        }
    }
}

/// リモートのリポジトリ一覧取得に関する設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GitHubSettings {
    #[serde(default = "default_api_url")]
    #[validate(url)]
    pub api_url: String,

    /// `list-repos` で組織名を省略した場合の組織
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    /// そのまま Authorization ヘッダに渡すトークン
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub sort: SortKey,

    #[serde(default)]
    pub direction: SortDirection,

    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: u32,

    #[serde(default = "default_max_pages")]
    #[validate(range(min = 1))]
    pub max_pages: u32,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    10
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            organization: None,
            token: None,
            visibility: Visibility::default(),
            sort: SortKey::default(),
            direction: SortDirection::default(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
        }
    }
}

/// 制御スクリプト実行環境へのアダプタ設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ControlScriptSettings {
    /// スクリプトを実行するインタプリタ
    #[serde(default = "default_interpreter")]
    #[validate(length(min = 1))]
    pub executable: String,

    /// 関数群を定義したスクリプトファイル
    #[serde(default = "default_script")]
    pub script: PathBuf,

    /// インタプリタに渡す追加引数（プロジェクト指定など）
    #[serde(default)]
    pub extra_args: Vec<String>,

    #[serde(default)]
    pub functions: ScriptFunctions,
}

fn default_interpreter() -> String {
    "WCCOActrl".to_string()
}

fn default_script() -> PathBuf {
    PathBuf::from("addonManager.ctl")
}

impl Default for ControlScriptSettings {
    fn default() -> Self {
        Self {
            executable: default_interpreter(),
            script: default_script(),
            extra_args: Vec::new(),
            functions: ScriptFunctions::default(),
        }
    }
}

/// 実行環境側の関数名（スクリプトの構文には依存しない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptFunctions {
    pub register_sub_project: String,
    pub unregister_sub_project: String,
    pub list_sub_projects: String,
    pub attach_manager: String,
    pub project_path: String,
}

impl Default for ScriptFunctions {
    fn default() -> Self {
        Self {
            register_sub_project: "addSubProject".to_string(),
            unregister_sub_project: "removeSubProject".to_string(),
            list_sub_projects: "listSubProjects".to_string(),
            attach_manager: "appendManager".to_string(),
            project_path: "getProjectPath".to_string(),
        }
    }
}

/// 依存パッケージのインストール／ビルド設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InstallerSettings {
    /// 登録前にインストールを行うか
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// インストール対象ディレクトリを示すファイル
    #[serde(default = "default_package_manifest")]
    #[validate(length(min = 1))]
    pub package_manifest: String,

    /// 走査しないディレクトリ（依存キャッシュ等）
    #[serde(default = "default_excluded_directories")]
    pub excluded_directories: Vec<String>,

    #[serde(default = "default_install_command")]
    #[validate(length(min = 1))]
    pub install_command: Vec<String>,

    #[serde(default = "default_build_command")]
    #[validate(length(min = 1))]
    pub build_command: Vec<String>,

    /// この名前のスクリプトが宣言されている場合のみビルドする
    #[serde(default = "default_build_script")]
    pub build_script: String,

    #[serde(default)]
    pub exit_codes: ExitCodePolicy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

fn default_true() -> bool {
    true
}

fn default_package_manifest() -> String {
    "package.json".to_string()
}

fn default_excluded_directories() -> Vec<String> {
    vec!["node_modules".to_string(), ".git".to_string()]
}

fn default_install_command() -> Vec<String> {
    vec!["npm".to_string(), "install".to_string()]
}

fn default_build_command() -> Vec<String> {
    vec!["npm".to_string(), "run".to_string(), "build".to_string()]
}

fn default_build_script() -> String {
    "build".to_string()
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            package_manifest: default_package_manifest(),
            excluded_directories: default_excluded_directories(),
            install_command: default_install_command(),
            build_command: default_build_command(),
            build_script: default_build_script(),
            exit_codes: ExitCodePolicy::default(),
            timeout_seconds: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AddonConfig::default();
        assert_eq!(config.repositories.manifest_file, "package.winccoa.json");
        assert_eq!(config.github.page_size, 100);
        assert_eq!(config.github.max_pages, 10);
        assert_eq!(config.control_script.functions.attach_manager, "appendManager");
        assert!(config.installer.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
repositories:
  base_directory: /opt/addons
github:
  organization: my-org
  page_size: 50
control_script:
  functions:
    attach_manager: addManager
"#;
        let config: AddonConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.repositories.base_directory, Some(PathBuf::from("/opt/addons")));
        assert_eq!(config.github.page_size, 50);
        assert_eq!(config.github.max_pages, 10);
        assert_eq!(config.control_script.functions.attach_manager, "addManager");
        assert_eq!(config.control_script.functions.list_sub_projects, "listSubProjects");
    }

    #[test]
    fn test_page_size_out_of_range_is_rejected() {
        let mut config = AddonConfig::default();
        config.github.page_size = 0;
        assert!(config.validate().is_err());

        config.github.page_size = 101;
        assert!(config.validate().is_err());
    }
}
