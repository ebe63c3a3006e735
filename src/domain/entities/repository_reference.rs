use crate::common::error::InvalidInput;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 同期対象のリモートリポジトリ
///
/// 不変の入力値。`url` は空であってはならない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryReference {
    /// リモートURL
    #[validate(length(min = 1, message = "repository URL must not be empty"))]
    pub url: String,

    /// 出力先ディレクトリのヒント（コンテナまたはリポジトリそのもの）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_directory: Option<String>,

    /// クローン時に限定するブランチ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl RepositoryReference {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            target_directory: None,
            branch: None,
        }
    }

    pub fn with_target_directory(mut self, target_directory: impl Into<String>) -> Self {
        self.target_directory = Some(target_directory.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// I/Oの前に入力を検証する
    pub fn check(&self) -> Result<(), InvalidInput> {
        self.validate()?;
        if self.url.trim().is_empty() {
            return Err(InvalidInput::new("url", "repository URL must not be blank"));
        }
        Ok(())
    }

    /// 空文字列のヒントは指定なしとして扱う
    pub fn target_hint(&self) -> Option<&str> {
        self.target_directory
            .as_deref()
            .map(str::trim)
            .filter(|hint| !hint.is_empty())
    }

    pub fn branch_name(&self) -> Option<&str> {
        self.branch
            .as_deref()
            .map(str::trim)
            .filter(|branch| !branch.is_empty())
    }

    pub fn url(&self) -> &str {
        self.url.trim()
    }
}
