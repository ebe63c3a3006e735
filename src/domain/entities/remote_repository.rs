use serde::{Deserialize, Serialize};
use std::fmt;

/// 一覧に含めるリポジトリの種別（GitHub の `type` パラメータ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    All,
    Public,
    Private,
    Forks,
    Sources,
    Member,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::All => "all",
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Forks => "forks",
            Visibility::Sources => "sources",
            Visibility::Member => "member",
        }
    }
}

/// 並び替えキー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Created,
    Updated,
    Pushed,
    #[default]
    FullName,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Created => "created",
            SortKey::Updated => "updated",
            SortKey::Pushed => "pushed",
            SortKey::FullName => "full_name",
        }
    }
}

/// 並び順
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Visibility, SortKey, SortDirection);

/// リモートAPIへ渡す1ページ分の問い合わせ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub visibility: Visibility,
    pub sort: SortKey,
    pub direction: SortDirection,
    pub per_page: u32,
    pub page: u32,
}

/// リモートAPIが返す生のリポジトリ情報（GitHub REST 形式）
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteRepositoryRecord {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub clone_url: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub pushed_at: Option<String>,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
}

/// 正規化済みのリポジトリ概要（読み取り専用、キャッシュしない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRepositorySummary {
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub clone_url: String,
    pub default_branch: String,
    pub visibility: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub pushed_at: Option<String>,
    pub topics: Vec<String>,
}

impl From<RemoteRepositoryRecord> for RemoteRepositorySummary {
    fn from(record: RemoteRepositoryRecord) -> Self {
        let visibility = record.visibility.unwrap_or_else(|| {
            if record.private {
                "private".to_string()
            } else {
                "public".to_string()
            }
        });

        Self {
            full_name: record.full_name.unwrap_or_else(|| record.name.clone()),
            name: record.name,
            description: record.description.unwrap_or_default(),
            clone_url: record.clone_url.unwrap_or_default(),
            default_branch: record.default_branch.unwrap_or_else(|| "main".to_string()),
            visibility,
            created_at: record.created_at,
            updated_at: record.updated_at,
            pushed_at: record.pushed_at,
            topics: record.topics.unwrap_or_default(),
        }
    }
}
