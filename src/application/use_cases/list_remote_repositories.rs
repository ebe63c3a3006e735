use crate::common::error::{AddonError, InvalidInput};
use crate::domain::entities::addon_config::GitHubSettings;
use crate::domain::entities::remote_repository::{PageQuery, SortDirection, SortKey, Visibility};
use crate::domain::entities::RemoteRepositorySummary;
use crate::domain::value_objects::FailureKind;
use crate::infrastructure::remote::{RemoteApiError, RepositoryMetadataApi};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// リポジトリ一覧取得のエラー
#[derive(Debug, Error)]
pub enum ListingError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error("Organization '{organization}' not found")]
    OrganizationNotFound { organization: String },

    #[error("Access to organization '{organization}' denied: {message}")]
    AccessDenied { organization: String, message: String },

    #[error("Listing repositories of '{organization}' failed: {message}")]
    ListingFailed { organization: String, message: String },
}

impl ListingError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidInput(_) => FailureKind::InvalidInput,
            Self::OrganizationNotFound { .. } => FailureKind::NotFound,
            Self::AccessDenied { .. } => FailureKind::AccessDenied,
            Self::ListingFailed { .. } => FailureKind::Unclassified,
        }
    }

    fn from_api(error: RemoteApiError, organization: &str) -> Self {
        let organization = organization.to_string();
        match error.status() {
            Some(404) => Self::OrganizationNotFound { organization },
            Some(401) | Some(403) => Self::AccessDenied {
                organization,
                message: error.to_string(),
            },
            _ => Self::ListingFailed {
                organization,
                message: error.to_string(),
            },
        }
    }
}

impl From<ListingError> for AddonError {
    fn from(error: ListingError) -> Self {
        match error {
            ListingError::InvalidInput(invalid) => AddonError::InvalidInput(invalid),
            ListingError::OrganizationNotFound { ref organization }
            | ListingError::AccessDenied {
                ref organization, ..
            } => {
                let target = Some(organization.clone());
                AddonError::from_kind(error.kind(), error.to_string(), target)
            }
            ListingError::ListingFailed { .. } => AddonError::unclassified(error.to_string()),
        }
    }
}

/// 一覧取得の条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub visibility: Visibility,
    pub sort: SortKey,
    pub direction: SortDirection,
    pub page_size: u32,
    pub max_pages: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            visibility: Visibility::default(),
            sort: SortKey::default(),
            direction: SortDirection::default(),
            page_size: 100,
            max_pages: 10,
        }
    }
}

impl From<&GitHubSettings> for ListOptions {
    fn from(settings: &GitHubSettings) -> Self {
        Self {
            visibility: settings.visibility,
            sort: settings.sort,
            direction: settings.direction,
            page_size: settings.page_size,
            max_pages: settings.max_pages,
        }
    }
}

/// 組織のリポジトリをページ単位で順に取得して平坦な一覧にする
///
/// ページは1から順に1つずつ取得し、件数が `page_size` 未満のページで
/// 打ち切る。全ページが満杯でも `max_pages` を超えて取得しない。
pub struct RemoteRepositoryLister {
    api: Arc<dyn RepositoryMetadataApi>,
}

impl RemoteRepositoryLister {
    pub fn new(api: Arc<dyn RepositoryMetadataApi>) -> Self {
        Self { api }
    }

    pub async fn list_organization_repositories(
        &self,
        organization: &str,
        options: &ListOptions,
    ) -> Result<Vec<RemoteRepositorySummary>, ListingError> {
        let organization = organization.trim();
        if organization.is_empty() {
            return Err(InvalidInput::new("organization", "must not be empty").into());
        }
        if options.page_size == 0 {
            return Err(InvalidInput::new("page_size", "must be at least 1").into());
        }

        let mut repositories = Vec::new();

        for page in 1..=options.max_pages {
            let query = PageQuery {
                visibility: options.visibility,
                sort: options.sort,
                direction: options.direction,
                per_page: options.page_size,
                page,
            };

            let records = self
                .api
                .list_for_organization(organization, &query)
                .await
                .map_err(|e| ListingError::from_api(e, organization))?;

            let count = records.len();
            debug!("Page {} of '{}' returned {} repositories", page, organization, count);
            repositories.extend(records.into_iter().map(RemoteRepositorySummary::from));

            if count < options.page_size as usize {
                break;
            }
        }

        info!("Listed {} repositories of '{}'", repositories.len(), organization);
        Ok(repositories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RemoteRepositoryRecord;
    use crate::infrastructure::remote::MockRepositoryMetadataApi;
    use mockall::Sequence;

    fn records(page: u32, count: usize) -> Vec<RemoteRepositoryRecord> {
        (0..count)
            .map(|i| RemoteRepositoryRecord {
                name: format!("repo-{}-{}", page, i),
                ..Default::default()
            })
            .collect()
    }

    fn options(page_size: u32, max_pages: u32) -> ListOptions {
        ListOptions {
            page_size,
            max_pages,
            ..ListOptions::default()
        }
    }

    #[tokio::test]
    async fn test_stops_at_first_short_page() {
        let mut api = MockRepositoryMetadataApi::new();
        let mut seq = Sequence::new();
        for (page, count) in [(1u32, 100usize), (2, 100), (3, 42)] {
            api.expect_list_for_organization()
                .withf(move |org, query| org == "plant" && query.page == page && query.per_page == 100)
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_, _| Ok(records(page, count)));
        }

        let lister = RemoteRepositoryLister::new(Arc::new(api));
        let repos = lister
            .list_organization_repositories("plant", &ListOptions::default())
            .await
            .unwrap();

        assert_eq!(repos.len(), 242);
        assert_eq!(repos[0].name, "repo-1-0");
        assert_eq!(repos[241].name, "repo-3-41");
    }

    #[tokio::test]
    async fn test_never_exceeds_max_pages() {
        let mut api = MockRepositoryMetadataApi::new();
        api.expect_list_for_organization()
            .times(3)
            .returning(|_, query| Ok(records(query.page, 5)));

        let lister = RemoteRepositoryLister::new(Arc::new(api));
        let repos = lister
            .list_organization_repositories("plant", &options(5, 3))
            .await
            .unwrap();

        assert_eq!(repos.len(), 15);
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let mut api = MockRepositoryMetadataApi::new();
        api.expect_list_for_organization()
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let lister = RemoteRepositoryLister::new(Arc::new(api));
        let repos = lister
            .list_organization_repositories("plant", &ListOptions::default())
            .await
            .unwrap();
        assert!(repos.is_empty());
    }

    #[tokio::test]
    async fn test_empty_organization_is_invalid_input() {
        let mut api = MockRepositoryMetadataApi::new();
        api.expect_list_for_organization().never();

        let lister = RemoteRepositoryLister::new(Arc::new(api));
        let error = lister
            .list_organization_repositories(" ", &ListOptions::default())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), FailureKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_http_status_mapping() {
        for (status, kind) in [
            (404u16, FailureKind::NotFound),
            (401, FailureKind::AccessDenied),
            (403, FailureKind::AccessDenied),
            (500, FailureKind::Unclassified),
        ] {
            let mut api = MockRepositoryMetadataApi::new();
            api.expect_list_for_organization().returning(move |_, _| {
                Err(RemoteApiError::Status {
                    status,
                    message: "nope".to_string(),
                })
            });

            let lister = RemoteRepositoryLister::new(Arc::new(api));
            let error = lister
                .list_organization_repositories("plant", &ListOptions::default())
                .await
                .unwrap_err();
            assert_eq!(error.kind(), kind, "status {}", status);
        }
    }

    #[tokio::test]
    async fn test_transport_error_is_listing_failed() {
        let mut api = MockRepositoryMetadataApi::new();
        api.expect_list_for_organization()
            .returning(|_, _| Err(RemoteApiError::Transport("connection refused".to_string())));

        let lister = RemoteRepositoryLister::new(Arc::new(api));
        let error = lister
            .list_organization_repositories("plant", &ListOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(error, ListingError::ListingFailed { .. }));
        assert!(error.to_string().contains("connection refused"));
    }

    #[test]
    fn test_options_from_settings() {
        let settings = GitHubSettings {
            page_size: 30,
            max_pages: 2,
            ..GitHubSettings::default()
        };
        assert_eq!(ListOptions::from(&settings), options(30, 2));
    }
}
