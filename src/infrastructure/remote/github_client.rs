//! GitHub REST adapter for organization repository listings

use crate::domain::entities::addon_config::GitHubSettings;
use crate::domain::entities::remote_repository::PageQuery;
use crate::domain::entities::RemoteRepositoryRecord;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Remote metadata API errors
#[derive(Debug, Error)]
pub enum RemoteApiError {
    #[error("Remote API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl RemoteApiError {
    /// HTTP status when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// Read-only access to a hosting service's repository metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryMetadataApi: Send + Sync {
    /// One page of an organization's repositories
    async fn list_for_organization(
        &self,
        organization: &str,
        query: &PageQuery,
    ) -> Result<Vec<RemoteRepositoryRecord>, RemoteApiError>;
}

/// GitHub REST API client
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(settings: &GitHubSettings) -> Result<Self, RemoteApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("oa-addons/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: settings.api_url.clone(),
            token: settings.token.clone().filter(|token| !token.trim().is_empty()),
        })
    }

    /// Token passed through verbatim as a bearer credential
    pub fn with_token(mut self, token: Option<String>) -> Self {
        if token.is_some() {
            self.token = token;
        }
        self
    }

    /// `{api}/orgs/{org}/repos?type=..&sort=..&direction=..&per_page=..&page=..`
    pub fn organization_repos_url(
        &self,
        organization: &str,
        query: &PageQuery,
    ) -> Result<Url, RemoteApiError> {
        let mut url =
            Url::parse(&self.api_url).map_err(|e| RemoteApiError::InvalidUrl(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| RemoteApiError::InvalidUrl(self.api_url.clone()))?
            .pop_if_empty()
            .extend(["orgs", organization, "repos"]);

        url.query_pairs_mut()
            .append_pair("type", query.visibility.as_str())
            .append_pair("sort", query.sort.as_str())
            .append_pair("direction", query.direction.as_str())
            .append_pair("per_page", &query.per_page.to_string())
            .append_pair("page", &query.page.to_string());

        Ok(url)
    }
}

#[async_trait]
impl RepositoryMetadataApi for GitHubClient {
    async fn list_for_organization(
        &self,
        organization: &str,
        query: &PageQuery,
    ) -> Result<Vec<RemoteRepositoryRecord>, RemoteApiError> {
        let url = self.organization_repos_url(organization, query)?;
        debug!("Fetching repositories from: {}", url);

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(RemoteApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let records: Vec<RemoteRepositoryRecord> = response.json().await?;
        debug!("Received {} repositories for page {}", records.len(), query.page);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::remote_repository::{SortDirection, SortKey, Visibility};

    fn query(page: u32) -> PageQuery {
        PageQuery {
            visibility: Visibility::Public,
            sort: SortKey::Updated,
            direction: SortDirection::Desc,
            per_page: 50,
            page,
        }
    }

    #[test]
    fn test_organization_repos_url() {
        let client = GitHubClient::new(&GitHubSettings::default()).unwrap();
        let url = client.organization_repos_url("my org", &query(3)).unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.github.com/orgs/my%20org/repos?type=public&sort=updated&direction=desc&per_page=50&page=3"
        );
    }

    #[test]
    fn test_enterprise_api_url_with_path() {
        let settings = GitHubSettings {
            api_url: "https://git.example.com/api/v3/".to_string(),
            ..GitHubSettings::default()
        };
        let client = GitHubClient::new(&settings).unwrap();
        let url = client.organization_repos_url("plant", &query(1)).unwrap();

        assert!(url.as_str().starts_with("https://git.example.com/api/v3/orgs/plant/repos?"));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let settings = GitHubSettings {
            token: Some("  ".to_string()),
            ..GitHubSettings::default()
        };
        let client = GitHubClient::new(&settings).unwrap();
        assert!(client.token.is_none());

        let client = client.with_token(Some("ghp_example".to_string()));
        assert_eq!(client.token.as_deref(), Some("ghp_example"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let settings = GitHubSettings {
            api_url: "http://127.0.0.1:9".to_string(),
            ..GitHubSettings::default()
        };
        let client = GitHubClient::new(&settings).unwrap();

        let error = client.list_for_organization("plant", &query(1)).await.unwrap_err();
        assert!(matches!(error, RemoteApiError::Transport(_)));
        assert_eq!(error.status(), None);
    }
}
