pub mod github_client;

pub use github_client::{GitHubClient, RemoteApiError, RepositoryMetadataApi};

#[cfg(test)]
pub use github_client::MockRepositoryMetadataApi;
