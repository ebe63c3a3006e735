pub mod addon_config;
pub mod remote_repository;
pub mod repository_reference;
pub mod sub_project;

pub use addon_config::AddonConfig;
pub use remote_repository::{RemoteRepositoryRecord, RemoteRepositorySummary};
pub use repository_reference::RepositoryReference;
pub use sub_project::{ManagerConfig, RegisteredSubProject, StartMode, SubProjectConfig};
