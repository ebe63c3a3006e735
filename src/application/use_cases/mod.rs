pub mod install_dependencies;
pub mod list_remote_repositories;
pub mod register_sub_project;
pub mod sync_repository;

pub use install_dependencies::{DependencyInstaller, InstallError, InstallOutcome, InstallStage, InstallStep};
pub use list_remote_repositories::{ListOptions, ListingError, RemoteRepositoryLister};
pub use register_sub_project::{
    ManagerOutcome, RegistrationError, RegistrationOutcome, RegistrationStatus, SubProjectRegistrar,
};
pub use sync_repository::{RepositorySynchronizer, SyncError, SyncResult};
