/// Infrastructure layer modules
///
/// Concrete adapters for external systems:
/// - Version control (git CLI for network operations, libgit2 for history)
/// - Process execution
/// - Control-script runtime
/// - Remote repository metadata (GitHub REST)
/// - File system (configuration, add-on manifest)
pub mod control_script;
pub mod filesystem;
pub mod git;
pub mod process;
pub mod remote;
pub mod scm;

// Re-export commonly used types
pub use control_script::{ControlScriptRuntime, ProcessScriptRuntime};
pub use filesystem::{AddonManifestReader, ConfigStore};
pub use process::{CommandRunner, ProcessCommandRunner};
pub use remote::{GitHubClient, RepositoryMetadataApi};
pub use scm::{GitScm, VersionControl};
