/// Version control infrastructure
///
/// Git is the only supported system; the trait keeps the synchronizer
/// testable without a network.
pub mod git_scm;
pub mod scm_interface;

pub use git_scm::GitScm;
pub use scm_interface::{CloneOptions, PullSummary, ScmError, VersionControl};

#[cfg(test)]
pub use scm_interface::MockVersionControl;
