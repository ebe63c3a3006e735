pub mod exit_classification;
pub mod failure_kind;
pub mod git_url;
pub mod resolved_target;

pub use exit_classification::{classify, ExitClassification, ExitCodePolicy};
pub use failure_kind::{classify_message, FailureKind, FailurePattern};
pub use resolved_target::ResolvedTarget;
