pub mod addon_service;
pub mod path_resolver;

pub use addon_service::{AddonService, BatchOutcome, CloneResult, Collaborators, ConfigSource};
pub use path_resolver::PathResolver;
