/// Application layer modules
///
/// Use cases orchestrate the domain through infrastructure traits;
/// services hold the path rules and the facade used by the CLI.
pub mod services;
pub mod use_cases;

pub use services::{AddonService, BatchOutcome, Collaborators, ConfigSource, PathResolver};
