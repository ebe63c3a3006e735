pub mod repository;

pub use repository::{DiffSummary, GitRepository, GitRepositoryError};
