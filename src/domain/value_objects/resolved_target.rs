use serde::Serialize;
use std::path::{Path, PathBuf};

/// On-disk destination computed for a remote repository.
///
/// Derived on every synchronization; never persisted. `full_path` is always
/// absolute and lexically normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTarget {
    pub full_path: PathBuf,
    pub repo_name: String,
    /// A working copy is already present at `full_path`
    pub already_exists: bool,
    /// The caller's directory hint itself was a working copy
    pub is_existing_repository: bool,
}

impl ResolvedTarget {
    pub fn parent(&self) -> Option<&Path> {
        self.full_path.parent()
    }
}
