use git2::{ErrorCode, Oid, Repository as Git2Repository};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Git repository inspection errors
#[derive(Debug, Error)]
pub enum GitRepositoryError {
    #[error("Repository not found at path: {0}")]
    RepositoryNotFound(String),

    #[error("Git operation failed: {0}")]
    GitOperationFailed(String),

    #[error("Git2 error: {0}")]
    Git2Error(#[from] git2::Error),
}

/// Line and file statistics between two commits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub files: Vec<String>,
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffSummary {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.insertions + self.deletions == 0
    }
}

/// Read-only view over a local repository, used to measure what a pull changed
pub struct GitRepository {
    repo: Git2Repository,
    path: PathBuf,
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("path", &self.path)
            .field("repo", &"<git2::Repository>")
            .finish()
    }
}

impl GitRepository {
    /// Open an existing Git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GitRepositoryError> {
        let path_buf = path.as_ref().to_path_buf();

        if !path_buf.exists() {
            return Err(GitRepositoryError::RepositoryNotFound(
                path_buf.display().to_string(),
            ));
        }

        let repo = Git2Repository::open(&path_buf)
            .map_err(|e| GitRepositoryError::GitOperationFailed(e.to_string()))?;

        Ok(Self {
            repo,
            path: path_buf,
        })
    }

    /// Commit HEAD points at; `None` for a freshly initialized repository
    pub fn head_commit(&self) -> Result<Option<Oid>, GitRepositoryError> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?.id())),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Compare the trees of two commits; a missing `from` compares against the empty tree
    pub fn diff_summary(&self, from: Option<Oid>, to: Oid) -> Result<DiffSummary, GitRepositoryError> {
        if from == Some(to) {
            return Ok(DiffSummary::default());
        }

        let old_tree = match from {
            Some(oid) => Some(self.repo.find_commit(oid)?.tree()?),
            None => None,
        };
        let new_tree = self.repo.find_commit(to)?.tree()?;

        let diff = self
            .repo
            .diff_tree_to_tree(old_tree.as_ref(), Some(&new_tree), None)?;
        let stats = diff.stats()?;

        let files = diff
            .deltas()
            .filter_map(|delta| {
                delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .map(|p| p.to_string_lossy().to_string())
            })
            .collect();

        Ok(DiffSummary {
            files,
            insertions: stats.insertions(),
            deletions: stats.deletions(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use git2::{Oid, Repository, Signature};
    use std::path::Path;

    pub fn commit_file(repo: &Repository, name: &str, content: &str) -> Oid {
        let workdir = repo.workdir().unwrap();
        std::fs::write(workdir.join(name), content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let signature = Signature::now("Test User", "test@example.com").unwrap();
        let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        repo.commit(Some("HEAD"), &signature, &signature, "update", &tree, &parents)
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::commit_file;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_repository_open_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let result = GitRepository::open(temp_dir.path().join("nonexistent"));
        assert!(matches!(result.unwrap_err(), GitRepositoryError::RepositoryNotFound(_)));
    }

    #[test]
    fn test_head_commit_of_empty_repository() {
        let temp_dir = TempDir::new().unwrap();
        Git2Repository::init(temp_dir.path()).unwrap();

        let repo = GitRepository::open(temp_dir.path()).unwrap();
        assert_eq!(repo.head_commit().unwrap(), None);
    }

    #[test]
    fn test_diff_summary_between_commits() {
        let temp_dir = TempDir::new().unwrap();
        let raw = Git2Repository::init(temp_dir.path()).unwrap();
        let first = commit_file(&raw, "a.txt", "one\ntwo\n");
        let second = commit_file(&raw, "a.txt", "one\nthree\n");
        let third = commit_file(&raw, "b.txt", "new\n");

        let repo = GitRepository::open(temp_dir.path()).unwrap();
        assert_eq!(repo.head_commit().unwrap(), Some(third));

        let summary = repo.diff_summary(Some(first), second).unwrap();
        assert_eq!(summary.files, vec!["a.txt".to_string()]);
        assert_eq!(summary.insertions, 1);
        assert_eq!(summary.deletions, 1);

        let summary = repo.diff_summary(Some(first), third).unwrap();
        assert_eq!(summary.files.len(), 2);
    }

    #[test]
    fn test_diff_summary_same_commit_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let raw = Git2Repository::init(temp_dir.path()).unwrap();
        let only = commit_file(&raw, "a.txt", "x\n");

        let repo = GitRepository::open(temp_dir.path()).unwrap();
        assert!(repo.diff_summary(Some(only), only).unwrap().is_empty());
    }

    #[test]
    fn test_diff_summary_from_empty_tree() {
        let temp_dir = TempDir::new().unwrap();
        let raw = Git2Repository::init(temp_dir.path()).unwrap();
        let only = commit_file(&raw, "a.txt", "x\ny\n");

        let repo = GitRepository::open(temp_dir.path()).unwrap();
        let summary = repo.diff_summary(None, only).unwrap();
        assert_eq!(summary.insertions, 2);
        assert_eq!(summary.files, vec!["a.txt".to_string()]);
    }
}
