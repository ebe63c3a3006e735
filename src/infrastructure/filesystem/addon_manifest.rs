use crate::domain::entities::addon_config::DEFAULT_ADDON_MANIFEST;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads the add-on manifest at a repository root
#[derive(Debug, Clone)]
pub struct AddonManifestReader {
    file_name: String,
}

impl Default for AddonManifestReader {
    fn default() -> Self {
        Self::new(DEFAULT_ADDON_MANIFEST)
    }
}

impl AddonManifestReader {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn manifest_path(&self, repository_root: &Path) -> PathBuf {
        repository_root.join(&self.file_name)
    }

    /// Parsed manifest, or `None` when it is absent or not valid JSON
    pub async fn read(&self, repository_root: &Path) -> Option<Value> {
        let path = self.manifest_path(repository_root);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No add-on manifest at {}", path.display());
                return None;
            }
            Err(e) => {
                warn!("Failed to read add-on manifest {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring unparseable add-on manifest {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Manifest re-serialized in canonical form
    pub async fn read_canonical(&self, repository_root: &Path) -> Option<String> {
        let value = self.read(repository_root).await?;
        serde_json::to_string(&value).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_absent_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let reader = AddonManifestReader::default();
        assert_eq!(reader.read_canonical(temp_dir.path()).await, None);
    }

    #[tokio::test]
    async fn test_manifest_is_canonicalized() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(DEFAULT_ADDON_MANIFEST),
            "{\n  \"RepoName\": \"demo\",\n  \"Version\": \"1.0.0\"\n}\n",
        )
        .unwrap();

        let reader = AddonManifestReader::default();
        let canonical = reader.read_canonical(temp_dir.path()).await.unwrap();
        assert_eq!(canonical, r#"{"RepoName":"demo","Version":"1.0.0"}"#);
    }

    #[tokio::test]
    async fn test_unparseable_manifest_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(DEFAULT_ADDON_MANIFEST), "{ not json").unwrap();

        let reader = AddonManifestReader::default();
        assert_eq!(reader.read(temp_dir.path()).await, None);
    }

    #[tokio::test]
    async fn test_custom_file_name() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("addon.json"), "[1,2]").unwrap();

        let reader = AddonManifestReader::new("addon.json");
        assert_eq!(reader.read_canonical(temp_dir.path()).await.as_deref(), Some("[1,2]"));
    }
}
