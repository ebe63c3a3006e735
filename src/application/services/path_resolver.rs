use crate::domain::value_objects::git_url::repo_name_or_fallback;
use crate::domain::value_objects::ResolvedTarget;
use std::path::{Component, Path, PathBuf};

/// リモートリポジトリのローカル配置先を決めるサービス
///
/// ファイルシステムは読むだけで変更しない。同じ状態・同じ入力なら
/// 常に同じ結果を返す。
#[derive(Debug, Clone)]
pub struct PathResolver {
    default_base: PathBuf,
    working_directory: PathBuf,
}

impl PathResolver {
    /// 相対パスはプロセスのカレントディレクトリ基準で解決する
    pub fn new(default_base: impl Into<PathBuf>) -> Self {
        let working_directory = std::env::current_dir().unwrap_or_else(|e| {
            tracing::warn!("Current directory unavailable ({}), using '.'", e);
            PathBuf::from(".")
        });
        Self::with_working_directory(default_base, working_directory)
    }

    pub fn with_working_directory(
        default_base: impl Into<PathBuf>,
        working_directory: impl Into<PathBuf>,
    ) -> Self {
        let working_directory = normalize(&working_directory.into());
        let default_base = absolutize(&default_base.into(), &working_directory);
        Self {
            default_base,
            working_directory,
        }
    }

    pub fn default_base(&self) -> &Path {
        &self.default_base
    }

    /// URLと任意の配置先ヒントから配置先を決める
    ///
    /// 1. ヒントなし: `<既定ディレクトリ>/<リポジトリ名>`
    /// 2. 既存ディレクトリのヒント: `.git` があればそれ自体、なければ
    ///    コンテナとして `<ヒント>/<リポジトリ名>`
    /// 3. 存在しない（またはディレクトリでない）ヒント: そのまま使う
    pub fn resolve(&self, url: &str, hint: Option<&str>) -> ResolvedTarget {
        let hint = hint.map(str::trim).filter(|hint| !hint.is_empty());

        let (full_path, repo_name, is_existing_repository) = match hint {
            None => {
                let repo_name = repo_name_or_fallback(url);
                (self.default_base.join(&repo_name), repo_name, false)
            }
            Some(hint) => {
                let hint_path = absolutize(Path::new(hint), &self.working_directory);
                if hint_path.is_dir() {
                    if is_repository(&hint_path) {
                        let repo_name = basename_or_fallback(&hint_path, url);
                        (hint_path, repo_name, true)
                    } else {
                        let repo_name = repo_name_or_fallback(url);
                        (hint_path.join(&repo_name), repo_name, false)
                    }
                } else {
                    let repo_name = basename_or_fallback(&hint_path, url);
                    (hint_path, repo_name, false)
                }
            }
        };

        let already_exists = is_repository(&full_path);

        ResolvedTarget {
            full_path,
            repo_name,
            already_exists,
            is_existing_repository,
        }
    }

    /// 既存パスならそのまま、そうでなければ既定ディレクトリ配下の名前として扱う
    pub fn locate(&self, path_or_name: &str) -> PathBuf {
        let candidate = absolutize(Path::new(path_or_name.trim()), &self.working_directory);
        if candidate.exists() {
            candidate
        } else {
            normalize(&self.default_base.join(path_or_name.trim()))
        }
    }
}

fn is_repository(path: &Path) -> bool {
    path.join(".git").exists()
}

fn basename_or_fallback(path: &Path, url: &str) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| repo_name_or_fallback(url))
}

fn absolutize(path: &Path, working_directory: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&working_directory.join(path))
    }
}

/// `.` と `..` を字句的に取り除く（シンボリックリンクは解決しない）
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let ends_with_parent =
                    matches!(normalized.components().next_back(), Some(Component::ParentDir));
                if ends_with_parent || (!normalized.pop() && !normalized.has_root()) {
                    normalized.push(component.as_os_str());
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const URL: &str = "https://example/org/demo.git";

    fn resolver(temp_dir: &TempDir) -> PathResolver {
        PathResolver::with_working_directory(temp_dir.path().join("base"), temp_dir.path())
    }

    #[test]
    fn test_no_hint_uses_default_base() {
        let temp_dir = TempDir::new().unwrap();
        let target = resolver(&temp_dir).resolve(URL, None);

        assert_eq!(target.repo_name, "demo");
        assert_eq!(target.full_path, temp_dir.path().join("base").join("demo"));
        assert!(!target.already_exists);
        assert!(!target.is_existing_repository);
    }

    #[test]
    fn test_blank_hint_is_no_hint() {
        let temp_dir = TempDir::new().unwrap();
        let target = resolver(&temp_dir).resolve(URL, Some("   "));
        assert_eq!(target.full_path, temp_dir.path().join("base").join("demo"));
    }

    #[test]
    fn test_existing_plain_directory_is_container() {
        let temp_dir = TempDir::new().unwrap();
        let plain = temp_dir.path().join("existing").join("plainDir");
        std::fs::create_dir_all(&plain).unwrap();

        let target = resolver(&temp_dir).resolve(URL, plain.to_str());

        assert_eq!(target.full_path, plain.join("demo"));
        assert_eq!(target.repo_name, "demo");
        assert!(!target.is_existing_repository);
    }

    #[test]
    fn test_existing_repository_hint_is_used_directly() {
        let temp_dir = TempDir::new().unwrap();
        let repo = temp_dir.path().join("checkout");
        std::fs::create_dir_all(repo.join(".git")).unwrap();

        let target = resolver(&temp_dir).resolve(URL, repo.to_str());

        assert_eq!(target.full_path, repo);
        assert_eq!(target.repo_name, "checkout");
        assert!(target.is_existing_repository);
        assert!(target.already_exists);
    }

    #[test]
    fn test_missing_hint_is_verbatim_destination() {
        let temp_dir = TempDir::new().unwrap();
        let target = resolver(&temp_dir).resolve(URL, Some("addons/./custom-name"));

        assert_eq!(target.full_path, temp_dir.path().join("addons").join("custom-name"));
        assert_eq!(target.repo_name, "custom-name");
        assert!(!target.already_exists);
    }

    #[test]
    fn test_container_with_existing_clone_is_already_present() {
        let temp_dir = TempDir::new().unwrap();
        let container = temp_dir.path().join("addons");
        std::fs::create_dir_all(container.join("demo").join(".git")).unwrap();

        let target = resolver(&temp_dir).resolve(URL, Some("addons"));

        assert_eq!(target.full_path, container.join("demo"));
        assert!(target.already_exists);
        assert!(!target.is_existing_repository);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("addons")).unwrap();
        let resolver = resolver(&temp_dir);

        for hint in [None, Some("addons"), Some("missing/dir")] {
            assert_eq!(resolver.resolve(URL, hint), resolver.resolve(URL, hint));
        }
    }

    #[test]
    fn test_unusable_url_falls_back_to_generated_name() {
        let temp_dir = TempDir::new().unwrap();
        let target = resolver(&temp_dir).resolve("https://example.com/", None);

        assert!(target.repo_name.starts_with("repo-"));
        assert_eq!(target.parent(), Some(temp_dir.path().join("base").as_path()));
    }

    #[test]
    fn test_locate_prefers_existing_path() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = resolver(&temp_dir);
        let existing = temp_dir.path().join("somewhere");
        std::fs::create_dir_all(&existing).unwrap();

        assert_eq!(resolver.locate(existing.to_str().unwrap()), existing);
        assert_eq!(resolver.locate("somewhere"), existing);
        assert_eq!(
            resolver.locate("demo"),
            temp_dir.path().join("base").join("demo")
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("../../a")), PathBuf::from("../../a"));
    }
}
