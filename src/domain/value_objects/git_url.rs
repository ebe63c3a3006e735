use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// scp形式（`git@host:org/repo.git`）の判定用
fn scp_like_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:[^@/\s]+@)?([^:/\s]+):(.+)$").expect("scp-like URL pattern is valid")
    })
}

fn is_separator(ch: char) -> bool {
    ch == '/' || ch == '\\'
}

/// URLの最後のパス要素からリポジトリ名を取り出す
///
/// 末尾の区切り文字、クエリ、フラグメント、`.git` サフィックスを除去する。
/// 名前が得られない場合は `None`。
pub fn extract_repo_name(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    let path = match Url::parse(trimmed) {
        Ok(parsed) if parsed.has_host() || parsed.scheme() == "file" => parsed.path().to_string(),
        _ => match scp_like_pattern().captures(trimmed) {
            // Windowsのドライブレター（C:\...）はscp形式として扱わない
            Some(captures) if captures[1].len() > 1 => captures[2].to_string(),
            _ => trimmed
                .split(|c| c == '?' || c == '#')
                .next()
                .unwrap_or_default()
                .to_string(),
        },
    };

    let segment = path.trim_end_matches(is_separator).rsplit(is_separator).next()?;
    let name = segment.strip_suffix(".git").unwrap_or(segment).trim();

    if name.is_empty() || name == "." || name == ".." {
        return None;
    }

    Some(name.to_string())
}

/// 時刻ベースの一意な名前（名前抽出に失敗した場合の代替）
pub fn fallback_repo_name() -> String {
    format!("repo-{}", chrono::Utc::now().timestamp_millis())
}

/// リポジトリ名を取り出す。失敗時は代替名を返し、決してエラーにしない
pub fn repo_name_or_fallback(url: &str) -> String {
    extract_repo_name(url).unwrap_or_else(|| {
        let name = fallback_repo_name();
        tracing::debug!("Could not derive repository name from '{}', using '{}'", url, name);
        name
    })
}
