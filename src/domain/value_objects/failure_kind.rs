use serde::{Deserialize, Serialize};
use std::fmt;

/// 失敗の意味的な分類
///
/// 下位コラボレータ（git、制御スクリプト、リモートAPI）が返すのは
/// 自由形式のメッセージだけなので、呼び出し側が扱える種別に写像する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 必須項目が空または欠落（I/O前に検出）
    InvalidInput,
    /// リモートリソースまたはローカルパスが存在しない
    NotFound,
    /// 出力先が互換性のない状態で既に存在する
    Conflict,
    /// 認証に失敗した
    AuthenticationFailed,
    /// fast-forward できない
    MergeConflict,
    /// アクセスが拒否された
    AccessDenied,
    /// どのパターンにも一致しない（元のメッセージを保持）
    Unclassified,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::InvalidInput => "invalid input",
            FailureKind::NotFound => "not found",
            FailureKind::Conflict => "conflict",
            FailureKind::AuthenticationFailed => "authentication failed",
            FailureKind::MergeConflict => "merge conflict",
            FailureKind::AccessDenied => "access denied",
            FailureKind::Unclassified => "unclassified",
        };
        write!(f, "{}", label)
    }
}

/// メッセージ断片から種別への対応（大文字小文字を区別しない）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailurePattern {
    pub needle: &'static str,
    pub kind: FailureKind,
}

impl FailurePattern {
    pub const fn new(needle: &'static str, kind: FailureKind) -> Self {
        Self { needle, kind }
    }
}

/// git の失敗メッセージ用パターン表
///
/// 先に一致したものが優先される。認証系は "not found" 系より前に置くこと
/// （git は認証失敗時にも "repository not found" を併記することがある）。
pub const GIT_FAILURE_PATTERNS: &[FailurePattern] = &[
    FailurePattern::new("authentication failed", FailureKind::AuthenticationFailed),
    FailurePattern::new("could not read username", FailureKind::AuthenticationFailed),
    FailurePattern::new("could not read password", FailureKind::AuthenticationFailed),
    FailurePattern::new("permission denied (publickey", FailureKind::AuthenticationFailed),
    FailurePattern::new("invalid username or password", FailureKind::AuthenticationFailed),
    FailurePattern::new("repository not found", FailureKind::NotFound),
    FailurePattern::new("does not appear to be a git repository", FailureKind::NotFound),
    FailurePattern::new("not found in upstream", FailureKind::NotFound),
    FailurePattern::new("already exists and is not an empty directory", FailureKind::Conflict),
    FailurePattern::new("not a git repository", FailureKind::Conflict),
    FailurePattern::new("not possible to fast-forward", FailureKind::MergeConflict),
    FailurePattern::new("diverging branches", FailureKind::MergeConflict),
    FailurePattern::new("would be overwritten by merge", FailureKind::MergeConflict),
    FailurePattern::new("automatic merge failed", FailureKind::MergeConflict),
    FailurePattern::new("merge conflict", FailureKind::MergeConflict),
    FailurePattern::new("conflict (", FailureKind::MergeConflict),
];

/// 制御スクリプト実行時の失敗メッセージ用パターン表
pub const SCRIPT_FAILURE_PATTERNS: &[FailurePattern] = &[
    FailurePattern::new("permission denied", FailureKind::AccessDenied),
    FailurePattern::new("access denied", FailureKind::AccessDenied),
    FailurePattern::new("no such file", FailureKind::NotFound),
    FailurePattern::new("does not exist", FailureKind::NotFound),
    FailurePattern::new("not found", FailureKind::NotFound),
    FailurePattern::new("already registered", FailureKind::Conflict),
    FailurePattern::new("already exists", FailureKind::Conflict),
];

/// メッセージをパターン表で分類する
///
/// 一致しない場合は推測せず [`FailureKind::Unclassified`] を返す。
pub fn classify_message(message: &str, patterns: &[FailurePattern]) -> FailureKind {
    let lower = message.to_lowercase();
    patterns
        .iter()
        .find(|pattern| lower.contains(pattern.needle))
        .map(|pattern| pattern.kind)
        .unwrap_or(FailureKind::Unclassified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_messages_are_classified() {
        let cases = [
            (
                "remote: Repository not found.\nfatal: repository 'https://x/y.git/' not found",
                FailureKind::NotFound,
            ),
            (
                "fatal: Authentication failed for 'https://x/y.git/'",
                FailureKind::AuthenticationFailed,
            ),
            (
                "fatal: destination path 'demo' already exists and is not an empty directory.",
                FailureKind::Conflict,
            ),
            (
                "fatal: Not possible to fast-forward, aborting.",
                FailureKind::MergeConflict,
            ),
        ];

        for (message, expected) in cases {
            assert_eq!(classify_message(message, GIT_FAILURE_PATTERNS), expected, "{}", message);
        }
    }

    #[test]
    fn test_unknown_message_is_unclassified() {
        assert_eq!(
            classify_message("fatal: early EOF", GIT_FAILURE_PATTERNS),
            FailureKind::Unclassified
        );
        assert_eq!(classify_message("", SCRIPT_FAILURE_PATTERNS), FailureKind::Unclassified);
    }

    #[test]
    fn test_url_words_do_not_pick_a_kind() {
        // URL 内の単語やネットワーク障害は分類しない
        let cases = [
            "fatal: unable to access 'https://git.example.com/org/conflict-resolver.git/': \
             Failed to connect to git.example.com port 443: Connection refused",
            "fatal: unable to access 'https://git.example.com/org/demo.git/': \
             Could not resolve host: git.example.com",
        ];

        for message in cases {
            assert_eq!(
                classify_message(message, GIT_FAILURE_PATTERNS),
                FailureKind::Unclassified,
                "{}",
                message
            );
        }
    }

    #[test]
    fn test_merge_phrases_are_merge_conflicts() {
        let cases = [
            "CONFLICT (content): Merge conflict in src/main.ctl",
            "Automatic merge failed; fix conflicts and then commit the result.",
        ];

        for message in cases {
            assert_eq!(
                classify_message(message, GIT_FAILURE_PATTERNS),
                FailureKind::MergeConflict,
                "{}",
                message
            );
        }
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        // 認証失敗と not found が両方含まれる場合は認証失敗
        let message = "Authentication failed: repository not found";
        assert_eq!(
            classify_message(message, GIT_FAILURE_PATTERNS),
            FailureKind::AuthenticationFailed
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(FailureKind::MergeConflict.to_string(), "merge conflict");
        assert_eq!(FailureKind::Unclassified.to_string(), "unclassified");
    }
}
