use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Outcome tier of an external process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitClassification {
    Success,
    Warning,
    Error,
}

impl ExitClassification {
    pub fn is_error(&self) -> bool {
        matches!(self, ExitClassification::Error)
    }
}

impl fmt::Display for ExitClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitClassification::Success => write!(f, "success"),
            ExitClassification::Warning => write!(f, "warning"),
            ExitClassification::Error => write!(f, "error"),
        }
    }
}

/// Classify an exit code against caller-supplied success and warning sets.
///
/// Every code maps to exactly one tier. Success wins when a code appears in
/// both sets; a code in neither set is always `Error`.
pub fn classify(
    exit_code: i32,
    success_codes: &BTreeSet<i32>,
    warning_codes: &BTreeSet<i32>,
) -> ExitClassification {
    if success_codes.contains(&exit_code) {
        ExitClassification::Success
    } else if warning_codes.contains(&exit_code) {
        ExitClassification::Warning
    } else {
        ExitClassification::Error
    }
}

/// Reusable pair of code sets, configurable per command family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitCodePolicy {
    #[serde(default = "default_success_codes")]
    pub success_codes: BTreeSet<i32>,

    #[serde(default)]
    pub warning_codes: BTreeSet<i32>,
}

fn default_success_codes() -> BTreeSet<i32> {
    BTreeSet::from([0])
}

impl Default for ExitCodePolicy {
    fn default() -> Self {
        Self {
            success_codes: default_success_codes(),
            warning_codes: BTreeSet::new(),
        }
    }
}

impl ExitCodePolicy {
    pub fn new(
        success_codes: impl IntoIterator<Item = i32>,
        warning_codes: impl IntoIterator<Item = i32>,
    ) -> Self {
        Self {
            success_codes: success_codes.into_iter().collect(),
            warning_codes: warning_codes.into_iter().collect(),
        }
    }

    pub fn classify(&self, exit_code: i32) -> ExitClassification {
        classify(exit_code, &self.success_codes, &self.warning_codes)
    }
}
