use crate::common::error::AddonError;

/// プロジェクト全体で使用するResult型のエイリアス
///
/// # Examples
///
/// ```
/// use oa_addons::common::result::AddonResult;
/// use oa_addons::common::error::AddonError;
///
/// fn example_function() -> AddonResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> AddonResult<()> {
///     Err(AddonError::unclassified("Something went wrong"))
/// }
/// ```
pub type AddonResult<T> = Result<T, AddonError>;

/// OptionをAddonResultに変換するヘルパー
pub trait OptionExt<T> {
    /// Noneの場合は入力エラー（I/O前の検証失敗）にする
    ///
    /// ```
    /// use oa_addons::common::result::{AddonResult, OptionExt};
    ///
    /// let none_value: Option<String> = None;
    /// let result: AddonResult<String> = none_value.ok_or_invalid_input("organization", "required");
    /// assert!(result.is_err());
    /// ```
    fn ok_or_invalid_input(
        self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> AddonResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_invalid_input(
        self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> AddonResult<T> {
        self.ok_or_else(|| AddonError::invalid_input(field, message))
    }
}

/// AddonResult用のヘルパー
pub trait AddonResultExt<T> {
    /// Optionに変換（エラーは警告ログに出す）
    fn to_option_logged(self) -> Option<T>;
}

impl<T> AddonResultExt<T> for AddonResult<T> {
    fn to_option_logged(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        }
    }
}
