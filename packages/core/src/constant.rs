//! # プロセス共通定数
//!
//! JSON の日付・時刻表現に使うフォーマットパターンの既定値。
//!
//! パターンは `yyyy-MM-dd` 形式のパターン文字で記述する。
//! デプロイ環境ごとに環境変数で上書きできるため、ここにあるのは既定値のみ。

/// 時刻（時分秒）のフォーマット
pub const TIME_FORMAT: &str = "HH:mm:ss";

/// 日付のフォーマット
pub const DATE_FORMAT: &str = "yyyy-MM-dd";

/// 日時のフォーマット
pub const DATETIME_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   #[test]
   fn test_datetime_formatは日付と時刻の連結である() {
      assert_eq!(DATETIME_FORMAT, format!("{DATE_FORMAT} {TIME_FORMAT}"));
   }
}
