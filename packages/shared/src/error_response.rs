//! # エラーレスポンス（RFC 9457 Problem Details）
//!
//! エラーページハンドラと API エラーが返す共通のレスポンス構造体。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換は web 層の責務
//! - `instance` には問題が発生したリクエストのパスを入れる（エラーページ転送時に使用）

use serde::{Deserialize, Serialize};

/// error_type URI のベースパス
const ERROR_TYPE_BASE: &str = "https://mekatok.example.com/errors";

/// エラーレスポンス（RFC 9457 Problem Details）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
   #[serde(rename = "type")]
   pub error_type: String,
   pub title:      String,
   pub status:     u16,
   pub detail:     String,
   /// 問題が発生したリクエストのパス
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub instance:   Option<String>,
}

impl ErrorResponse {
   /// 汎用コンストラクタ
   ///
   /// `error_type_suffix` はベース URI に付加される（例: `"not-found"`）。
   pub fn new(
      error_type_suffix: &str,
      title: impl Into<String>,
      status: u16,
      detail: impl Into<String>,
   ) -> Self {
      Self {
         error_type: format!("{ERROR_TYPE_BASE}/{error_type_suffix}"),
         title: title.into(),
         status,
         detail: detail.into(),
         instance: None,
      }
   }

   /// ステータスコードから対応するエラーレスポンスを作成する
   ///
   /// 専用のコンストラクタがないステータスは `http-<status>` 型になる。
   pub fn for_status(status: u16, detail: impl Into<String>) -> Self {
      match status {
         400 => Self::bad_request(detail),
         401 => Self::unauthorized(detail),
         403 => Self::forbidden(detail),
         404 => Self::not_found(detail),
         500 => Self::new("internal-error", "Internal Server Error", 500, detail),
         other => Self::new(&format!("http-{other}"), format!("HTTP {other}"), other, detail),
      }
   }

   /// 問題が発生したリクエストのパスを設定する
   pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
      self.instance = Some(instance.into());
      self
   }

   /// 400 Bad Request
   pub fn bad_request(detail: impl Into<String>) -> Self {
      Self::new("bad-request", "Bad Request", 400, detail)
   }

   /// 401 Unauthorized
   pub fn unauthorized(detail: impl Into<String>) -> Self {
      Self::new("unauthorized", "Unauthorized", 401, detail)
   }

   /// 403 Forbidden
   pub fn forbidden(detail: impl Into<String>) -> Self {
      Self::new("forbidden", "Forbidden", 403, detail)
   }

   /// 404 Not Found
   pub fn not_found(detail: impl Into<String>) -> Self {
      Self::new("not-found", "Not Found", 404, detail)
   }

   /// 415 Unsupported Media Type
   pub fn unsupported_media_type(detail: impl Into<String>) -> Self {
      Self::new("unsupported-media-type", "Unsupported Media Type", 415, detail)
   }

   /// 500 Internal Server Error
   ///
   /// detail は固定値（内部情報を漏らさないため）。
   pub fn internal_error() -> Self {
      Self::new(
         "internal-error",
         "Internal Server Error",
         500,
         "内部エラーが発生しました",
      )
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   #[test]
   fn test_not_found_が404と正しいerror_typeを返す() {
      let error = ErrorResponse::not_found("リソースが見つかりません");

      assert_eq!(
         error.error_type,
         "https://mekatok.example.com/errors/not-found"
      );
      assert_eq!(error.title, "Not Found");
      assert_eq!(error.status, 404);
      assert_eq!(error.instance, None);
   }

   #[test]
   fn test_for_statusは専用コンストラクタに委譲する() {
      assert_eq!(
         ErrorResponse::for_status(401, "x"),
         ErrorResponse::unauthorized("x")
      );
      assert_eq!(
         ErrorResponse::for_status(403, "x"),
         ErrorResponse::forbidden("x")
      );
      assert_eq!(
         ErrorResponse::for_status(404, "x"),
         ErrorResponse::not_found("x")
      );
   }

   #[test]
   fn test_for_statusは未知のステータスに汎用型を使う() {
      let error = ErrorResponse::for_status(429, "多すぎます");

      assert_eq!(
         error.error_type,
         "https://mekatok.example.com/errors/http-429"
      );
      assert_eq!(error.title, "HTTP 429");
      assert_eq!(error.status, 429);
   }

   #[test]
   fn test_instance未設定ならjsonに含まれない() {
      let json = serde_json::to_value(ErrorResponse::forbidden("権限がありません")).unwrap();

      assert_eq!(json["type"], "https://mekatok.example.com/errors/forbidden");
      assert_eq!(json["status"], 403);
      assert!(json.get("instance").is_none());
      assert!(json.get("error_type").is_none());
   }

   #[test]
   fn test_with_instanceでパスがjsonに含まれる() {
      let error = ErrorResponse::not_found("見つかりません").with_instance("/notices/42");
      let json = serde_json::to_value(&error).unwrap();

      assert_eq!(json["instance"], "/notices/42");
   }

   #[test]
   fn test_internal_error_は固定detailを返す() {
      let error = ErrorResponse::internal_error();

      assert_eq!(error.status, 500);
      assert_eq!(error.detail, "内部エラーが発生しました");
   }
}
