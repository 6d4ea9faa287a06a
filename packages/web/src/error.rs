//! # API エラー
//!
//! ハンドラーとボディ抽出が返すエラーと、RFC 9457 形式のレスポンスへの変換。
//!
//! 401 / 403 / 404 のレスポンスはエラーページ転送の対象になるため、
//! 転送が有効なルーターではここで書き出したボディは転送先のボディに置き換わる。

use axum::{
   http::StatusCode,
   response::{IntoResponse, Response},
};
use mekatok_shared::ErrorResponse;
use thiserror::Error;

use crate::body::ApiJson;

/// API 層で発生するエラー
///
/// `Internal` は `#[from] anyhow::Error` を持つため、`?` で任意のエラーを変換できる。
#[derive(Debug, Error)]
pub enum ApiError {
   /// リソースが見つからない（404 Not Found）
   #[error("リソースが見つかりません")]
   NotFound,

   /// リクエストが不正（400 Bad Request）
   #[error("リクエストが不正です: {0}")]
   BadRequest(String),

   /// 認証されていない（401 Unauthorized）
   #[error("認証エラー")]
   Unauthorized,

   /// アクセス権限がない（403 Forbidden）
   #[error("権限エラー")]
   Forbidden,

   /// 対応していない Content-Type（415 Unsupported Media Type）
   #[error("対応していない Content-Type です: '{0}'")]
   UnsupportedMediaType(String),

   /// 内部サーバーエラー（500 Internal Server Error）
   ///
   /// 詳細はログにのみ出力し、クライアントには返さない。
   #[error("内部サーバーエラー")]
   Internal(#[from] anyhow::Error),
}

impl ApiError {
   pub fn status(&self) -> StatusCode {
      match self {
         Self::NotFound => StatusCode::NOT_FOUND,
         Self::BadRequest(_) => StatusCode::BAD_REQUEST,
         Self::Unauthorized => StatusCode::UNAUTHORIZED,
         Self::Forbidden => StatusCode::FORBIDDEN,
         Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
         Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
      }
   }

   fn to_error_response(&self) -> ErrorResponse {
      match self {
         Self::NotFound => ErrorResponse::not_found("リソースが見つかりません"),
         Self::BadRequest(detail) => ErrorResponse::bad_request(detail.clone()),
         Self::Unauthorized => ErrorResponse::unauthorized("認証が必要です"),
         Self::Forbidden => ErrorResponse::forbidden("アクセスが拒否されました"),
         Self::UnsupportedMediaType(media_type) => ErrorResponse::unsupported_media_type(format!(
            "Content-Type '{media_type}' のボディは受け付けられません"
         )),
         Self::Internal(_) => ErrorResponse::internal_error(),
      }
   }
}

impl IntoResponse for ApiError {
   fn into_response(self) -> Response {
      if let Self::Internal(ref e) = self {
         tracing::error!(error = ?e, "内部エラーが発生しました");
      }

      (self.status(), ApiJson(self.to_error_response())).into_response()
   }
}
