//! # JSON ボディ
//!
//! リクエスト・レスポンスのボディを、そのリクエストに設定されたコンバーターチェーンで変換する。
//!
//! ## 仕組み
//!
//! 1. [`install_converters`] ミドルウェアが [`ConverterChain`] を task-local に保存する
//! 2. [`ApiJson`] の抽出・レスポンス変換が task-local からチェーンを取り出し、
//!    メディアタイプに応じた最初のコンバーターに変換を任せる
//!
//! ミドルウェアの外（単体テストなど）では既定のチェーンを使う。

use std::sync::{Arc, LazyLock};

use axum::{
   body::Bytes,
   extract::{FromRequest, Request, State},
   http::{HeaderValue, StatusCode, header},
   middleware::Next,
   response::{IntoResponse, Response},
};
use mekatok_shared::ErrorResponse;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
   converter::{BodyConverter, ConverterChain, JSON_MEDIA_TYPE},
   error::ApiError,
};

tokio::task_local! {
   static CONVERTERS: Arc<ConverterChain>;
}

static DEFAULT_CHAIN: LazyLock<Arc<ConverterChain>> =
   LazyLock::new(|| Arc::new(ConverterChain::default()));

/// 現在のリクエストのコンバーターチェーンを取得する
///
/// [`install_converters`] のスコープ外では既定のチェーンを返す。
pub fn current_converters() -> Arc<ConverterChain> {
   CONVERTERS
      .try_with(Arc::clone)
      .unwrap_or_else(|_| Arc::clone(&DEFAULT_CHAIN))
}

/// コンバーターチェーンを task-local に保存するミドルウェア
///
/// `from_fn_with_state` で使う。
pub async fn install_converters(
   State(chain): State<Arc<ConverterChain>>,
   request: Request,
   next: Next,
) -> Response {
   CONVERTERS.scope(chain, next.run(request)).await
}

/// コンバーターチェーンで変換される JSON ボディ
///
/// `axum::Json` と同じ位置で使う。抽出時は `Content-Type` に応じた
/// コンバーターでデコードし、レスポンス時は JSON 用の先頭のコンバーターでエンコードする。
///
/// 空値は `{}` として書き出すが、読み込み時に `{}` を空値とはみなさない。
/// クライアントは空値を `null` で送るか、フィールドごと省略すること。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApiJson<T>(pub T);

impl<T> ApiJson<T> {
   pub fn into_inner(self) -> T {
      self.0
   }
}

impl<T> From<T> for ApiJson<T> {
   fn from(value: T) -> Self {
      Self(value)
   }
}

impl<T: Serialize> IntoResponse for ApiJson<T> {
   fn into_response(self) -> Response {
      let chain = current_converters();
      let Some(converter) = chain.select(JSON_MEDIA_TYPE) else {
         tracing::error!(chain = ?chain.names(), "JSON を扱えるコンバーターがありません");
         return encoding_failed();
      };

      match converter.write(&self.0) {
         Ok(bytes) => {
            let content_type = HeaderValue::from_str(converter.media_type())
               .unwrap_or_else(|_| HeaderValue::from_static(JSON_MEDIA_TYPE));
            ([(header::CONTENT_TYPE, content_type)], bytes).into_response()
         }
         Err(e) => {
            tracing::error!(
               error = %e,
               converter = converter.name(),
               "レスポンスボディの変換に失敗しました"
            );
            encoding_failed()
         }
      }
   }
}

/// エンコードに失敗したときの 500 レスポンス
///
/// コンバーターを経由せず serde_json で直接書き出す。
fn encoding_failed() -> Response {
   (
      StatusCode::INTERNAL_SERVER_ERROR,
      axum::Json(ErrorResponse::internal_error()),
   )
      .into_response()
}

impl<T, S> FromRequest<S> for ApiJson<T>
where
   T: DeserializeOwned,
   S: Send + Sync,
{
   type Rejection = ApiError;

   async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
      let media_type = request
         .headers()
         .get(header::CONTENT_TYPE)
         .and_then(|value| value.to_str().ok())
         .unwrap_or_default()
         .to_string();

      let chain = current_converters();
      let converter = chain
         .select(&media_type)
         .ok_or_else(|| ApiError::UnsupportedMediaType(media_type.clone()))?;

      let bytes = Bytes::from_request(request, state)
         .await
         .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

      read_body(converter.as_ref(), &bytes).map(Self)
   }
}

fn read_body<T: DeserializeOwned>(
   converter: &(dyn BodyConverter + 'static),
   bytes: &[u8],
) -> Result<T, ApiError> {
   converter.read(bytes).map_err(|e| {
      tracing::debug!(error = %e, converter = converter.name(), "リクエストボディを解析できません");
      ApiError::BadRequest(e.to_string())
   })
}
