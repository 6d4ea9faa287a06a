//! # エラーページハンドラ
//!
//! [`ErrorPageRegistry`] に登録されたパス（`/401` など）で RFC 9457 形式のボディを返す。
//! 転送されたリクエストでは `instance` に元のリクエストのパスを入れる。

use axum::{
   Router,
   extract::Request,
   http::StatusCode,
   response::{IntoResponse, Response},
   routing::any,
};
use mekatok_shared::ErrorResponse;

use crate::{
   body::ApiJson,
   error::ApiError,
   error_page::{ErrorDispatch, ErrorPageRegistry},
};

/// ステータスごとの利用者向けメッセージ
fn detail_for(status: StatusCode) -> &'static str {
   match status {
      StatusCode::UNAUTHORIZED => "認証が必要です",
      StatusCode::FORBIDDEN => "アクセスが拒否されました",
      StatusCode::NOT_FOUND => "リソースが見つかりません",
      _ => status.canonical_reason().unwrap_or("エラーが発生しました"),
   }
}

/// エラーページのボディを組み立てる
///
/// 転送されたリクエストなら元のステータスとパスを使う。
/// 直接アクセスされた場合は登録されたステータスで応答する。
pub fn render_error_page(status: StatusCode, request: &Request) -> Response {
   let (status, instance) = match request.extensions().get::<ErrorDispatch>() {
      Some(dispatch) => (dispatch.status, dispatch.original_uri.path().to_string()),
      None => (status, request.uri().path().to_string()),
   };

   let body = ErrorResponse::for_status(status.as_u16(), detail_for(status)).with_instance(instance);
   (status, ApiJson(body)).into_response()
}

/// 登録されたページごとのルート
///
/// メソッドを問わず応答する。サービスのルートと同じパスを登録すると `merge` でパニックする。
pub fn error_page_routes(registry: &ErrorPageRegistry) -> Router {
   registry.pages().iter().fold(Router::new(), |router, page| {
      let status = page.status();
      router.route(
         page.path(),
         any(move |request: Request| async move { render_error_page(status, &request) }),
      )
   })
}

/// どのルートにも一致しないリクエスト
pub async fn fallback_not_found() -> ApiError {
   ApiError::NotFound
}
