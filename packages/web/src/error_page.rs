//! # エラーページ転送
//!
//! 特定のステータスのレスポンスを、そのステータス専用のルートに内部転送する。
//!
//! ## 仕組み
//!
//! 1. [`forward_error_pages`] ミドルウェアが通常どおりリクエストを処理する
//! 2. レスポンスのステータスが [`ErrorPageRegistry`] に登録されていれば、
//!    同じメソッド・ヘッダーで登録パス（`/401` など）へのリクエストを組み立てる
//! 3. 転送リクエストには元のステータスと URI を [`ErrorDispatch`] として付与する
//! 4. 転送先のボディを元のステータスで返す
//!
//! 登録されていないステータス（500 など）はそのまま返す。
//! 転送先はミドルウェアを通らないルーターで処理されるため、転送は 1 段で止まる。

use std::sync::Arc;

use axum::{
   Router,
   body::Body,
   extract::{Request, State},
   http::{HeaderMap, Method, StatusCode, Uri, header},
   middleware::Next,
   response::Response,
};
use tower::ServiceExt;

use crate::config::DEFAULT_ERROR_STATUSES;

/// ステータスと転送先パスの組
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPage {
   status: StatusCode,
   path:   String,
}

impl ErrorPage {
   pub fn new(status: StatusCode, path: impl Into<String>) -> Self {
      Self {
         status,
         path: path.into(),
      }
   }

   /// `/<ステータスコード>` に転送するページ
   pub fn for_status(status: StatusCode) -> Self {
      Self::new(status, format!("/{}", status.as_u16()))
   }

   pub fn status(&self) -> StatusCode {
      self.status
   }

   pub fn path(&self) -> &str {
      &self.path
   }
}

/// エラーページの登録表
///
/// 登録順を保持する。同じステータスを再登録すると転送先パスを置き換える。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorPageRegistry {
   pages: Vec<ErrorPage>,
}

impl ErrorPageRegistry {
   /// 空の登録表
   pub fn new() -> Self {
      Self::default()
   }

   /// 401 / 403 / 404 を登録した表
   pub fn with_defaults() -> Self {
      Self::from_statuses(DEFAULT_ERROR_STATUSES)
   }

   /// 各ステータスを `/<ステータスコード>` に登録した表
   pub fn from_statuses(statuses: impl IntoIterator<Item = StatusCode>) -> Self {
      let mut registry = Self::new();
      registry.add_error_pages(statuses.into_iter().map(ErrorPage::for_status));
      registry
   }

   pub fn add_error_page(&mut self, page: ErrorPage) {
      match self.pages.iter_mut().find(|p| p.status == page.status) {
         Some(existing) => existing.path = page.path,
         None => self.pages.push(page),
      }
   }

   pub fn add_error_pages(&mut self, pages: impl IntoIterator<Item = ErrorPage>) {
      for page in pages {
         self.add_error_page(page);
      }
   }

   /// ステータスの転送先
   pub fn resolve(&self, status: StatusCode) -> Option<&ErrorPage> {
      self.pages.iter().find(|page| page.status == status)
   }

   /// 登録順のページ
   pub fn pages(&self) -> &[ErrorPage] {
      &self.pages
   }

   pub fn len(&self) -> usize {
      self.pages.len()
   }

   pub fn is_empty(&self) -> bool {
      self.pages.is_empty()
   }
}

/// 転送されたリクエストに付与される元リクエストの情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDispatch {
   /// 元のレスポンスのステータス
   pub status:       StatusCode,
   pub method:       Method,
   pub original_uri: Uri,
}

/// [`forward_error_pages`] の状態
#[derive(Clone)]
pub struct ErrorForwarding {
   pages:      Arc<ErrorPageRegistry>,
   dispatcher: Router,
}

impl ErrorForwarding {
   /// `dispatcher` は転送先を処理するルーター。ミドルウェアを適用する前のものを渡す
   pub fn new(pages: Arc<ErrorPageRegistry>, dispatcher: Router) -> Self {
      Self { pages, dispatcher }
   }

   async fn forward(
      &self,
      page: &ErrorPage,
      method: Method,
      original_uri: Uri,
      mut headers: HeaderMap,
      original: Response,
   ) -> Response {
      let status = original.status();
      let path = match page.path().parse::<Uri>() {
         Ok(path) => path,
         Err(e) => {
            tracing::error!(error = %e, path = page.path(), "エラーページのパスが不正です");
            return original;
         }
      };

      tracing::debug!(
         status = status.as_u16(),
         path = page.path(),
         uri = %original_uri,
         "エラーページに転送します"
      );

      headers.remove(header::CONTENT_LENGTH);
      headers.remove(header::CONTENT_TYPE);
      headers.remove(header::TRANSFER_ENCODING);

      let mut request = Request::new(Body::empty());
      *request.method_mut() = method.clone();
      *request.uri_mut() = path;
      *request.headers_mut() = headers;
      request.extensions_mut().insert(ErrorDispatch {
         status,
         method,
         original_uri,
      });

      let rendered = match self.dispatcher.clone().oneshot(request).await {
         Ok(response) => response,
         Err(never) => match never {},
      };

      let (mut parts, body) = rendered.into_parts();
      parts.status = status;
      for name in original.headers().keys() {
         if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH || parts.headers.contains_key(name) {
            continue;
         }
         for value in original.headers().get_all(name) {
            parts.headers.append(name.clone(), value.clone());
         }
      }

      Response::from_parts(parts, body)
   }
}

/// 登録されたステータスのレスポンスをエラーページに転送するミドルウェア
///
/// `from_fn_with_state` で使う。
pub async fn forward_error_pages(
   State(forwarding): State<ErrorForwarding>,
   request: Request,
   next: Next,
) -> Response {
   let method = request.method().clone();
   let uri = request.uri().clone();
   let headers = request.headers().clone();

   let response = next.run(request).await;

   match forwarding.pages.resolve(response.status()) {
      Some(page) => {
         forwarding
            .forward(page, method, uri, headers, response)
            .await
      }
      None => response,
   }
}
