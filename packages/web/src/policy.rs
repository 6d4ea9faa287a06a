//! # シリアライズ方針
//!
//! 起動時に設定から一度だけ組み立て、以後は変更しない [`WebPolicy`]。
//! ルーターへの適用は [`WebPolicy::apply`] で明示的に行う。

use std::sync::Arc;

use axum::{Router, middleware};

use crate::{
   body::install_converters,
   codec::JsonCodec,
   config::{ConfigError, WebConfig},
   converter::ConverterChain,
   cors::CorsPolicy,
   error_page::{ErrorForwarding, ErrorPageRegistry, forward_error_pages},
};

/// コンバーターチェーン・エラーページ・CORS をまとめた方針
#[derive(Debug, Clone)]
pub struct WebPolicy {
   converters:  Arc<ConverterChain>,
   error_pages: Arc<ErrorPageRegistry>,
   cors:        CorsPolicy,
}

impl WebPolicy {
   pub fn new(converters: ConverterChain, error_pages: ErrorPageRegistry, cors: CorsPolicy) -> Self {
      Self {
         converters: Arc::new(converters),
         error_pages: Arc::new(error_pages),
         cors,
      }
   }

   /// 設定から方針を組み立てる
   ///
   /// パターンをコンパイルしたコーデックを既定のチェーンの先頭に挿入する。
   pub fn from_config(config: &WebConfig) -> Result<Self, ConfigError> {
      let codec = JsonCodec::from_config(&config.formats)?;
      let mut converters = ConverterChain::default();
      converters.insert_first(codec);

      let error_pages = ErrorPageRegistry::from_statuses(config.error_statuses.iter().copied());
      let cors = CorsPolicy::from_config(&config.cors)?;

      tracing::info!(
         date = %config.formats.date,
         time = %config.formats.time,
         date_time = %config.formats.date_time,
         converters = ?converters.names(),
         error_pages = ?error_pages.pages().iter().map(|p| p.path()).collect::<Vec<_>>(),
         "シリアライズ方針を構築しました"
      );

      Ok(Self::new(converters, error_pages, cors))
   }

   pub fn converters(&self) -> &ConverterChain {
      &self.converters
   }

   pub fn error_pages(&self) -> &ErrorPageRegistry {
      &self.error_pages
   }

   pub fn cors(&self) -> &CorsPolicy {
      &self.cors
   }

   /// ルーターに方針を適用する
   ///
   /// 外側から順に: コンバーターチェーンの設定、CORS、エラーページ転送。
   /// 転送先は適用前のルーターで処理する。
   pub fn apply(&self, router: Router) -> Router {
      let forwarding = ErrorForwarding::new(Arc::clone(&self.error_pages), router.clone());

      router
         .layer(middleware::from_fn_with_state(forwarding, forward_error_pages))
         .layer(self.cors.to_layer())
         .layer(middleware::from_fn_with_state(
            Arc::clone(&self.converters),
            install_converters,
         ))
   }
}
