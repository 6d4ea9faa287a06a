//! # アプリケーション起動
//!
//! 各サービスの `main` から呼ばれる共通の起動処理。
//!
//! 以下の順序で初期化する:
//!
//! 1. 環境変数の読み込み（.env ファイル）
//! 2. トレーシングの初期化
//! 3. サーバー設定・シリアライズ方針の設定の読み込み
//! 4. [`WebPolicy`] の構築（パターンのコンパイル）
//! 5. ルーターの構築
//! 6. HTTP サーバーの起動（Ctrl+C / SIGTERM で graceful shutdown）
//!
//! 3 と 4 の失敗は起動失敗として `main` に返す。

use anyhow::Context;
use axum::{Router, routing::get};
use mekatok_shared::observability::{MakeRequestUuidV7, TracingConfig, init_tracing, make_request_span};
use tokio::net::TcpListener;
use tower_http::{
   request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
   trace::TraceLayer,
};

use crate::{
   config::{ServerConfig, WebConfig},
   handler::{error_page_routes, fallback_not_found, health_check},
   policy::WebPolicy,
};

/// 起動するサービスの識別情報
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDescriptor {
   /// サービス名（ログとヘルスチェックに出力）
   pub name:       &'static str,
   /// `<PREFIX>_HOST` / `<PREFIX>_PORT` のプレフィックス
   pub env_prefix: &'static str,
   pub version:    &'static str,
}

impl ServiceDescriptor {
   pub const fn new(name: &'static str, env_prefix: &'static str, version: &'static str) -> Self {
      Self {
         name,
         env_prefix,
         version,
      }
   }
}

/// サービスのルートに共通ルートと方針を載せたルーターを構築する
///
/// レイヤーは外側から順に:
///
/// 1. `SetRequestIdLayer`: UUID v7 の Request ID を付与（クライアント提供値を優先）
/// 2. `TraceLayer`: request_id を含むスパンで全ログを包む
/// 3. `PropagateRequestIdLayer`: レスポンスに `X-Request-Id` をコピー
/// 4. [`WebPolicy::apply`] のレイヤー
pub fn build_router(service: ServiceDescriptor, policy: &WebPolicy, routes: Router) -> Router {
   let router = routes
      .merge(Router::new().route("/health", get(health_check)).with_state(service))
      .merge(error_page_routes(policy.error_pages()))
      .fallback(fallback_not_found);

   policy
      .apply(router)
      .layer(PropagateRequestIdLayer::x_request_id())
      .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
      .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}

/// サービスを起動し、シャットダウンまで待つ
pub async fn run(service: ServiceDescriptor, routes: Router) -> anyhow::Result<()> {
   // 本番環境では .env を置かず、環境変数を直接設定する
   dotenvy::dotenv().ok();

   init_tracing(&TracingConfig::from_env(service.name));

   let server = ServerConfig::from_env(service.env_prefix).context("サーバー設定の読み込みに失敗しました")?;
   let web = WebConfig::from_env().context("シリアライズ方針の設定の読み込みに失敗しました")?;
   let policy = WebPolicy::from_config(&web).context("シリアライズ方針の構築に失敗しました")?;

   let app = build_router(service, &policy, routes);

   let addr = server.socket_addr()?;
   let listener = TcpListener::bind(addr)
      .await
      .with_context(|| format!("{addr} にバインドできません"))?;
   tracing::info!(service = service.name, version = service.version, "サーバーが起動しました: {addr}");

   axum::serve(listener, app)
      .with_graceful_shutdown(shutdown_signal())
      .await
      .context("サーバーが異常終了しました")?;

   tracing::info!(service = service.name, "サーバーを停止しました");
   Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
   use tokio::signal::unix::{SignalKind, signal};

   let mut sigterm = match signal(SignalKind::terminate()) {
      Ok(sigterm) => sigterm,
      Err(e) => {
         tracing::warn!(error = %e, "SIGTERM ハンドラを登録できません。Ctrl+C のみ待ちます");
         ctrl_c().await;
         return;
      }
   };

   tokio::select! {
      () = ctrl_c() => {}
      _ = sigterm.recv() => {
         tracing::info!("SIGTERM を受信しました。シャットダウンします");
      }
   }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
   ctrl_c().await;
}

async fn ctrl_c() {
   match tokio::signal::ctrl_c().await {
      Ok(()) => tracing::info!("Ctrl+C を受信しました。シャットダウンします"),
      Err(e) => {
         tracing::warn!(error = %e, "Ctrl+C を待機できません");
         std::future::pending::<()>().await;
      }
   }
}
