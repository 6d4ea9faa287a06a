//! # Notice サービス
//!
//! お知らせ（Notice）ドメインを担当する、独立してデプロイされるサービスのエントリーポイント。
//! 起動処理とシリアライズ方針は [`mekatok_web::application`] に集約している。
//!
//! ## 環境変数
//!
//! ポート番号は `.env` ファイルまたは環境変数で設定する。
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `NOTICE_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `NOTICE_PORT` | **Yes** | ポート番号 |
//! | `MEKATOK_DATE_FORMAT` | No | 日付パターン（デフォルト: `yyyy-MM-dd`） |
//! | `MEKATOK_TIME_FORMAT` | No | 時刻パターン（デフォルト: `HH:mm:ss`） |
//! | `MEKATOK_DATETIME_FORMAT` | No | 日時パターン（デフォルト: `yyyy-MM-dd HH:mm:ss`） |
//! | `MEKATOK_ERROR_PAGES` | No | エラーページに転送するステータス（デフォルト: `401,403,404`） |
//! | `MEKATOK_CORS_ALLOWED_ORIGINS` | No | 許可オリジン（デフォルト: `*`） |
//! | `MEKATOK_CORS_MAX_AGE` | No | プリフライトのキャッシュ秒数（デフォルト: `3600`） |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! NOTICE_PORT=18081 cargo run -p mekatok-notice-service
//! ```

use axum::Router;
use mekatok_web::{ServiceDescriptor, application};

const SERVICE: ServiceDescriptor = ServiceDescriptor::new("notice-service", "NOTICE", env!("CARGO_PKG_VERSION"));

#[tokio::main]
async fn main() -> anyhow::Result<()> {
   application::run(SERVICE, Router::new()).await
}
