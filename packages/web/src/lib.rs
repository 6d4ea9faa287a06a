//! # Mekatok Web
//!
//! HTTP レスポンスのシリアライズ方針と、各サービス共通の起動処理。
//!
//! ## 方針
//!
//! - 空値（`None`）は `null` ではなく `{}` として書き出す
//! - 日付・時刻・日時は設定されたパターンでエンコードし、同じパターンでデコードする
//! - 設定済みの JSON コーデックはコンバーターチェーンの先頭に挿入する
//! - 401 / 403 / 404 のレスポンスは `/401` / `/403` / `/404` に内部転送する（500 は転送しない）
//! - CORS はすべてのオリジン・ヘッダー・メソッドを許可し、資格情報を許可する（max-age 3600 秒）
//!
//! ## モジュール構成
//!
//! - [`codec`] - パターンのコンパイル、日付・時刻型、JSON コーデック
//! - [`converter`] - ボディコンバーターとその順序付きチェーン
//! - [`body`] - チェーンで変換される [`ApiJson`] ボディ
//! - [`error_page`] - エラーページの登録表と転送ミドルウェア
//! - [`cors`] - CORS 規則
//! - [`policy`] - 上記をまとめた [`WebPolicy`]
//! - [`config`] - 環境変数からの設定読み込み
//! - [`handler`] - ヘルスチェック・エラーページのハンドラ
//! - [`application`] - ルーター構築とサーバー起動

pub mod application;
pub mod body;
pub mod codec;
pub mod config;
pub mod converter;
pub mod cors;
pub mod error;
pub mod error_page;
pub mod handler;
pub mod policy;

pub use application::{ServiceDescriptor, build_router, run};
pub use body::ApiJson;
pub use error::ApiError;
pub use policy::WebPolicy;
