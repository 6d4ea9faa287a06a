//! # Mekatok 共有ユーティリティ
//!
//! Notice / User の各サービスとフレームワーク層で共通に使うユーティリティ。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - axum には依存しない（`IntoResponse` 変換は web 層の責務）
//! - トレーシング初期化などの重い依存は `observability` feature に閉じ込める

pub mod error_response;
pub mod health;
pub mod observability;

pub use error_response::ErrorResponse;
pub use health::HealthResponse;
