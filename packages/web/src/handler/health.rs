//! # ヘルスチェックハンドラ
//!
//! ```text
//! GET /health
//! ```
//!
//! ロードバランサーやオーケストレーターの死活監視用。アプリケーション自体の起動状態のみを返す。

use axum::extract::State;
use mekatok_shared::HealthResponse;

use crate::{application::ServiceDescriptor, body::ApiJson};

/// 常に 200 OK と `"healthy"` を返す
pub async fn health_check(State(service): State<ServiceDescriptor>) -> ApiJson<HealthResponse> {
   ApiJson(HealthResponse::healthy(service.name, service.version))
}
