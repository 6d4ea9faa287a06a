//! # ヘルスチェック共通型
//!
//! 各サービスのヘルスチェックエンドポイントが返すレスポンス型。

use serde::{Deserialize, Serialize};

/// ヘルスチェックレスポンス
///
/// ## 使用例
///
/// ```
/// use mekatok_shared::HealthResponse;
///
/// let response = HealthResponse::healthy("notice-service", "0.1.0");
/// assert_eq!(response.status, "healthy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
   /// 稼働状態（`"healthy"` 固定）
   pub status:  String,
   /// サービス名
   pub service: String,
   /// アプリケーションバージョン
   pub version: String,
}

impl HealthResponse {
   /// 稼働中を表すレスポンスを作成する
   pub fn healthy(service: impl Into<String>, version: impl Into<String>) -> Self {
      Self {
         status:  "healthy".to_string(),
         service: service.into(),
         version: version.into(),
      }
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   #[test]
   fn test_healthyのjson形状() {
      let response = HealthResponse::healthy("user-service", "0.1.0");
      let json = serde_json::to_value(&response).unwrap();

      assert_eq!(
         json,
         serde_json::json!({
            "status": "healthy",
            "service": "user-service",
            "version": "0.1.0",
         })
      );
   }
}
