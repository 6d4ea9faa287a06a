//! # CORS
//!
//! すべてのパスに 1 つの規則を適用する CORS 設定。
//!
//! 既定はオリジン・ヘッダー・メソッドをすべて許可し、資格情報を許可し、
//! プリフライトを 3600 秒キャッシュさせる。
//! 資格情報を許可する場合 `*` は使えないため、「すべて許可」はリクエストの
//! `Origin` などをそのまま返すことで実現する。

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::{CORS_ALLOWED_ORIGINS_VAR, ConfigError, CorsConfig, DEFAULT_CORS_MAX_AGE};

/// 許可するオリジン
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
   Any,
   List(Vec<HeaderValue>),
}

/// CORS の規則
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
   pub allowed_origins:   AllowedOrigins,
   pub allow_credentials: bool,
   pub max_age:           Duration,
}

impl Default for CorsPolicy {
   fn default() -> Self {
      Self::permissive()
   }
}

impl CorsPolicy {
   /// すべて許可・資格情報あり・3600 秒キャッシュ
   pub fn permissive() -> Self {
      Self {
         allowed_origins:   AllowedOrigins::Any,
         allow_credentials: true,
         max_age:           DEFAULT_CORS_MAX_AGE,
      }
   }

   pub fn from_config(config: &CorsConfig) -> Result<Self, ConfigError> {
      let allowed_origins = if config.allowed_origins.is_empty() {
         AllowedOrigins::Any
      } else {
         let origins = config
            .allowed_origins
            .iter()
            .map(|origin| {
               if origin.trim() == "*" {
                  return Err(ConfigError::Invalid {
                     name:   CORS_ALLOWED_ORIGINS_VAR.to_string(),
                     value:  origin.clone(),
                     reason: "`*` はオリジン列に含められません".to_string(),
                  });
               }
               HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                  name:   CORS_ALLOWED_ORIGINS_VAR.to_string(),
                  value:  origin.clone(),
                  reason: e.to_string(),
               })
            })
            .collect::<Result<Vec<_>, _>>()?;
         AllowedOrigins::List(origins)
      };

      Ok(Self {
         allowed_origins,
         max_age: config.max_age,
         ..Self::permissive()
      })
   }

   /// tower-http のレイヤーに変換する
   pub fn to_layer(&self) -> CorsLayer {
      let allow_origin = match (&self.allowed_origins, self.allow_credentials) {
         (AllowedOrigins::Any, true) => AllowOrigin::mirror_request(),
         (AllowedOrigins::Any, false) => AllowOrigin::any(),
         (AllowedOrigins::List(origins), _) => AllowOrigin::list(origins.iter().cloned()),
      };
      let (allow_headers, allow_methods) = if self.allow_credentials {
         (AllowHeaders::mirror_request(), AllowMethods::mirror_request())
      } else {
         (AllowHeaders::any(), AllowMethods::any())
      };

      CorsLayer::new()
         .allow_origin(allow_origin)
         .allow_headers(allow_headers)
         .allow_methods(allow_methods)
         .allow_credentials(self.allow_credentials)
         .max_age(self.max_age)
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   #[test]
   fn test_既定はすべて許可() {
      let policy = CorsPolicy::permissive();

      assert_eq!(policy.allowed_origins, AllowedOrigins::Any);
      assert!(policy.allow_credentials);
      assert_eq!(policy.max_age, Duration::from_secs(3600));
   }

   #[test]
   fn test_設定のオリジン列を使う() {
      let config = CorsConfig {
         allowed_origins: vec!["https://app.example.com".to_string()],
         max_age:         Duration::from_secs(60),
      };

      let policy = CorsPolicy::from_config(&config).unwrap();

      assert_eq!(
         policy.allowed_origins,
         AllowedOrigins::List(vec![HeaderValue::from_static("https://app.example.com")])
      );
      assert_eq!(policy.max_age, Duration::from_secs(60));
      assert!(policy.allow_credentials);
   }

   #[test]
   fn test_空のオリジン列はすべて許可() {
      let policy = CorsPolicy::from_config(&CorsConfig::default()).unwrap();

      assert_eq!(policy, CorsPolicy::permissive());
   }

   #[test]
   fn test_オリジン列のアスタリスクはレイヤー構築前にエラー() {
      let config = CorsConfig {
         allowed_origins: vec!["https://a.example.com".to_string(), "*".to_string()],
         ..CorsConfig::default()
      };

      assert!(matches!(
         CorsPolicy::from_config(&config),
         Err(ConfigError::Invalid { ref value, .. }) if value == "*"
      ));
   }

   #[test]
   fn test_ヘッダー値にできないオリジンはエラー() {
      let config = CorsConfig {
         allowed_origins: vec!["https://bad\nexample.com".to_string()],
         ..CorsConfig::default()
      };

      assert!(matches!(
         CorsPolicy::from_config(&config),
         Err(ConfigError::Invalid { .. })
      ));
   }
}
