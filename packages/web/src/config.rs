//! # 設定
//!
//! 環境変数からサーバーとシリアライズ方針の設定を読み込む。
//!
//! 解析は参照関数（`Fn(&str) -> Option<String>`）経由で行う。
//! 本番では [`std::env::var`]、テストではマップを渡す。

use std::{env, net::SocketAddr, time::Duration};

use http::StatusCode;
use mekatok_core::constant::{DATE_FORMAT, DATETIME_FORMAT, TIME_FORMAT};
use thiserror::Error;

use crate::codec::PatternError;

/// 日付パターンの環境変数
pub const DATE_FORMAT_VAR: &str = "MEKATOK_DATE_FORMAT";
/// 時刻パターンの環境変数
pub const TIME_FORMAT_VAR: &str = "MEKATOK_TIME_FORMAT";
/// 日時パターンの環境変数
pub const DATETIME_FORMAT_VAR: &str = "MEKATOK_DATETIME_FORMAT";
/// エラーページに転送するステータスの環境変数
pub const ERROR_PAGES_VAR: &str = "MEKATOK_ERROR_PAGES";
/// CORS の許可オリジンの環境変数
pub const CORS_ALLOWED_ORIGINS_VAR: &str = "MEKATOK_CORS_ALLOWED_ORIGINS";
/// CORS プリフライトのキャッシュ秒数の環境変数
pub const CORS_MAX_AGE_VAR: &str = "MEKATOK_CORS_MAX_AGE";

/// 既定で転送するステータス
pub const DEFAULT_ERROR_STATUSES: [StatusCode; 3] = [
   StatusCode::UNAUTHORIZED,
   StatusCode::FORBIDDEN,
   StatusCode::NOT_FOUND,
];

/// プリフライトの既定キャッシュ秒数
pub const DEFAULT_CORS_MAX_AGE: Duration = Duration::from_secs(3600);

/// 設定エラー
#[derive(Debug, Error)]
pub enum ConfigError {
   #[error("{0} が設定されていません")]
   Missing(String),

   #[error("{name} の値 '{value}' が不正です: {reason}")]
   Invalid {
      name:   String,
      value:  String,
      reason: String,
   },

   #[error("{name} のパターン '{pattern}' が不正です: {source}")]
   Pattern {
      name:    &'static str,
      pattern: String,
      #[source]
      source:  PatternError,
   },
}

impl ConfigError {
   fn invalid(name: &str, value: &str, reason: impl ToString) -> Self {
      Self::Invalid {
         name:   name.to_string(),
         value:  value.to_string(),
         reason: reason.to_string(),
      }
   }
}

/// プロセス環境を参照する
fn process_env(name: &str) -> Option<String> {
   env::var(name).ok()
}

/// サーバーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
   /// バインドアドレス
   pub host: String,
   /// ポート番号
   pub port: u16,
}

impl ServerConfig {
   /// `<PREFIX>_HOST` / `<PREFIX>_PORT` から設定を読み込む
   pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
      Self::from_lookup(prefix, process_env)
   }

   pub fn from_lookup(prefix: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
      let host_var = format!("{prefix}_HOST");
      let port_var = format!("{prefix}_PORT");

      let host = lookup(&host_var).unwrap_or_else(|| "0.0.0.0".to_string());
      let raw_port = lookup(&port_var).ok_or_else(|| ConfigError::Missing(port_var.clone()))?;
      let port = raw_port
         .trim()
         .parse()
         .map_err(|e| ConfigError::invalid(&port_var, &raw_port, e))?;

      Ok(Self { host, port })
   }

   /// バインド先のソケットアドレス
   pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
      let raw = format!("{}:{}", self.host, self.port);
      raw.parse().map_err(|e| ConfigError::invalid("host", &self.host, e))
   }
}

/// 日付・時刻パターンの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConfig {
   pub date:      String,
   pub time:      String,
   pub date_time: String,
}

impl Default for FormatConfig {
   fn default() -> Self {
      Self {
         date:      DATE_FORMAT.to_string(),
         time:      TIME_FORMAT.to_string(),
         date_time: DATETIME_FORMAT.to_string(),
      }
   }
}

/// CORS の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
   /// 許可するオリジン。空ならすべて許可
   pub allowed_origins: Vec<String>,
   pub max_age:         Duration,
}

impl Default for CorsConfig {
   fn default() -> Self {
      Self {
         allowed_origins: Vec::new(),
         max_age:         DEFAULT_CORS_MAX_AGE,
      }
   }
}

/// シリアライズ方針全体の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
   pub formats:        FormatConfig,
   /// エラーページに転送するステータス（登録順）
   pub error_statuses: Vec<StatusCode>,
   pub cors:           CorsConfig,
}

impl Default for WebConfig {
   fn default() -> Self {
      Self {
         formats:        FormatConfig::default(),
         error_statuses: DEFAULT_ERROR_STATUSES.to_vec(),
         cors:           CorsConfig::default(),
      }
   }
}

impl WebConfig {
   /// 環境変数から設定を読み込む。未設定の項目は既定値
   pub fn from_env() -> Result<Self, ConfigError> {
      Self::from_lookup(process_env)
   }

   pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
      let defaults = Self::default();

      let formats = FormatConfig {
         date:      lookup(DATE_FORMAT_VAR).unwrap_or(defaults.formats.date),
         time:      lookup(TIME_FORMAT_VAR).unwrap_or(defaults.formats.time),
         date_time: lookup(DATETIME_FORMAT_VAR).unwrap_or(defaults.formats.date_time),
      };

      let error_statuses = match lookup(ERROR_PAGES_VAR) {
         Some(raw) => parse_statuses(&raw)?,
         None => defaults.error_statuses,
      };

      let allowed_origins = match lookup(CORS_ALLOWED_ORIGINS_VAR) {
         Some(raw) => parse_origins(&raw)?,
         None => defaults.cors.allowed_origins,
      };

      let max_age = match lookup(CORS_MAX_AGE_VAR) {
         Some(raw) => raw
            .trim()
            .parse()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::invalid(CORS_MAX_AGE_VAR, &raw, e))?,
         None => defaults.cors.max_age,
      };

      Ok(Self {
         formats,
         error_statuses,
         cors: CorsConfig {
            allowed_origins,
            max_age,
         },
      })
   }
}

/// `401,403,404` 形式のステータス列を解析する。空文字列なら転送しない
fn parse_statuses(raw: &str) -> Result<Vec<StatusCode>, ConfigError> {
   raw.split(',')
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(|s| {
         let code: u16 = s
            .parse()
            .map_err(|e| ConfigError::invalid(ERROR_PAGES_VAR, s, e))?;
         let status =
            StatusCode::from_u16(code).map_err(|e| ConfigError::invalid(ERROR_PAGES_VAR, s, e))?;
         if status.is_client_error() || status.is_server_error() {
            Ok(status)
         } else {
            Err(ConfigError::invalid(
               ERROR_PAGES_VAR,
               s,
               "4xx か 5xx のステータスのみ指定できます",
            ))
         }
      })
      .collect()
}

/// `*` はすべて許可（空リスト）、それ以外はカンマ区切りのオリジン列
///
/// 列の中に `*` を混ぜることはできない。
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
   if raw.trim() == "*" {
      return Ok(Vec::new());
   }
   raw.split(',')
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(|origin| {
         if origin == "*" {
            Err(ConfigError::invalid(
               CORS_ALLOWED_ORIGINS_VAR,
               raw,
               "`*` は単独でのみ指定できます",
            ))
         } else {
            Ok(origin.to_string())
         }
      })
      .collect()
}

#[cfg(test)]
mod tests {
   use std::collections::HashMap;

   use pretty_assertions::assert_eq;
   use rstest::rstest;

   use super::*;

   fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
      let map: HashMap<String, String> = pairs
         .iter()
         .map(|(k, v)| (k.to_string(), v.to_string()))
         .collect();
      move |name| map.get(name).cloned()
   }

   #[test]
   fn test_サーバー設定をプレフィックス付きで読み込む() {
      let config =
         ServerConfig::from_lookup("NOTICE", lookup_from(&[("NOTICE_HOST", "127.0.0.1"), ("NOTICE_PORT", "8081")]))
            .unwrap();

      assert_eq!(
         config,
         ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8081,
         }
      );
      assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8081");
   }

   #[test]
   fn test_ホスト未設定なら全インターフェース() {
      let config = ServerConfig::from_lookup("USER", lookup_from(&[("USER_PORT", "8082")])).unwrap();

      assert_eq!(config.host, "0.0.0.0");
   }

   #[test]
   fn test_ポート未設定はエラー() {
      let err = ServerConfig::from_lookup("USER", lookup_from(&[])).unwrap_err();

      assert_eq!(err.to_string(), "USER_PORT が設定されていません");
   }

   #[test]
   fn test_不正なポートはエラー() {
      let err = ServerConfig::from_lookup("USER", lookup_from(&[("USER_PORT", "http")])).unwrap_err();

      assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == "USER_PORT"));
   }

   #[test]
   fn test_未設定なら既定値() {
      let config = WebConfig::from_lookup(lookup_from(&[])).unwrap();

      assert_eq!(config, WebConfig::default());
      assert_eq!(config.formats.date, "yyyy-MM-dd");
      assert_eq!(config.formats.time, "HH:mm:ss");
      assert_eq!(config.formats.date_time, "yyyy-MM-dd HH:mm:ss");
      assert_eq!(
         config.error_statuses,
         vec![StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN, StatusCode::NOT_FOUND]
      );
      assert!(config.cors.allowed_origins.is_empty());
      assert_eq!(config.cors.max_age, Duration::from_secs(3600));
   }

   #[test]
   fn test_環境変数で上書きできる() {
      let config = WebConfig::from_lookup(lookup_from(&[
         (DATE_FORMAT_VAR, "dd/MM/yyyy"),
         (ERROR_PAGES_VAR, "404, 401"),
         (CORS_ALLOWED_ORIGINS_VAR, "https://a.example.com, https://b.example.com"),
         (CORS_MAX_AGE_VAR, "600"),
      ]))
      .unwrap();

      assert_eq!(config.formats.date, "dd/MM/yyyy");
      assert_eq!(config.formats.time, "HH:mm:ss");
      assert_eq!(config.error_statuses, vec![StatusCode::NOT_FOUND, StatusCode::UNAUTHORIZED]);
      assert_eq!(
         config.cors.allowed_origins,
         vec!["https://a.example.com".to_string(), "https://b.example.com".to_string()]
      );
      assert_eq!(config.cors.max_age, Duration::from_secs(600));
   }

   #[test]
   fn test_空のステータス列なら転送しない() {
      let config = WebConfig::from_lookup(lookup_from(&[(ERROR_PAGES_VAR, "")])).unwrap();

      assert!(config.error_statuses.is_empty());
   }

   #[rstest]
   #[case("200")]
   #[case("302")]
   #[case("abc")]
   #[case("1000")]
   fn test_不正なステータスはエラー(#[case] raw: &str) {
      let result = WebConfig::from_lookup(lookup_from(&[(ERROR_PAGES_VAR, raw)]));

      assert!(matches!(result, Err(ConfigError::Invalid { .. })));
   }

   #[test]
   fn test_オリジン列に混ざったアスタリスクはエラー() {
      let result = WebConfig::from_lookup(lookup_from(&[(
         CORS_ALLOWED_ORIGINS_VAR,
         "https://a.example.com, *",
      )]));

      assert!(matches!(
         result,
         Err(ConfigError::Invalid { ref name, .. }) if name == CORS_ALLOWED_ORIGINS_VAR
      ));
   }

   #[test]
   fn test_アスタリスクはすべてのオリジンを許可() {
      let config = WebConfig::from_lookup(lookup_from(&[(CORS_ALLOWED_ORIGINS_VAR, "*")])).unwrap();

      assert!(config.cors.allowed_origins.is_empty());
   }
}
