//! # JSON コーデック
//!
//! すべてのリクエスト・レスポンスボディに使う JSON のエンコード・デコード設定。
//!
//! ## 既定の挙動からの差分
//!
//! 1. **空値**: `None`（JSON の `null`）は `{}` として書き出す。フィールド単位の例外はない
//! 2. **日付・時刻**: [`Date`](temporal::Date) / [`Time`](temporal::Time) /
//!    [`DateTime`](temporal::DateTime) は設定されたパターンで文字列化する。
//!    エンコードとデコードで同じ [`TemporalPattern`] を使う
//!
//! ## 型ごとの規則の受け渡し
//!
//! serde の `Serialize` 実装は呼び出し元の設定を受け取れない。
//! そこで [`JsonCodec`] はエンコード・デコードの間だけ task-local に
//! [`FormatRules`] を設定し、日付型はそこからパターンを取り出す。
//! コーデックの外（素の `serde_json`）では chrono 既定の ISO 8601 表現になる。

pub mod pattern;
pub mod temporal;

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;

pub use self::{
   pattern::{PatternError, Temporal, TemporalKind, TemporalParseError, TemporalPattern},
   temporal::{Date, DateTime, Time},
};
use crate::config::{ConfigError, FormatConfig};

tokio::task_local! {
   static ACTIVE_RULES: Arc<FormatRules>;
}

/// 現在エンコード・デコード中のコーデックの規則で `f` を評価する
///
/// コーデックの外では `None` を返す。
pub(crate) fn with_active_rules<R>(f: impl FnOnce(&FormatRules) -> R) -> Option<R> {
   ACTIVE_RULES.try_with(|rules| f(rules)).ok()
}

/// 日付・時刻型ごとのエンコード・デコード規則
#[derive(Debug, Clone)]
pub struct FormatRules {
   pub date:      TemporalPattern<NaiveDate>,
   pub time:      TemporalPattern<NaiveTime>,
   pub date_time: TemporalPattern<NaiveDateTime>,
}

impl FormatRules {
   /// 設定されたパターン文字列をコンパイルする
   ///
   /// どれか 1 つでも不正ならエラー。起動処理はこのエラーで中断する。
   pub fn compile(config: &FormatConfig) -> Result<Self, ConfigError> {
      Ok(Self {
         date:      compile_named("DATE_FORMAT", &config.date)?,
         time:      compile_named("TIME_FORMAT", &config.time)?,
         date_time: compile_named("DATETIME_FORMAT", &config.date_time)?,
      })
   }
}

fn compile_named<T: Temporal>(name: &'static str, pattern: &str) -> Result<TemporalPattern<T>, ConfigError> {
   TemporalPattern::compile(pattern).map_err(|source| ConfigError::Pattern {
      name,
      pattern: pattern.to_string(),
      source,
   })
}

/// 空値の書き出し方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullEncoding {
   /// `{}` として書き出す
   #[default]
   EmptyObject,
   /// JSON の `null` のまま書き出す
   Literal,
}

impl NullEncoding {
   /// 値ツリー全体に規則を適用する
   pub fn apply(self, value: Value) -> Value {
      match self {
         Self::EmptyObject => replace_nulls(value),
         Self::Literal => value,
      }
   }
}

fn replace_nulls(value: Value) -> Value {
   match value {
      Value::Null => Value::Object(Map::new()),
      Value::Array(items) => Value::Array(items.into_iter().map(replace_nulls).collect()),
      Value::Object(members) => Value::Object(
         members
            .into_iter()
            .map(|(key, member)| (key, replace_nulls(member)))
            .collect(),
      ),
      other => other,
   }
}

/// コーデックのエラー
#[derive(Debug, Error)]
pub enum CodecError {
   #[error("シリアライズに失敗しました: {0}")]
   Serialize(#[source] serde_json::Error),

   #[error("JSON として解析できません: {0}")]
   Syntax(#[source] serde_json::Error),

   #[error("デシリアライズに失敗しました: {0}")]
   Deserialize(#[source] serde_json::Error),

   #[error("コンバーター {0} が値を生成しませんでした")]
   NoValue(String),
}

/// 設定済みの JSON コーデック
///
/// 起動時に一度だけ構築し、`Arc` で共有する。構築後は変更されない。
#[derive(Debug, Clone)]
pub struct JsonCodec {
   rules: Arc<FormatRules>,
   nulls: NullEncoding,
}

impl JsonCodec {
   /// コンバーターチェーン上の名前
   pub const NAME: &'static str = "mekatok-json";

   pub fn new(rules: FormatRules) -> Self {
      Self {
         rules: Arc::new(rules),
         nulls: NullEncoding::EmptyObject,
      }
   }

   /// パターン設定からコーデックを構築する
   pub fn from_config(config: &FormatConfig) -> Result<Self, ConfigError> {
      FormatRules::compile(config).map(Self::new)
   }

   pub fn rules(&self) -> &FormatRules {
      &self.rules
   }

   pub fn null_encoding(&self) -> NullEncoding {
      self.nulls
   }

   /// `serialize` をこのコーデックの規則の下で評価し、空値規則を適用する
   pub(crate) fn encode_value(
      &self,
      serialize: impl FnOnce() -> Result<Value, serde_json::Error>,
   ) -> Result<Value, CodecError> {
      let value = ACTIVE_RULES
         .sync_scope(Arc::clone(&self.rules), serialize)
         .map_err(CodecError::Serialize)?;
      Ok(self.nulls.apply(value))
   }

   /// `deserialize` をこのコーデックの規則の下で評価する
   pub(crate) fn decode_value<R>(
      &self,
      deserialize: impl FnOnce() -> Result<R, serde_json::Error>,
   ) -> Result<R, CodecError> {
      ACTIVE_RULES
         .sync_scope(Arc::clone(&self.rules), deserialize)
         .map_err(CodecError::Deserialize)
   }

   /// 値を JSON ツリーに変換する
   pub fn to_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value, CodecError> {
      self.encode_value(|| serde_json::to_value(value))
   }

   /// 値を JSON バイト列に変換する
   pub fn to_vec<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
      let tree = self.to_value(value)?;
      serde_json::to_vec(&tree).map_err(CodecError::Serialize)
   }

   /// JSON ツリーから値を復元する
   pub fn from_value<T: DeserializeOwned>(&self, value: Value) -> Result<T, CodecError> {
      self.decode_value(|| serde_json::from_value(value))
   }

   /// JSON バイト列から値を復元する
   pub fn from_slice<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
      let tree: Value = serde_json::from_slice(bytes).map_err(CodecError::Syntax)?;
      self.from_value(tree)
   }
}

#[cfg(test)]
mod tests {
   use chrono::{NaiveDate, NaiveTime};
   use pretty_assertions::assert_eq;
   use serde::Deserialize;
   use serde_json::json;

   use super::*;

   #[derive(Debug, PartialEq, Serialize, Deserialize)]
   struct Notice {
      title:       String,
      publish_on:  Date,
      expires_on:  Option<Date>,
      remind_at:   Time,
      created_at:  DateTime,
      attachments: Vec<Option<String>>,
      author:      Option<Author>,
   }

   #[derive(Debug, PartialEq, Serialize, Deserialize)]
   struct Author {
      name:  String,
      email: Option<String>,
   }

   fn codec() -> JsonCodec {
      JsonCodec::from_config(&FormatConfig::default()).unwrap()
   }

   fn sample() -> Notice {
      let day = NaiveDate::from_ymd_opt(2022, 2, 4).unwrap();
      Notice {
         title:       "定期メンテナンス".to_string(),
         publish_on:  Date(day),
         expires_on:  None,
         remind_at:   Time(NaiveTime::from_hms_opt(9, 30, 0).unwrap()),
         created_at:  DateTime(day.and_hms_opt(18, 5, 7).unwrap()),
         attachments: vec![Some("a.pdf".to_string()), None],
         author:      Some(Author {
            name:  "guokai".to_string(),
            email: None,
         }),
      }
   }

   #[test]
   fn test_空値はすべての階層で空オブジェクトになる() {
      let value = codec().to_value(&sample()).unwrap();

      assert_eq!(value["expires_on"], json!({}));
      assert_eq!(value["attachments"], json!(["a.pdf", {}]));
      assert_eq!(value["author"]["email"], json!({}));
   }

   #[test]
   fn test_出力にnullリテラルが含まれない() {
      let bytes = codec().to_vec(&sample()).unwrap();
      let text = String::from_utf8(bytes).unwrap();

      assert!(!text.contains("null"), "null が含まれている: {text}");
   }

   #[test]
   fn test_日付と時刻は設定されたパターンで書き出される() {
      let value = codec().to_value(&sample()).unwrap();

      assert_eq!(value["publish_on"], json!("2022-02-04"));
      assert_eq!(value["remind_at"], json!("09:30:00"));
      assert_eq!(value["created_at"], json!("2022-02-04 18:05:07"));
   }

   #[test]
   fn test_フィールドは宣言順で書き出される() {
      let bytes = codec().to_vec(&sample()).unwrap();
      let text = String::from_utf8(bytes).unwrap();

      assert!(text.starts_with(r#"{"title":"定期メンテナンス","publish_on":"2022-02-04""#));
   }

   #[test]
   fn test_トップレベルのnoneも空オブジェクトになる() {
      let value = codec().to_value(&Option::<String>::None).unwrap();

      assert_eq!(value, json!({}));
   }

   #[test]
   fn test_設定されたパターンでデコードできる() {
      let body = br#"{
         "title": "t",
         "publish_on": "2022-02-04",
         "expires_on": null,
         "remind_at": "09:30:00",
         "created_at": "2022-02-04 18:05:07",
         "attachments": [],
         "author": null
      }"#;

      let notice: Notice = codec().from_slice(body).unwrap();

      assert_eq!(notice.publish_on, sample().publish_on);
      assert_eq!(notice.created_at, sample().created_at);
      assert_eq!(notice.expires_on, None);
   }

   #[test]
   fn test_パターンに一致しない日付はデコードエラー() {
      let result: Result<Date, _> = codec().from_value(json!("04/02/2022"));

      assert!(matches!(result, Err(CodecError::Deserialize(_))));
   }

   #[test]
   fn test_壊れたjsonは構文エラー() {
      let result: Result<Date, _> = codec().from_slice(b"{");

      assert!(matches!(result, Err(CodecError::Syntax(_))));
   }

   #[test]
   fn test_カスタムパターンを使える() {
      let config = FormatConfig {
         date:      "dd/MM/yyyy".to_string(),
         time:      "h:mm a".to_string(),
         date_time: "dd/MM/yyyy HH:mm".to_string(),
      };
      let codec = JsonCodec::from_config(&config).unwrap();
      let day = NaiveDate::from_ymd_opt(2022, 2, 4).unwrap();

      assert_eq!(codec.to_value(&Date(day)).unwrap(), json!("04/02/2022"));
      assert_eq!(
         codec.to_value(&Time(NaiveTime::from_hms_opt(15, 0, 0).unwrap())).unwrap(),
         json!("3:00 PM")
      );
      assert_eq!(codec.from_value::<Date>(json!("04/02/2022")).unwrap(), Date(day));
   }

   #[test]
   fn test_不正なパターンは設定名付きのエラーになる() {
      let config = FormatConfig {
         time: "HH:mm:ss.SS".to_string(),
         ..FormatConfig::default()
      };

      let err = JsonCodec::from_config(&config).unwrap_err();

      assert_eq!(
         err.to_string(),
         "TIME_FORMAT のパターン 'HH:mm:ss.SS' が不正です: パターン文字 'S' の 2 文字連続には対応していません"
      );
   }

   #[test]
   fn test_literal指定ならnullのまま書き出す() {
      assert_eq!(NullEncoding::Literal.apply(json!({"a": null})), json!({"a": null}));
      assert_eq!(NullEncoding::EmptyObject.apply(json!({"a": null})), json!({"a": {}}));
   }
}
