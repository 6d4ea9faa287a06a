//! # ボディコンバーター
//!
//! ハンドラーの戻り値をバイト列に変換するコンバーターの順序付きリスト。
//! 先頭から順にメディアタイプを扱えるかを問い合わせ、最初に応じたものが変換する。
//!
//! 既定のチェーンは [`PlainJsonConverter`] のみ。
//! [`WebPolicy`](crate::policy::WebPolicy) は設定済みの
//! [`JsonCodec`] を [`ConverterChain::insert_first`] で先頭に挿入する。

use std::{fmt, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::codec::{CodecError, JsonCodec};

/// JSON のメディアタイプ
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// JSON として扱うメディアタイプか
///
/// `application/json` と `application/*+json` を受け付ける。
/// パラメータ（`; charset=utf-8` など）は無視し、大文字小文字は区別しない。
pub fn is_json_media_type(media_type: &str) -> bool {
   let essence = media_type
      .split(';')
      .next()
      .unwrap_or_default()
      .trim()
      .to_ascii_lowercase();

   match essence.split_once('/') {
      Some(("application", "json")) => true,
      Some(("application", subtype)) => subtype.ends_with("+json"),
      _ => false,
   }
}

/// ボディの変換を担うコンバーター
///
/// 値の型に依存しないよう、シリアライズ処理はクロージャとして受け取る。
/// 型付きの入口は `dyn BodyConverter` の [`write`](#method.write) /
/// [`read`](#method.read)。
pub trait BodyConverter: Send + Sync + fmt::Debug {
   /// ログとデバッグ用の名前
   fn name(&self) -> &str;

   /// 書き出すボディの `Content-Type`
   fn media_type(&self) -> &str {
      JSON_MEDIA_TYPE
   }

   fn supports(&self, media_type: &str) -> bool {
      is_json_media_type(media_type)
   }

   /// `serialize` が生成した JSON ツリーをバイト列にする
   fn encode(
      &self,
      serialize: &mut dyn FnMut() -> Result<Value, serde_json::Error>,
   ) -> Result<Vec<u8>, CodecError>;

   /// バイト列を JSON ツリーとして解析し、`deserialize` に渡す
   fn decode(
      &self,
      bytes: &[u8],
      deserialize: &mut dyn FnMut(Value) -> Result<(), serde_json::Error>,
   ) -> Result<(), CodecError>;
}

impl dyn BodyConverter {
   /// 値をボディに変換する
   pub fn write<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
      self.encode(&mut || serde_json::to_value(value))
   }

   /// ボディから値を復元する
   pub fn read<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
      let mut decoded = None;
      self.decode(bytes, &mut |value| {
         decoded = Some(serde_json::from_value::<T>(value)?);
         Ok(())
      })?;
      decoded.ok_or_else(|| CodecError::NoValue(self.name().to_string()))
   }
}

/// serde_json の既定の挙動のままのコンバーター
///
/// 空値は `null`、日付・時刻は ISO 8601 で書き出す。
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainJsonConverter;

impl PlainJsonConverter {
   pub const NAME: &'static str = "plain-json";
}

impl BodyConverter for PlainJsonConverter {
   fn name(&self) -> &str {
      Self::NAME
   }

   fn encode(
      &self,
      serialize: &mut dyn FnMut() -> Result<Value, serde_json::Error>,
   ) -> Result<Vec<u8>, CodecError> {
      let tree = serialize().map_err(CodecError::Serialize)?;
      serde_json::to_vec(&tree).map_err(CodecError::Serialize)
   }

   fn decode(
      &self,
      bytes: &[u8],
      deserialize: &mut dyn FnMut(Value) -> Result<(), serde_json::Error>,
   ) -> Result<(), CodecError> {
      let tree: Value = serde_json::from_slice(bytes).map_err(CodecError::Syntax)?;
      deserialize(tree).map_err(CodecError::Deserialize)
   }
}

impl BodyConverter for JsonCodec {
   fn name(&self) -> &str {
      Self::NAME
   }

   fn encode(
      &self,
      serialize: &mut dyn FnMut() -> Result<Value, serde_json::Error>,
   ) -> Result<Vec<u8>, CodecError> {
      let tree = self.encode_value(serialize)?;
      serde_json::to_vec(&tree).map_err(CodecError::Serialize)
   }

   fn decode(
      &self,
      bytes: &[u8],
      deserialize: &mut dyn FnMut(Value) -> Result<(), serde_json::Error>,
   ) -> Result<(), CodecError> {
      let tree: Value = serde_json::from_slice(bytes).map_err(CodecError::Syntax)?;
      self.decode_value(|| deserialize(tree))
   }
}

/// 順序付きのコンバーターリスト
#[derive(Debug, Clone)]
pub struct ConverterChain {
   converters: Vec<Arc<dyn BodyConverter>>,
}

impl Default for ConverterChain {
   /// [`PlainJsonConverter`] だけを持つチェーン
   fn default() -> Self {
      Self {
         converters: vec![Arc::new(PlainJsonConverter)],
      }
   }
}

impl ConverterChain {
   /// 空のチェーン
   pub fn empty() -> Self {
      Self {
         converters: Vec::new(),
      }
   }

   /// 末尾に追加する
   pub fn push(&mut self, converter: impl BodyConverter + 'static) {
      self.converters.push(Arc::new(converter));
   }

   /// 先頭に挿入する。既存のコンバーターより先に問い合わせられる
   pub fn insert_first(&mut self, converter: impl BodyConverter + 'static) {
      self.converters.insert(0, Arc::new(converter));
   }

   /// メディアタイプを扱える最初のコンバーター
   pub fn select(&self, media_type: &str) -> Option<Arc<dyn BodyConverter>> {
      self.converters
         .iter()
         .find(|converter| converter.supports(media_type))
         .cloned()
   }

   /// 問い合わせ順のコンバーター名
   pub fn names(&self) -> Vec<&str> {
      self.converters.iter().map(|converter| converter.name()).collect()
   }

   pub fn len(&self) -> usize {
      self.converters.len()
   }

   pub fn is_empty(&self) -> bool {
      self.converters.is_empty()
   }
}
