//! # ストレージエラー
//!
//! CRUD ケイパビリティの実装が返すエラー。

use thiserror::Error;

/// CRUD 操作で発生するエラー
#[derive(Debug, Error)]
pub enum StoreError {
   /// 指定した主キーのレコードが存在しない
   #[error("{table} にレコードが存在しません: {id}")]
   NotFound { table: &'static str, id: String },

   /// 同じ主キーのレコードが既に存在する
   #[error("{table} にレコードが既に存在します: {id}")]
   Duplicate { table: &'static str, id: String },

   /// バックエンド固有のエラー
   #[error("ストレージエラー: {0}")]
   Backend(String),
}

impl StoreError {
   /// レコード未存在エラーを作成する
   pub fn not_found(table: &'static str, id: impl ToString) -> Self {
      Self::NotFound {
         table,
         id: id.to_string(),
      }
   }

   /// 主キー重複エラーを作成する
   pub fn duplicate(table: &'static str, id: impl ToString) -> Self {
      Self::Duplicate {
         table,
         id: id.to_string(),
      }
   }
}
