//! # テーブルモデル
//!
//! 単一テーブルにマッピングされるエンティティの共通インターフェース。

use std::{fmt, hash::Hash};

/// 単一テーブルに永続化されるエンティティ
///
/// CRUD ケイパビリティ（[`crate::route::support`]）の型パラメータとして使う。
/// 主キーの型と、所属するテーブル名を持つ。
pub trait Table: Clone + Send + Sync + 'static {
   /// 主キーの型
   type Id: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

   /// テーブル名
   const TABLE_NAME: &'static str;

   /// このレコードの主キー
   fn id(&self) -> &Self::Id;
}
