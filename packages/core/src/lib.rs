//! # Mekatok コア
//!
//! プラットフォーム全体で共有される定数とモデル、
//! 単一テーブル向けの CRUD ケイパビリティを提供する。
//!
//! ## モジュール構成
//!
//! - [`constant`] - 日付・時刻フォーマットなどのプロセス共通定数
//! - [`model`] - テーブルにマッピングされるエンティティの共通トレイト
//! - [`route`] - ルート実装が選択的に実装する CRUD ケイパビリティ
//! - [`error`] - ストレージ操作のエラー定義

pub mod constant;
pub mod error;
pub mod model;
pub mod route;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::StoreError;
pub use model::Table;
