//! # CRUD ケイパビリティ
//!
//! 単一テーブルに対する作成・取得・更新・削除を、独立したトレイトとして定義する。
//!
//! ## 設計方針
//!
//! - **ケイパビリティ単位**: 読み取り専用のルートは [`RetrieveSupport`] だけを実装すればよい
//! - **合成は任意**: 4 つすべてを実装した型は自動的に [`CrudSupport`] になる
//! - **トレイトオブジェクト対応**: `async_trait` により `Arc<dyn RetrieveSupport<T>>` として保持できる
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use mekatok_core::route::RetrieveSupport;
//!
//! struct NoticeState {
//!     notices: Arc<dyn RetrieveSupport<Notice>>,
//! }
//! ```

use async_trait::async_trait;

use crate::{error::StoreError, model::Table};

/// レコードの作成
#[async_trait]
pub trait CreateSupport<T: Table>: Send + Sync {
   /// レコードを作成し、保存された値を返す
   ///
   /// 同じ主キーのレコードが存在する場合は [`StoreError::Duplicate`] を返す。
   async fn create(&self, record: T) -> Result<T, StoreError>;
}

/// レコードの取得
#[async_trait]
pub trait RetrieveSupport<T: Table>: Send + Sync {
   /// 主キーでレコードを検索する
   async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>, StoreError>;

   /// すべてのレコードを取得する
   async fn find_all(&self) -> Result<Vec<T>, StoreError>;
}

/// レコードの更新
#[async_trait]
pub trait UpdateSupport<T: Table>: Send + Sync {
   /// 主キーが一致するレコードを置き換える
   ///
   /// 対象が存在しない場合は [`StoreError::NotFound`] を返す。
   async fn update(&self, record: T) -> Result<T, StoreError>;
}

/// レコードの削除
#[async_trait]
pub trait DeleteSupport<T: Table>: Send + Sync {
   /// 主キーでレコードを削除する
   ///
   /// 対象が存在しない場合は [`StoreError::NotFound`] を返す。
   async fn delete(&self, id: &T::Id) -> Result<(), StoreError>;
}

/// 4 つのケイパビリティをすべて備えた型
///
/// 個別に実装する必要はない。ブランケット実装により自動的に付与される。
pub trait CrudSupport<T: Table>:
   CreateSupport<T> + RetrieveSupport<T> + UpdateSupport<T> + DeleteSupport<T>
{
}

impl<T, S> CrudSupport<T> for S
where
   T: Table,
   S: CreateSupport<T> + RetrieveSupport<T> + UpdateSupport<T> + DeleteSupport<T>,
{
}
