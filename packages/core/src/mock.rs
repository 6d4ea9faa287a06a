//! # テスト用インメモリテーブル
//!
//! CRUD ケイパビリティをすべて実装したインメモリストア。
//! `test-utils` feature を有効にすることで、他クレートのテストからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! mekatok-core = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
   error::StoreError,
   model::Table,
   route::{CreateSupport, DeleteSupport, RetrieveSupport, UpdateSupport},
};

/// 挿入順を保持するインメモリテーブル
#[derive(Clone)]
pub struct InMemoryTable<T: Table> {
   records: Arc<Mutex<Vec<T>>>,
}

impl<T: Table> InMemoryTable<T> {
   pub fn new() -> Self {
      Self {
         records: Arc::new(Mutex::new(Vec::new())),
      }
   }

   pub fn len(&self) -> usize {
      self.records.lock().unwrap().len()
   }

   pub fn is_empty(&self) -> bool {
      self.len() == 0
   }
}

impl<T: Table> Default for InMemoryTable<T> {
   fn default() -> Self {
      Self::new()
   }
}

#[async_trait]
impl<T: Table> CreateSupport<T> for InMemoryTable<T> {
   async fn create(&self, record: T) -> Result<T, StoreError> {
      let mut records = self.records.lock().unwrap();
      if records.iter().any(|r| r.id() == record.id()) {
         return Err(StoreError::duplicate(T::TABLE_NAME, record.id()));
      }
      records.push(record.clone());
      Ok(record)
   }
}

#[async_trait]
impl<T: Table> RetrieveSupport<T> for InMemoryTable<T> {
   async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>, StoreError> {
      let records = self.records.lock().unwrap();
      Ok(records.iter().find(|r| r.id() == id).cloned())
   }

   async fn find_all(&self) -> Result<Vec<T>, StoreError> {
      Ok(self.records.lock().unwrap().clone())
   }
}

#[async_trait]
impl<T: Table> UpdateSupport<T> for InMemoryTable<T> {
   async fn update(&self, record: T) -> Result<T, StoreError> {
      let mut records = self.records.lock().unwrap();
      let Some(slot) = records.iter_mut().find(|r| r.id() == record.id()) else {
         return Err(StoreError::not_found(T::TABLE_NAME, record.id()));
      };
      *slot = record.clone();
      Ok(record)
   }
}

#[async_trait]
impl<T: Table> DeleteSupport<T> for InMemoryTable<T> {
   async fn delete(&self, id: &T::Id) -> Result<(), StoreError> {
      let mut records = self.records.lock().unwrap();
      let before = records.len();
      records.retain(|r| r.id() != id);
      if records.len() == before {
         return Err(StoreError::not_found(T::TABLE_NAME, id));
      }
      Ok(())
   }
}
