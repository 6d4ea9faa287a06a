//! # ルートサポート
//!
//! ルート（HTTP ハンドラ群）が背後のストレージに対して要求する操作の契約。
//!
//! ```text
//! route.rs
//! └── route/
//!     └── support.rs   # Create / Retrieve / Update / Delete ケイパビリティ
//! ```

pub mod support;

pub use support::{CreateSupport, CrudSupport, DeleteSupport, RetrieveSupport, UpdateSupport};
