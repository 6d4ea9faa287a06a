//! # HTTP リクエストハンドラ
//!
//! どのサービスにも載る共通ハンドラ。
//!
//! ```text
//! handler.rs            # 親モジュール（re-export）
//! └── handler/
//!     ├── health.rs     # ヘルスチェック
//!     └── error_page.rs # エラーページとフォールバック
//! ```

pub mod error_page;
pub mod health;

pub use error_page::{error_page_routes, fallback_not_found, render_error_page};
pub use health::health_check;
