//! # Bookshelf インフラ層
//!
//! PostgreSQL との接続・永続化を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プールとトランザクション管理
//! - **リポジトリ実装**: エンティティごとの CRUD と、関係テーブル駆動の整合性チェック
//! - **テスト支援**: `test-utils` feature でインメモリ実装を提供
//!
//! ## 依存関係
//!
//! ```text
//! book-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリ実装
//! - `mock` - テスト用インメモリ実装（`test-utils` feature）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use bookshelf_infra::{db, repository::PostgresBookRepository};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = db::create_pool("postgres://localhost/bookshelf", 10).await?;
//!     let books = PostgresBookRepository::new(pool.clone());
//!
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
