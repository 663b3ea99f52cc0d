//! # Bookshelf ドメイン層
//!
//! 書籍カタログのドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: DB 採番の整数 ID を持つオブジェクト（例: Book, Author）
//! - **値オブジェクト**: 生成時に検証される不変オブジェクト（例: Isbn,
//!   Rating）
//! - **整合性メタデータ**: エンティティ間の関係と削除ポリシーを 1 つの表で保持
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! book-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB）には一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`integrity`] - 関係テーブルと一意キーの正規化
//! - [`country`], [`author`], [`category`], [`book`], [`reviewer`],
//!   [`review`] - 各エンティティ
//!
//! ## 使用例
//!
//! ```rust
//! use bookshelf_domain::{DomainError, country::NewCountry};
//!
//! let draft = NewCountry::new("France").unwrap();
//! assert_eq!(draft.name.as_str(), "France");
//!
//! let error = DomainError::NotFound {
//!     entity_type: "国",
//!     id:          "999".to_string(),
//! };
//! assert_eq!(error.to_string(), "国 が見つかりません: 999");
//! ```

#[macro_use]
mod macros;

pub mod author;
pub mod book;
pub mod category;
pub mod country;
pub mod error;
pub mod integrity;
pub mod review;
pub mod reviewer;

pub use error::DomainError;
