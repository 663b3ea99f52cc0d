//! # リポジトリ実装
//!
//! エンティティごとの永続化と、参照整合性の汎用チェックを提供する。
//!
//! ## 設計方針
//!
//! - **トレイト + PostgreSQL 実装**: ユースケース層はトレイトにのみ依存する
//! - **明示的なメソッド**: 関連データは専用の検索メソッドで取得し、遅延ロードはしない
//! - **書き込みは TxContext 必須**: 複数テーブルにまたがる書き込みを 1 トランザクションにまとめる
//! - **テスタビリティ**: トレイト経由でモック可能な設計

pub mod author_repository;
pub mod book_repository;
pub mod category_repository;
pub mod country_repository;
pub mod integrity_repository;
pub mod review_repository;
pub mod reviewer_repository;

pub use author_repository::{AuthorRepository, PostgresAuthorRepository};
pub use book_repository::{BookRepository, PostgresBookRepository};
pub use category_repository::{CategoryRepository, PostgresCategoryRepository};
pub use country_repository::{CountryRepository, PostgresCountryRepository};
pub use integrity_repository::{IntegrityRepository, PostgresIntegrityRepository};
pub use review_repository::{PostgresReviewRepository, ReviewRepository};
pub use reviewer_repository::{PostgresReviewerRepository, ReviewerRepository};
