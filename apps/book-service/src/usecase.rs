//! # ユースケース層
//!
//! Book Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリを `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約
//! - **参照整合性は 1 か所**: 存在確認・一意性チェック・削除ガード・カスケード削除は
//!   [`IntegrityGuard`] が関係テーブルを引いて処理し、各ユースケースは呼び出すだけ
//!
//! ## 検証の順序
//!
//! 書き込みを伴う操作は、すべての検証を書き込み前に済ませる。
//!
//! 1. 入力値（400）
//! 2. 対象の存在（404）
//! 3. 一意項目の重複（422）
//! 4. 参照先の存在（404）
//!
//! 書籍だけは関連リストの空チェック（400）と ISBN の重複（422）を参照先より先に行う。

pub mod author;
pub mod book;
pub mod category;
pub mod country;
pub mod integrity;
pub mod review;
pub mod reviewer;

pub use author::AuthorUseCaseImpl;
pub use book::BookUseCaseImpl;
use bookshelf_domain::integrity::EntityKind;
use bookshelf_infra::InfraError;
pub use category::CategoryUseCaseImpl;
pub use country::CountryUseCaseImpl;
pub use integrity::{CascadeCount, DeletionSummary, IntegrityGuard};
pub use review::ReviewUseCaseImpl;
pub use reviewer::ReviewerUseCaseImpl;

use crate::error::CoreError;

/// リポジトリの `Result<Option<T>, InfraError>` を `Result<T, CoreError>` に変換する
///
/// `None` は [`CoreError::NotFound`]、`InfraError` は [`CoreError::Database`] になる。
///
/// ```ignore
/// let country = self.countries.find_by_id(id).await
///     .or_not_found(EntityKind::Country, id)?;
/// ```
pub(crate) trait FindResultExt<T> {
    fn or_not_found(self, kind: EntityKind, id: impl std::fmt::Display) -> Result<T, CoreError>;
}

impl<T> FindResultExt<T> for Result<Option<T>, InfraError> {
    fn or_not_found(self, kind: EntityKind, id: impl std::fmt::Display) -> Result<T, CoreError> {
        self?.ok_or_else(|| not_found(kind, id))
    }
}

/// 404 を組み立てる
pub(crate) fn not_found(kind: EntityKind, id: impl std::fmt::Display) -> CoreError {
    CoreError::NotFound(format!("{}が見つかりません: {id}", kind.label()))
}
