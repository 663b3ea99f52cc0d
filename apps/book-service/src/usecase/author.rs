//! 著者ユースケース

use std::sync::Arc;

use bookshelf_domain::{
    author::{Author, AuthorId, NewAuthor},
    book::{Book, BookId},
    country::CountryId,
    integrity::EntityKind,
};
use bookshelf_infra::{
    db::TransactionManager,
    repository::{AuthorRepository, BookRepository},
};
use bookshelf_shared::{event_log::event, log_business_event};

use crate::{
    error::CoreError,
    usecase::{DeletionSummary, FindResultExt, IntegrityGuard},
};

/// 著者の作成・更新の入力
pub struct AuthorInput {
    pub first_name: String,
    pub last_name:  String,
    pub country_id: CountryId,
}

/// 著者ユースケース
pub struct AuthorUseCaseImpl {
    authors:    Arc<dyn AuthorRepository>,
    books:      Arc<dyn BookRepository>,
    guard:      IntegrityGuard,
    tx_manager: Arc<dyn TransactionManager>,
}

impl AuthorUseCaseImpl {
    pub fn new(
        authors: Arc<dyn AuthorRepository>,
        books: Arc<dyn BookRepository>,
        guard: IntegrityGuard,
        tx_manager: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            authors,
            books,
            guard,
            tx_manager,
        }
    }

    pub async fn list_authors(&self) -> Result<Vec<Author>, CoreError> {
        Ok(self.authors.find_all().await?)
    }

    pub async fn get_author(&self, id: AuthorId) -> Result<Author, CoreError> {
        self.authors
            .find_by_id(id)
            .await
            .or_not_found(EntityKind::Author, id)
    }

    /// 著者の書籍一覧
    pub async fn list_books_of(&self, id: AuthorId) -> Result<Vec<Book>, CoreError> {
        self.guard
            .ensure_exists(EntityKind::Author, id.as_i32())
            .await?;
        Ok(self.books.find_by_author(id).await?)
    }

    /// 書籍の著者一覧
    pub async fn list_authors_of_book(&self, book_id: BookId) -> Result<Vec<Author>, CoreError> {
        self.guard
            .ensure_exists(EntityKind::Book, book_id.as_i32())
            .await?;
        Ok(self.authors.find_by_book(book_id).await?)
    }

    /// 著者を作成する
    ///
    /// 所属する国が存在しなければ 404。
    pub async fn create_author(&self, input: AuthorInput) -> Result<Author, CoreError> {
        let draft = NewAuthor::new(input.first_name, input.last_name, input.country_id)?;
        self.guard
            .ensure_exists(EntityKind::Country, draft.country_id.as_i32())
            .await?;

        let mut tx = self.tx_manager.begin().await?;
        let author = self.authors.insert(&mut tx, &draft).await?;
        tx.commit().await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::AUTHOR_CREATED,
            event.entity_type = event::entity_type::AUTHOR,
            event.entity_id = %author.id(),
            event.result = event::result::SUCCESS,
            "著者を作成しました"
        );

        Ok(author)
    }

    /// 著者を更新する（全項目の置き換え）
    ///
    /// 更新対象の著者、所属する国の順に存在を確認する。
    pub async fn update_author(
        &self,
        id: AuthorId,
        input: AuthorInput,
    ) -> Result<Author, CoreError> {
        let draft = NewAuthor::new(input.first_name, input.last_name, input.country_id)?;
        let existing = self.get_author(id).await?;
        self.guard
            .ensure_exists(EntityKind::Country, draft.country_id.as_i32())
            .await?;

        let author = existing.replaced(draft);
        let mut tx = self.tx_manager.begin().await?;
        self.authors.update(&mut tx, &author).await?;
        tx.commit().await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::AUTHOR_UPDATED,
            event.entity_type = event::entity_type::AUTHOR,
            event.entity_id = %id,
            event.result = event::result::SUCCESS,
            "著者を更新しました"
        );

        Ok(author)
    }

    /// 著者を削除する
    ///
    /// 書籍との関連行も同じトランザクションで削除する。書籍本体は残る。
    pub async fn delete_author(&self, id: AuthorId) -> Result<DeletionSummary, CoreError> {
        let summary = self.guard.delete(EntityKind::Author, id.as_i32()).await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::AUTHOR_DELETED,
            event.entity_type = event::entity_type::AUTHOR,
            event.entity_id = %id,
            event.result = event::result::SUCCESS,
            "著者を削除しました"
        );

        Ok(summary)
    }
}
