//! 書籍ユースケース
//!
//! 書籍本体と著者・カテゴリの関連行は 1 つのトランザクションで書き込む。
//! 関連行は差分ではなく、送られてきたリストで毎回置き換える。

use std::sync::Arc;

use bookshelf_domain::{
    author::AuthorId,
    book::{Book, BookAssociations, BookId, BookRating, NewBook},
    category::CategoryId,
    integrity::EntityKind,
};
use bookshelf_infra::{db::TransactionManager, repository::BookRepository};
use bookshelf_shared::{event_log::event, log_business_event};
use chrono::NaiveDate;

use crate::{
    error::CoreError,
    usecase::{DeletionSummary, FindResultExt, IntegrityGuard},
};

/// 書籍の作成・更新の入力
pub struct BookInput {
    pub isbn:           String,
    pub title:          String,
    pub date_published: Option<NaiveDate>,
    pub author_ids:     Vec<AuthorId>,
    pub category_ids:   Vec<CategoryId>,
}

/// 検証済みの書籍入力
struct ValidatedBook {
    draft:        NewBook,
    associations: BookAssociations,
}

impl TryFrom<BookInput> for ValidatedBook {
    type Error = CoreError;

    fn try_from(input: BookInput) -> Result<Self, Self::Error> {
        Ok(Self {
            draft:        NewBook::new(input.isbn, input.title, input.date_published)?,
            associations: BookAssociations::new(input.author_ids, input.category_ids)?,
        })
    }
}

/// 書籍ユースケース
pub struct BookUseCaseImpl {
    books:      Arc<dyn BookRepository>,
    guard:      IntegrityGuard,
    tx_manager: Arc<dyn TransactionManager>,
}

impl BookUseCaseImpl {
    pub fn new(
        books: Arc<dyn BookRepository>,
        guard: IntegrityGuard,
        tx_manager: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            books,
            guard,
            tx_manager,
        }
    }

    pub async fn list_books(&self) -> Result<Vec<Book>, CoreError> {
        Ok(self.books.find_all().await?)
    }

    pub async fn get_book(&self, id: BookId) -> Result<Book, CoreError> {
        self.books
            .find_by_id(id)
            .await
            .or_not_found(EntityKind::Book, id)
    }

    /// ISBN で書籍を引く（比較は前後の空白と大文字小文字を無視する）
    pub async fn get_book_by_isbn(&self, isbn: &str) -> Result<Book, CoreError> {
        self.books
            .find_by_isbn(isbn)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("ISBN {isbn} の書籍が見つかりません")))
    }

    /// 書籍の平均評価（レビューがなければ 0）
    pub async fn get_book_rating(&self, id: BookId) -> Result<BookRating, CoreError> {
        self.guard
            .ensure_exists(EntityKind::Book, id.as_i32())
            .await?;
        Ok(self.books.average_rating(id).await?)
    }

    /// 書籍を作成する
    ///
    /// 1. 項目と関連リストの検証（400）
    /// 2. ISBN の重複チェック（422）
    /// 3. 著者・カテゴリの存在確認（404）
    /// 4. 書籍と関連行を 1 トランザクションで挿入
    pub async fn create_book(&self, input: BookInput) -> Result<Book, CoreError> {
        let validated = ValidatedBook::try_from(input)?;
        self.ensure_writable(None, &validated).await?;

        let mut tx = self.tx_manager.begin().await?;
        let book = self.books.insert(&mut tx, &validated.draft).await?;
        self.books
            .replace_authors(&mut tx, book.id(), validated.associations.author_ids())
            .await?;
        self.books
            .replace_categories(&mut tx, book.id(), validated.associations.category_ids())
            .await?;
        tx.commit().await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::BOOK_CREATED,
            event.entity_type = event::entity_type::BOOK,
            event.entity_id = %book.id(),
            event.result = event::result::SUCCESS,
            "書籍を作成しました"
        );

        Ok(book)
    }

    /// 書籍を更新する
    ///
    /// 本体を置き換え、著者・カテゴリの関連行を全削除してから作り直す。
    pub async fn update_book(&self, id: BookId, input: BookInput) -> Result<Book, CoreError> {
        let validated = ValidatedBook::try_from(input)?;
        let existing = self.get_book(id).await?;
        self.ensure_writable(Some(id), &validated).await?;

        let ValidatedBook {
            draft,
            associations,
        } = validated;
        let book = existing.replaced(draft);

        let mut tx = self.tx_manager.begin().await?;
        self.books.update(&mut tx, &book).await?;
        self.books
            .replace_authors(&mut tx, id, associations.author_ids())
            .await?;
        self.books
            .replace_categories(&mut tx, id, associations.category_ids())
            .await?;
        tx.commit().await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::BOOK_UPDATED,
            event.entity_type = event::entity_type::BOOK,
            event.entity_id = %id,
            event.result = event::result::SUCCESS,
            "書籍を更新しました"
        );

        Ok(book)
    }

    /// 書籍を削除する
    ///
    /// レビュー、関連行、書籍本体の順に 1 トランザクションで削除する。
    pub async fn delete_book(&self, id: BookId) -> Result<DeletionSummary, CoreError> {
        let summary = self.guard.delete(EntityKind::Book, id.as_i32()).await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::BOOK_DELETED,
            event.entity_type = event::entity_type::BOOK,
            event.entity_id = %id,
            event.result = event::result::SUCCESS,
            "書籍を削除しました"
        );

        Ok(summary)
    }

    /// 書き込み前の検証（ISBN の重複 → 著者 → カテゴリ）
    async fn ensure_writable(
        &self,
        exclude: Option<BookId>,
        validated: &ValidatedBook,
    ) -> Result<(), CoreError> {
        self.guard
            .ensure_unique(
                EntityKind::Book,
                exclude.map(|id| id.as_i32()),
                validated.draft.isbn.as_str(),
            )
            .await?;

        for author_id in validated.associations.author_ids() {
            self.guard
                .ensure_exists(EntityKind::Author, author_id.as_i32())
                .await?;
        }
        for category_id in validated.associations.category_ids() {
            self.guard
                .ensure_exists(EntityKind::Category, category_id.as_i32())
                .await?;
        }
        Ok(())
    }
}
