//! カテゴリユースケース

use std::sync::Arc;

use bookshelf_domain::{
    book::{Book, BookId},
    category::{Category, CategoryId, NewCategory},
    integrity::EntityKind,
};
use bookshelf_infra::{
    db::TransactionManager,
    repository::{BookRepository, CategoryRepository},
};
use bookshelf_shared::{event_log::event, log_business_event};

use crate::{
    error::CoreError,
    usecase::{DeletionSummary, FindResultExt, IntegrityGuard},
};

/// カテゴリの作成・更新の入力
pub struct CategoryInput {
    pub name: String,
}

/// カテゴリユースケース
pub struct CategoryUseCaseImpl {
    categories: Arc<dyn CategoryRepository>,
    books:      Arc<dyn BookRepository>,
    guard:      IntegrityGuard,
    tx_manager: Arc<dyn TransactionManager>,
}

impl CategoryUseCaseImpl {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        books: Arc<dyn BookRepository>,
        guard: IntegrityGuard,
        tx_manager: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            categories,
            books,
            guard,
            tx_manager,
        }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, CoreError> {
        Ok(self.categories.find_all().await?)
    }

    pub async fn get_category(&self, id: CategoryId) -> Result<Category, CoreError> {
        self.categories
            .find_by_id(id)
            .await
            .or_not_found(EntityKind::Category, id)
    }

    /// カテゴリに属する書籍一覧
    pub async fn list_books_of(&self, id: CategoryId) -> Result<Vec<Book>, CoreError> {
        self.guard
            .ensure_exists(EntityKind::Category, id.as_i32())
            .await?;
        Ok(self.books.find_by_category(id).await?)
    }

    /// 書籍のカテゴリ一覧
    pub async fn list_categories_of_book(
        &self,
        book_id: BookId,
    ) -> Result<Vec<Category>, CoreError> {
        self.guard
            .ensure_exists(EntityKind::Book, book_id.as_i32())
            .await?;
        Ok(self.categories.find_by_book(book_id).await?)
    }

    /// カテゴリを作成する（正規化後の名前が重複すれば 422）
    pub async fn create_category(&self, input: CategoryInput) -> Result<Category, CoreError> {
        let draft = NewCategory::new(input.name)?;
        self.guard
            .ensure_unique(EntityKind::Category, None, draft.name.as_str())
            .await?;

        let mut tx = self.tx_manager.begin().await?;
        let category = self.categories.insert(&mut tx, &draft).await?;
        tx.commit().await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::CATEGORY_CREATED,
            event.entity_type = event::entity_type::CATEGORY,
            event.entity_id = %category.id(),
            event.result = event::result::SUCCESS,
            "カテゴリを作成しました"
        );

        Ok(category)
    }

    /// カテゴリを更新する（全項目の置き換え）
    pub async fn update_category(
        &self,
        id: CategoryId,
        input: CategoryInput,
    ) -> Result<Category, CoreError> {
        let draft = NewCategory::new(input.name)?;
        let existing = self.get_category(id).await?;
        self.guard
            .ensure_unique(EntityKind::Category, Some(id.as_i32()), draft.name.as_str())
            .await?;

        let category = existing.replaced(draft);
        let mut tx = self.tx_manager.begin().await?;
        self.categories.update(&mut tx, &category).await?;
        tx.commit().await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::CATEGORY_UPDATED,
            event.entity_type = event::entity_type::CATEGORY,
            event.entity_id = %id,
            event.result = event::result::SUCCESS,
            "カテゴリを更新しました"
        );

        Ok(category)
    }

    /// カテゴリを削除する（書籍に使われていれば 409）
    pub async fn delete_category(&self, id: CategoryId) -> Result<DeletionSummary, CoreError> {
        let summary = self.guard.delete(EntityKind::Category, id.as_i32()).await?;

        log_business_event!(
            event.category = event::category::CATALOG,
            event.action = event::action::CATEGORY_DELETED,
            event.entity_type = event::entity_type::CATEGORY,
            event.entity_id = %id,
            event.result = event::result::SUCCESS,
            "カテゴリを削除しました"
        );

        Ok(summary)
    }
}
