//! # CategoryRepository
//!
//! カテゴリの永続化を担当するリポジトリ。
//! 書籍との関連（book_categories）の書き込みは [`BookRepository`](super::BookRepository) が担当する。

use async_trait::async_trait;
use bookshelf_domain::{
    book::BookId,
    category::{Category, CategoryId, CategoryName, NewCategory},
};
use sqlx::PgPool;

use crate::{db::TxContext, error::InfraError};

/// カテゴリリポジトリトレイト
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// すべてのカテゴリを名前順で取得する
    async fn find_all(&self) -> Result<Vec<Category>, InfraError>;

    /// ID でカテゴリを検索する
    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, InfraError>;

    /// 書籍に紐付くカテゴリを名前順で取得する
    async fn find_by_book(&self, book_id: BookId) -> Result<Vec<Category>, InfraError>;

    /// カテゴリを挿入し、採番された ID を含むエンティティを返す
    async fn insert(&self, tx: &mut TxContext, draft: &NewCategory)
    -> Result<Category, InfraError>;

    /// カテゴリを更新する
    async fn update(&self, tx: &mut TxContext, category: &Category) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の CategoryRepository
#[derive(Debug, Clone)]
pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id:   i32,
    name: String,
}

impl TryFrom<CategoryRow> for Category {
    type Error = InfraError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let name = CategoryName::new(row.name).map_err(|e| {
            InfraError::unexpected(format!("不正なカテゴリデータ(id={}): {e}", row.id))
        })?;
        Ok(Category::from_db(CategoryId::new(row.id), name))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Category>, InfraError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name
            FROM categories
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, InfraError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Category::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%book_id))]
    async fn find_by_book(&self, book_id: BookId) -> Result<Vec<Category>, InfraError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT c.id, c.name
            FROM categories c
            INNER JOIN book_categories bc ON bc.category_id = c.id
            WHERE bc.book_id = $1
            ORDER BY c.name ASC
            "#,
        )
        .bind(book_id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert(
        &self,
        tx: &mut TxContext,
        draft: &NewCategory,
    ) -> Result<Category, InfraError> {
        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            RETURNING id
            "#,
        )
        .bind(draft.name.as_str())
        .fetch_one(tx.conn()?)
        .await?;

        Ok(Category::from_db(CategoryId::new(id), draft.name.clone()))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %category.id()))]
    async fn update(&self, tx: &mut TxContext, category: &Category) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE categories
            SET name = $2
            WHERE id = $1
            "#,
        )
        .bind(category.id().as_i32())
        .bind(category.name().as_str())
        .execute(tx.conn()?)
        .await?;

        Ok(())
    }
}
