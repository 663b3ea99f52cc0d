//! # BookRepository
//!
//! 書籍と、著者・カテゴリとの関連行（book_authors / book_categories）の
//! 永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **関連は全置換**: 更新時は既存の関連行をすべて削除してから作り直す（差分更新はしない）
//! - **同一トランザクション**: 書籍本体と関連行は呼び出し側が渡す `TxContext` で
//!   まとめて書き込む
//! - **平均評価は DB で集計**: `AVG(rating)` を `float8` で返し、NULL は 0 とする

use async_trait::async_trait;
use bookshelf_domain::{
    DomainError,
    author::AuthorId,
    book::{Book, BookId, BookRating, BookTitle, Isbn, NewBook},
    category::CategoryId,
    review::ReviewId,
};
use chrono::NaiveDate;
use itertools::Itertools;
use sqlx::PgPool;

use crate::{db::TxContext, error::InfraError};

/// 書籍リポジトリトレイト
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// すべての書籍をタイトル順で取得する
    async fn find_all(&self) -> Result<Vec<Book>, InfraError>;

    /// ID で書籍を検索する
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, InfraError>;

    /// ISBN で書籍を検索する（前後の空白と大文字小文字を区別しない）
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, InfraError>;

    /// 著者の書籍をタイトル順で取得する
    async fn find_by_author(&self, author_id: AuthorId) -> Result<Vec<Book>, InfraError>;

    /// カテゴリに属する書籍をタイトル順で取得する
    async fn find_by_category(&self, category_id: CategoryId) -> Result<Vec<Book>, InfraError>;

    /// レビュー対象の書籍を取得する
    async fn find_by_review(&self, review_id: ReviewId) -> Result<Option<Book>, InfraError>;

    /// 書籍の平均評価を取得する（レビューがなければ 0）
    async fn average_rating(&self, id: BookId) -> Result<BookRating, InfraError>;

    /// 書籍を挿入し、採番された ID を含むエンティティを返す
    async fn insert(&self, tx: &mut TxContext, draft: &NewBook) -> Result<Book, InfraError>;

    /// 書籍本体を更新する
    async fn update(&self, tx: &mut TxContext, book: &Book) -> Result<(), InfraError>;

    /// 書籍の著者関連を指定した集合で置き換える
    async fn replace_authors(
        &self,
        tx: &mut TxContext,
        book_id: BookId,
        author_ids: &[AuthorId],
    ) -> Result<(), InfraError>;

    /// 書籍のカテゴリ関連を指定した集合で置き換える
    async fn replace_categories(
        &self,
        tx: &mut TxContext,
        book_id: BookId,
        category_ids: &[CategoryId],
    ) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の BookRepository
#[derive(Debug, Clone)]
pub struct PostgresBookRepository {
    pool: PgPool,
}

impl PostgresBookRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id:             i32,
    isbn:           String,
    title:          String,
    date_published: Option<NaiveDate>,
}

impl TryFrom<BookRow> for Book {
    type Error = InfraError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid =
            |e: DomainError| InfraError::unexpected(format!("不正な書籍データ(id={id}): {e}"));

        Ok(Book::from_db(
            BookId::new(row.id),
            Isbn::new(row.isbn).map_err(invalid)?,
            BookTitle::new(row.title).map_err(invalid)?,
            row.date_published,
        ))
    }
}

#[async_trait]
impl BookRepository for PostgresBookRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Book>, InfraError> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, isbn, title, date_published
            FROM books
            ORDER BY title ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Book::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, InfraError> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, isbn, title, date_published
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Book::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%isbn))]
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, InfraError> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, isbn, title, date_published
            FROM books
            WHERE UPPER(TRIM(isbn)) = UPPER(TRIM($1))
            "#,
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Book::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%author_id))]
    async fn find_by_author(&self, author_id: AuthorId) -> Result<Vec<Book>, InfraError> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT b.id, b.isbn, b.title, b.date_published
            FROM books b
            INNER JOIN book_authors ba ON ba.book_id = b.id
            WHERE ba.author_id = $1
            ORDER BY b.title ASC, b.id ASC
            "#,
        )
        .bind(author_id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Book::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%category_id))]
    async fn find_by_category(&self, category_id: CategoryId) -> Result<Vec<Book>, InfraError> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT b.id, b.isbn, b.title, b.date_published
            FROM books b
            INNER JOIN book_categories bc ON bc.book_id = b.id
            WHERE bc.category_id = $1
            ORDER BY b.title ASC, b.id ASC
            "#,
        )
        .bind(category_id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Book::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%review_id))]
    async fn find_by_review(&self, review_id: ReviewId) -> Result<Option<Book>, InfraError> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT b.id, b.isbn, b.title, b.date_published
            FROM books b
            INNER JOIN reviews r ON r.book_id = b.id
            WHERE r.id = $1
            "#,
        )
        .bind(review_id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Book::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn average_rating(&self, id: BookId) -> Result<BookRating, InfraError> {
        let (average,): (Option<f64>,) = sqlx::query_as(
            r#"
            SELECT AVG(rating)::float8
            FROM reviews
            WHERE book_id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_one(&self.pool)
        .await?;

        Ok(BookRating::from_average(average))
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert(&self, tx: &mut TxContext, draft: &NewBook) -> Result<Book, InfraError> {
        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO books (isbn, title, date_published)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(draft.isbn.as_str())
        .bind(draft.title.as_str())
        .bind(draft.date_published)
        .fetch_one(tx.conn()?)
        .await?;

        Ok(Book::from_db(
            BookId::new(id),
            draft.isbn.clone(),
            draft.title.clone(),
            draft.date_published,
        ))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %book.id()))]
    async fn update(&self, tx: &mut TxContext, book: &Book) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE books
            SET isbn = $2, title = $3, date_published = $4
            WHERE id = $1
            "#,
        )
        .bind(book.id().as_i32())
        .bind(book.isbn().as_str())
        .bind(book.title().as_str())
        .bind(book.date_published())
        .execute(tx.conn()?)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%book_id, count = author_ids.len()))]
    async fn replace_authors(
        &self,
        tx: &mut TxContext,
        book_id: BookId,
        author_ids: &[AuthorId],
    ) -> Result<(), InfraError> {
        sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
            .bind(book_id.as_i32())
            .execute(tx.conn()?)
            .await?;

        let ids: Vec<i32> = author_ids.iter().map(AuthorId::as_i32).unique().collect();
        sqlx::query(
            r#"
            INSERT INTO book_authors (book_id, author_id)
            SELECT $1, author_id FROM UNNEST($2::int4[]) AS t(author_id)
            "#,
        )
        .bind(book_id.as_i32())
        .bind(&ids)
        .execute(tx.conn()?)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%book_id, count = category_ids.len()))]
    async fn replace_categories(
        &self,
        tx: &mut TxContext,
        book_id: BookId,
        category_ids: &[CategoryId],
    ) -> Result<(), InfraError> {
        sqlx::query("DELETE FROM book_categories WHERE book_id = $1")
            .bind(book_id.as_i32())
            .execute(tx.conn()?)
            .await?;

        let ids: Vec<i32> = category_ids
            .iter()
            .map(CategoryId::as_i32)
            .unique()
            .collect();
        sqlx::query(
            r#"
            INSERT INTO book_categories (book_id, category_id)
            SELECT $1, category_id FROM UNNEST($2::int4[]) AS t(category_id)
            "#,
        )
        .bind(book_id.as_i32())
        .bind(&ids)
        .execute(tx.conn()?)
        .await?;

        Ok(())
    }
}
