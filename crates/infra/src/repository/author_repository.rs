//! # AuthorRepository
//!
//! 著者の永続化を担当するリポジトリ。
//!
//! `country_id` は外部キーで countries を参照する。国が実在するかの確認は
//! 書き込み前にユースケース層が行う。

use async_trait::async_trait;
use bookshelf_domain::{
    DomainError,
    author::{Author, AuthorId, FirstName, LastName, NewAuthor},
    book::BookId,
    country::CountryId,
};
use sqlx::PgPool;

use crate::{db::TxContext, error::InfraError};

/// 著者リポジトリトレイト
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// すべての著者を姓順で取得する
    async fn find_all(&self) -> Result<Vec<Author>, InfraError>;

    /// ID で著者を検索する
    async fn find_by_id(&self, id: AuthorId) -> Result<Option<Author>, InfraError>;

    /// 書籍の著者を姓順で取得する
    async fn find_by_book(&self, book_id: BookId) -> Result<Vec<Author>, InfraError>;

    /// 国に所属する著者を姓順で取得する
    async fn find_by_country(&self, country_id: CountryId) -> Result<Vec<Author>, InfraError>;

    /// 著者を挿入し、採番された ID を含むエンティティを返す
    async fn insert(&self, tx: &mut TxContext, draft: &NewAuthor) -> Result<Author, InfraError>;

    /// 著者を更新する
    async fn update(&self, tx: &mut TxContext, author: &Author) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の AuthorRepository
#[derive(Debug, Clone)]
pub struct PostgresAuthorRepository {
    pool: PgPool,
}

impl PostgresAuthorRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AuthorRow {
    id:         i32,
    first_name: String,
    last_name:  String,
    country_id: i32,
}

impl TryFrom<AuthorRow> for Author {
    type Error = InfraError;

    fn try_from(row: AuthorRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid =
            |e: DomainError| InfraError::unexpected(format!("不正な著者データ(id={id}): {e}"));
        let first_name = FirstName::new(row.first_name).map_err(invalid)?;
        let last_name = LastName::new(row.last_name).map_err(invalid)?;

        Ok(Author::from_db(
            AuthorId::new(row.id),
            first_name,
            last_name,
            CountryId::new(row.country_id),
        ))
    }
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Author>, InfraError> {
        let rows = sqlx::query_as::<_, AuthorRow>(
            r#"
            SELECT id, first_name, last_name, country_id
            FROM authors
            ORDER BY last_name ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Author::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: AuthorId) -> Result<Option<Author>, InfraError> {
        let row = sqlx::query_as::<_, AuthorRow>(
            r#"
            SELECT id, first_name, last_name, country_id
            FROM authors
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Author::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%book_id))]
    async fn find_by_book(&self, book_id: BookId) -> Result<Vec<Author>, InfraError> {
        let rows = sqlx::query_as::<_, AuthorRow>(
            r#"
            SELECT a.id, a.first_name, a.last_name, a.country_id
            FROM authors a
            INNER JOIN book_authors ba ON ba.author_id = a.id
            WHERE ba.book_id = $1
            ORDER BY a.last_name ASC, a.id ASC
            "#,
        )
        .bind(book_id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Author::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%country_id))]
    async fn find_by_country(&self, country_id: CountryId) -> Result<Vec<Author>, InfraError> {
        let rows = sqlx::query_as::<_, AuthorRow>(
            r#"
            SELECT id, first_name, last_name, country_id
            FROM authors
            WHERE country_id = $1
            ORDER BY last_name ASC, id ASC
            "#,
        )
        .bind(country_id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Author::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert(&self, tx: &mut TxContext, draft: &NewAuthor) -> Result<Author, InfraError> {
        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO authors (first_name, last_name, country_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(draft.first_name.as_str())
        .bind(draft.last_name.as_str())
        .bind(draft.country_id.as_i32())
        .fetch_one(tx.conn()?)
        .await?;

        Ok(Author::from_db(
            AuthorId::new(id),
            draft.first_name.clone(),
            draft.last_name.clone(),
            draft.country_id,
        ))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %author.id()))]
    async fn update(&self, tx: &mut TxContext, author: &Author) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE authors
            SET first_name = $2, last_name = $3, country_id = $4
            WHERE id = $1
            "#,
        )
        .bind(author.id().as_i32())
        .bind(author.first_name().as_str())
        .bind(author.last_name().as_str())
        .bind(author.country_id().as_i32())
        .execute(tx.conn()?)
        .await?;

        Ok(())
    }
}
