//! # ReviewerRepository
//!
//! レビュアーの永続化を担当するリポジトリ。

use async_trait::async_trait;
use bookshelf_domain::{
    DomainError,
    author::{FirstName, LastName},
    review::ReviewId,
    reviewer::{NewReviewer, Reviewer, ReviewerId},
};
use sqlx::PgPool;

use crate::{db::TxContext, error::InfraError};

/// レビュアーリポジトリトレイト
#[async_trait]
pub trait ReviewerRepository: Send + Sync {
    /// すべてのレビュアーを姓順で取得する
    async fn find_all(&self) -> Result<Vec<Reviewer>, InfraError>;

    /// ID でレビュアーを検索する
    async fn find_by_id(&self, id: ReviewerId) -> Result<Option<Reviewer>, InfraError>;

    /// レビューを書いたレビュアーを取得する
    async fn find_by_review(&self, review_id: ReviewId) -> Result<Option<Reviewer>, InfraError>;

    /// レビュアーを挿入し、採番された ID を含むエンティティを返す
    async fn insert(&self, tx: &mut TxContext, draft: &NewReviewer)
    -> Result<Reviewer, InfraError>;

    /// レビュアーを更新する
    async fn update(&self, tx: &mut TxContext, reviewer: &Reviewer) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の ReviewerRepository
#[derive(Debug, Clone)]
pub struct PostgresReviewerRepository {
    pool: PgPool,
}

impl PostgresReviewerRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewerRow {
    id:         i32,
    first_name: String,
    last_name:  String,
}

impl TryFrom<ReviewerRow> for Reviewer {
    type Error = InfraError;

    fn try_from(row: ReviewerRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid = |e: DomainError| {
            InfraError::unexpected(format!("不正なレビュアーデータ(id={id}): {e}"))
        };

        Ok(Reviewer::from_db(
            ReviewerId::new(row.id),
            FirstName::new(row.first_name).map_err(invalid)?,
            LastName::new(row.last_name).map_err(invalid)?,
        ))
    }
}

#[async_trait]
impl ReviewerRepository for PostgresReviewerRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Reviewer>, InfraError> {
        let rows = sqlx::query_as::<_, ReviewerRow>(
            r#"
            SELECT id, first_name, last_name
            FROM reviewers
            ORDER BY last_name ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Reviewer::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: ReviewerId) -> Result<Option<Reviewer>, InfraError> {
        let row = sqlx::query_as::<_, ReviewerRow>(
            r#"
            SELECT id, first_name, last_name
            FROM reviewers
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Reviewer::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%review_id))]
    async fn find_by_review(&self, review_id: ReviewId) -> Result<Option<Reviewer>, InfraError> {
        let row = sqlx::query_as::<_, ReviewerRow>(
            r#"
            SELECT rv.id, rv.first_name, rv.last_name
            FROM reviewers rv
            INNER JOIN reviews r ON r.reviewer_id = rv.id
            WHERE r.id = $1
            "#,
        )
        .bind(review_id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Reviewer::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert(
        &self,
        tx: &mut TxContext,
        draft: &NewReviewer,
    ) -> Result<Reviewer, InfraError> {
        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO reviewers (first_name, last_name)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(draft.first_name.as_str())
        .bind(draft.last_name.as_str())
        .fetch_one(tx.conn()?)
        .await?;

        Ok(Reviewer::from_db(
            ReviewerId::new(id),
            draft.first_name.clone(),
            draft.last_name.clone(),
        ))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %reviewer.id()))]
    async fn update(&self, tx: &mut TxContext, reviewer: &Reviewer) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE reviewers
            SET first_name = $2, last_name = $3
            WHERE id = $1
            "#,
        )
        .bind(reviewer.id().as_i32())
        .bind(reviewer.first_name().as_str())
        .bind(reviewer.last_name().as_str())
        .execute(tx.conn()?)
        .await?;

        Ok(())
    }
}
