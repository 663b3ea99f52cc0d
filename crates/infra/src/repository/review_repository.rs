//! # ReviewRepository
//!
//! レビューの永続化を担当するリポジトリ。
//!
//! `book_id` / `reviewer_id` は外部キーで参照される。書籍・レビュアー削除時の
//! カスケードは [`IntegrityRepository`](super::IntegrityRepository) が行う。

use async_trait::async_trait;
use bookshelf_domain::{
    DomainError,
    book::BookId,
    review::{Headline, NewReview, Rating, Review, ReviewId, ReviewText},
    reviewer::ReviewerId,
};
use sqlx::PgPool;

use crate::{db::TxContext, error::InfraError};

/// レビューリポジトリトレイト
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// すべてのレビューを評価順で取得する
    async fn find_all(&self) -> Result<Vec<Review>, InfraError>;

    /// ID でレビューを検索する
    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, InfraError>;

    /// 書籍のレビューを取得する
    async fn find_by_book(&self, book_id: BookId) -> Result<Vec<Review>, InfraError>;

    /// レビュアーが書いたレビューを取得する
    async fn find_by_reviewer(&self, reviewer_id: ReviewerId) -> Result<Vec<Review>, InfraError>;

    /// レビューを挿入し、採番された ID を含むエンティティを返す
    async fn insert(&self, tx: &mut TxContext, draft: &NewReview) -> Result<Review, InfraError>;

    /// レビューを更新する
    async fn update(&self, tx: &mut TxContext, review: &Review) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の ReviewRepository
#[derive(Debug, Clone)]
pub struct PostgresReviewRepository {
    pool: PgPool,
}

impl PostgresReviewRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id:          i32,
    headline:    String,
    review_text: String,
    rating:      i32,
    book_id:     i32,
    reviewer_id: i32,
}

impl TryFrom<ReviewRow> for Review {
    type Error = InfraError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid =
            |e: DomainError| InfraError::unexpected(format!("不正なレビューデータ(id={id}): {e}"));

        let draft = NewReview {
            headline:    Headline::new(row.headline).map_err(invalid)?,
            review_text: ReviewText::new(row.review_text).map_err(invalid)?,
            rating:      Rating::new(row.rating).map_err(invalid)?,
            book_id:     BookId::new(row.book_id),
            reviewer_id: ReviewerId::new(row.reviewer_id),
        };
        Ok(Review::from_db(ReviewId::new(row.id), draft))
    }
}

#[async_trait]
impl ReviewRepository for PostgresReviewRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Review>, InfraError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, headline, review_text, rating, book_id, reviewer_id
            FROM reviews
            ORDER BY rating ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, InfraError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, headline, review_text, rating, book_id, reviewer_id
            FROM reviews
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Review::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%book_id))]
    async fn find_by_book(&self, book_id: BookId) -> Result<Vec<Review>, InfraError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, headline, review_text, rating, book_id, reviewer_id
            FROM reviews
            WHERE book_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(book_id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%reviewer_id))]
    async fn find_by_reviewer(&self, reviewer_id: ReviewerId) -> Result<Vec<Review>, InfraError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, headline, review_text, rating, book_id, reviewer_id
            FROM reviews
            WHERE reviewer_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(reviewer_id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert(&self, tx: &mut TxContext, draft: &NewReview) -> Result<Review, InfraError> {
        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO reviews (headline, review_text, rating, book_id, reviewer_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(draft.headline.as_str())
        .bind(draft.review_text.as_str())
        .bind(draft.rating.as_i32())
        .bind(draft.book_id.as_i32())
        .bind(draft.reviewer_id.as_i32())
        .fetch_one(tx.conn()?)
        .await?;

        Ok(Review::from_db(ReviewId::new(id), draft.clone()))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %review.id()))]
    async fn update(&self, tx: &mut TxContext, review: &Review) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE reviews
            SET headline = $2, review_text = $3, rating = $4, book_id = $5, reviewer_id = $6
            WHERE id = $1
            "#,
        )
        .bind(review.id().as_i32())
        .bind(review.headline().as_str())
        .bind(review.review_text().as_str())
        .bind(review.rating().as_i32())
        .bind(review.book_id().as_i32())
        .bind(review.reviewer_id().as_i32())
        .execute(tx.conn()?)
        .await?;

        Ok(())
    }
}
