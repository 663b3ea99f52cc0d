//! # レビューハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/v1/reviews` - レビュー一覧（評価順）
//! - `GET /api/v1/reviews/{id}` - レビューの取得
//! - `GET /api/v1/reviews/{id}/book` - レビュー対象の書籍
//! - `GET /api/v1/reviews/book/{book_id}` - 書籍のレビュー一覧
//! - `POST /api/v1/reviews` - レビューの作成
//! - `PUT /api/v1/reviews/{id}` - レビューの更新
//! - `DELETE /api/v1/reviews/{id}` - レビューの削除

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use bookshelf_domain::{
    book::BookId,
    review::{Review, ReviewId},
    reviewer::ReviewerId,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::CoreError,
    extract::{JsonBody, PathId},
    handler::{book::BookDto, created, deleted, ensure_same_id, ok},
    usecase::{ReviewUseCaseImpl, review::ReviewInput},
};

/// レビュー API の共有状態
pub struct ReviewState {
    pub usecase: ReviewUseCaseImpl,
}

/// レビュー DTO
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewDto {
    pub id:          i32,
    pub headline:    String,
    pub review_text: String,
    pub rating:      i32,
    pub book_id:     i32,
    pub reviewer_id: i32,
}

impl From<Review> for ReviewDto {
    fn from(review: Review) -> Self {
        Self {
            id:          review.id().as_i32(),
            headline:    review.headline().as_str().to_string(),
            review_text: review.review_text().as_str().to_string(),
            rating:      review.rating().as_i32(),
            book_id:     review.book_id().as_i32(),
            reviewer_id: review.reviewer_id().as_i32(),
        }
    }
}

/// レビューの作成・更新リクエスト
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub id:          Option<i32>,
    pub headline:    String,
    pub review_text: String,
    pub rating:      i32,
    pub book_id:     i32,
    pub reviewer_id: i32,
}

impl From<ReviewRequest> for ReviewInput {
    fn from(req: ReviewRequest) -> Self {
        Self {
            headline:    req.headline,
            review_text: req.review_text,
            rating:      req.rating,
            book_id:     BookId::new(req.book_id),
            reviewer_id: ReviewerId::new(req.reviewer_id),
        }
    }
}

/// GET /api/v1/reviews
pub async fn list_reviews(
    State(state): State<Arc<ReviewState>>,
) -> Result<impl IntoResponse, CoreError> {
    let reviews = state.usecase.list_reviews().await?;
    Ok(ok(reviews.into_iter().map(ReviewDto::from).collect::<Vec<_>>()))
}

/// GET /api/v1/reviews/{id}
pub async fn get_review(
    State(state): State<Arc<ReviewState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let review = state.usecase.get_review(ReviewId::new(id)).await?;
    Ok(ok(ReviewDto::from(review)))
}

/// GET /api/v1/reviews/{id}/book
pub async fn get_book_of_review(
    State(state): State<Arc<ReviewState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let book = state.usecase.get_book_of_review(ReviewId::new(id)).await?;
    Ok(ok(BookDto::from(book)))
}

/// GET /api/v1/reviews/book/{book_id}
pub async fn list_reviews_of_book(
    State(state): State<Arc<ReviewState>>,
    PathId(book_id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let reviews = state
        .usecase
        .list_reviews_of_book(BookId::new(book_id))
        .await?;
    Ok(ok(reviews.into_iter().map(ReviewDto::from).collect::<Vec<_>>()))
}

/// POST /api/v1/reviews
///
/// ## レスポンス
///
/// - `201 Created`: 作成されたレビュー
/// - `400 Bad Request`: 見出し・本文の長さ、評価が 1〜5 の範囲外
/// - `404 Not Found`: 書籍またはレビュアーが存在しない
pub async fn create_review(
    State(state): State<Arc<ReviewState>>,
    JsonBody(req): JsonBody<ReviewRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let review = state.usecase.create_review(req.into()).await?;
    Ok(created("reviews", review.id(), ReviewDto::from(review)))
}

/// PUT /api/v1/reviews/{id}
pub async fn update_review(
    State(state): State<Arc<ReviewState>>,
    PathId(id): PathId<i32>,
    JsonBody(req): JsonBody<ReviewRequest>,
) -> Result<impl IntoResponse, CoreError> {
    ensure_same_id(id, req.id)?;
    state
        .usecase
        .update_review(ReviewId::new(id), req.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/reviews/{id}
pub async fn delete_review(
    State(state): State<Arc<ReviewState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let summary = state.usecase.delete_review(ReviewId::new(id)).await?;
    Ok(deleted(summary))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, header},
    };
    use bookshelf_shared::ApiResponse;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;
    use crate::test_utils::mock_api_router;

    #[tokio::test]
    async fn test_post_reviewsは201を返す() {
        // Given
        let (sut, catalog) = mock_api_router();
        let japan = catalog.seed_country("Japan");
        let soseki = catalog.seed_author("Soseki", "Natsume", japan.id());
        let novel = catalog.seed_category("Novel");
        let book = catalog.seed_book("4101010013", "Kokoro", &[soseki.id()], &[novel.id()]);
        let reviewer = catalog.seed_reviewer("Taro", "Yamada");
        let body = serde_json::json!({
            "headline": "名作",
            "review_text": "何度読んでも新しい発見がある。",
            "rating": 5,
            "book_id": book.id().as_i32(),
            "reviewer_id": reviewer.id().as_i32()
        });
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/reviews")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ApiResponse<ReviewDto> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.data.rating, 5);
        assert_eq!(body.data.book_id, book.id().as_i32());
    }

    #[tokio::test]
    async fn test_get_reviews_bookは存在しないレビューで404を返す() {
        // Given
        let (sut, _) = mock_api_router();

        // When
        let response = sut
            .oneshot(
                Request::builder()
                    .uri("/api/v1/reviews/999/book")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
