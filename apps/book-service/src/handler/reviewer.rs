//! # レビュアーハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/v1/reviewers` - レビュアー一覧（姓順）
//! - `GET /api/v1/reviewers/{id}` - レビュアーの取得
//! - `GET /api/v1/reviewers/{id}/reviews` - レビュアーが書いたレビュー一覧
//! - `GET /api/v1/reviewers/review/{review_id}` - レビューを書いたレビュアー
//! - `POST /api/v1/reviewers` - レビュアーの作成
//! - `PUT /api/v1/reviewers/{id}` - レビュアーの更新
//! - `DELETE /api/v1/reviewers/{id}` - レビュアーの削除（書いたレビューも削除）

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use bookshelf_domain::{
    review::ReviewId,
    reviewer::{Reviewer, ReviewerId},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::CoreError,
    extract::{JsonBody, PathId},
    handler::{created, deleted, ensure_same_id, ok, review::ReviewDto},
    usecase::{ReviewerUseCaseImpl, reviewer::ReviewerInput},
};

/// レビュアー API の共有状態
pub struct ReviewerState {
    pub usecase: ReviewerUseCaseImpl,
}

/// レビュアー DTO
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewerDto {
    pub id:         i32,
    pub first_name: String,
    pub last_name:  String,
}

impl From<Reviewer> for ReviewerDto {
    fn from(reviewer: Reviewer) -> Self {
        Self {
            id:         reviewer.id().as_i32(),
            first_name: reviewer.first_name().as_str().to_string(),
            last_name:  reviewer.last_name().as_str().to_string(),
        }
    }
}

/// レビュアーの作成・更新リクエスト
#[derive(Debug, Deserialize)]
pub struct ReviewerRequest {
    pub id:         Option<i32>,
    pub first_name: String,
    pub last_name:  String,
}

impl From<ReviewerRequest> for ReviewerInput {
    fn from(req: ReviewerRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name:  req.last_name,
        }
    }
}

/// GET /api/v1/reviewers
pub async fn list_reviewers(
    State(state): State<Arc<ReviewerState>>,
) -> Result<impl IntoResponse, CoreError> {
    let reviewers = state.usecase.list_reviewers().await?;
    Ok(ok(reviewers
        .into_iter()
        .map(ReviewerDto::from)
        .collect::<Vec<_>>()))
}

/// GET /api/v1/reviewers/{id}
pub async fn get_reviewer(
    State(state): State<Arc<ReviewerState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let reviewer = state.usecase.get_reviewer(ReviewerId::new(id)).await?;
    Ok(ok(ReviewerDto::from(reviewer)))
}

/// GET /api/v1/reviewers/{id}/reviews
pub async fn list_reviews_of_reviewer(
    State(state): State<Arc<ReviewerState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let reviews = state.usecase.list_reviews_of(ReviewerId::new(id)).await?;
    Ok(ok(reviews.into_iter().map(ReviewDto::from).collect::<Vec<_>>()))
}

/// GET /api/v1/reviewers/review/{review_id}
pub async fn get_reviewer_of_review(
    State(state): State<Arc<ReviewerState>>,
    PathId(review_id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let reviewer = state
        .usecase
        .get_reviewer_of_review(ReviewId::new(review_id))
        .await?;
    Ok(ok(ReviewerDto::from(reviewer)))
}

/// POST /api/v1/reviewers
pub async fn create_reviewer(
    State(state): State<Arc<ReviewerState>>,
    JsonBody(req): JsonBody<ReviewerRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let reviewer = state.usecase.create_reviewer(req.into()).await?;
    Ok(created("reviewers", reviewer.id(), ReviewerDto::from(reviewer)))
}

/// PUT /api/v1/reviewers/{id}
pub async fn update_reviewer(
    State(state): State<Arc<ReviewerState>>,
    PathId(id): PathId<i32>,
    JsonBody(req): JsonBody<ReviewerRequest>,
) -> Result<impl IntoResponse, CoreError> {
    ensure_same_id(id, req.id)?;
    state
        .usecase
        .update_reviewer(ReviewerId::new(id), req.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/reviewers/{id}
pub async fn delete_reviewer(
    State(state): State<Arc<ReviewerState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let summary = state.usecase.delete_reviewer(ReviewerId::new(id)).await?;
    Ok(deleted(summary))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request},
    };
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;
    use crate::test_utils::mock_api_router;

    #[tokio::test]
    async fn test_delete_reviewersはレビューごと削除して204を返す() {
        // Given
        let (sut, catalog) = mock_api_router();
        let japan = catalog.seed_country("Japan");
        let soseki = catalog.seed_author("Soseki", "Natsume", japan.id());
        let novel = catalog.seed_category("Novel");
        let book = catalog.seed_book("4101010013", "Kokoro", &[soseki.id()], &[novel.id()]);
        let reviewer = catalog.seed_reviewer("Taro", "Yamada");
        catalog.seed_review(book.id(), reviewer.id(), 4);
        catalog.seed_review(book.id(), reviewer.id(), 2);
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/v1/reviewers/{}", reviewer.id()))
            .body(Body::empty())
            .unwrap();

        // When
        let response = sut.oneshot(request).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(catalog.with_tables(|t| t.reviews.is_empty() && t.reviewers.is_empty()));
    }

    #[tokio::test]
    async fn test_get_reviewersで存在しないidは404のproblem_detailsを返す() {
        // Given
        let (sut, _) = mock_api_router();

        // When
        let response = sut
            .oneshot(
                Request::builder()
                    .uri("/api/v1/reviewers/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], "レビュアーが見つかりません: 42");
        assert_eq!(body["title"], "Not Found");
    }
}
