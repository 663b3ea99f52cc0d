//! # カテゴリハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/v1/categories` - カテゴリ一覧（名前順）
//! - `GET /api/v1/categories/{id}` - カテゴリの取得
//! - `GET /api/v1/categories/{id}/books` - カテゴリに属する書籍一覧
//! - `GET /api/v1/categories/books/{book_id}` - 書籍のカテゴリ一覧
//! - `POST /api/v1/categories` - カテゴリの作成
//! - `PUT /api/v1/categories/{id}` - カテゴリの更新
//! - `DELETE /api/v1/categories/{id}` - カテゴリの削除（書籍に使われていれば 409）

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use bookshelf_domain::{
    book::BookId,
    category::{Category, CategoryId},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::CoreError,
    extract::{JsonBody, PathId},
    handler::{book::BookDto, created, deleted, ensure_same_id, ok},
    usecase::{CategoryUseCaseImpl, category::CategoryInput},
};

/// カテゴリ API の共有状態
pub struct CategoryState {
    pub usecase: CategoryUseCaseImpl,
}

/// カテゴリ DTO
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryDto {
    pub id:   i32,
    pub name: String,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id:   category.id().as_i32(),
            name: category.name().as_str().to_string(),
        }
    }
}

/// カテゴリの作成・更新リクエスト
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub id:   Option<i32>,
    pub name: String,
}

impl From<CategoryRequest> for CategoryInput {
    fn from(req: CategoryRequest) -> Self {
        Self { name: req.name }
    }
}

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<Arc<CategoryState>>,
) -> Result<impl IntoResponse, CoreError> {
    let categories = state.usecase.list_categories().await?;
    Ok(ok(categories
        .into_iter()
        .map(CategoryDto::from)
        .collect::<Vec<_>>()))
}

/// GET /api/v1/categories/{id}
pub async fn get_category(
    State(state): State<Arc<CategoryState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let category = state.usecase.get_category(CategoryId::new(id)).await?;
    Ok(ok(CategoryDto::from(category)))
}

/// GET /api/v1/categories/{id}/books
pub async fn list_books_of_category(
    State(state): State<Arc<CategoryState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let books = state.usecase.list_books_of(CategoryId::new(id)).await?;
    Ok(ok(books.into_iter().map(BookDto::from).collect::<Vec<_>>()))
}

/// GET /api/v1/categories/books/{book_id}
pub async fn list_categories_of_book(
    State(state): State<Arc<CategoryState>>,
    PathId(book_id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let categories = state
        .usecase
        .list_categories_of_book(BookId::new(book_id))
        .await?;
    Ok(ok(categories
        .into_iter()
        .map(CategoryDto::from)
        .collect::<Vec<_>>()))
}

/// POST /api/v1/categories
pub async fn create_category(
    State(state): State<Arc<CategoryState>>,
    JsonBody(req): JsonBody<CategoryRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let category = state.usecase.create_category(req.into()).await?;
    Ok(created("categories", category.id(), CategoryDto::from(category)))
}

/// PUT /api/v1/categories/{id}
pub async fn update_category(
    State(state): State<Arc<CategoryState>>,
    PathId(id): PathId<i32>,
    JsonBody(req): JsonBody<CategoryRequest>,
) -> Result<impl IntoResponse, CoreError> {
    ensure_same_id(id, req.id)?;
    state
        .usecase
        .update_category(CategoryId::new(id), req.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/categories/{id}
pub async fn delete_category(
    State(state): State<Arc<CategoryState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let summary = state.usecase.delete_category(CategoryId::new(id)).await?;
    Ok(deleted(summary))
}
