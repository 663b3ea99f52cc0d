//! # 著者ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/v1/authors` - 著者一覧（姓順）
//! - `GET /api/v1/authors/{id}` - 著者の取得
//! - `GET /api/v1/authors/{id}/books` - 著者の書籍一覧
//! - `GET /api/v1/authors/book/{book_id}` - 書籍の著者一覧
//! - `POST /api/v1/authors` - 著者の作成
//! - `PUT /api/v1/authors/{id}` - 著者の更新
//! - `DELETE /api/v1/authors/{id}` - 著者の削除（書籍との関連行も削除）

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use bookshelf_domain::{
    author::{Author, AuthorId},
    book::BookId,
    country::CountryId,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::CoreError,
    extract::{JsonBody, PathId},
    handler::{book::BookDto, created, deleted, ensure_same_id, ok},
    usecase::{AuthorUseCaseImpl, author::AuthorInput},
};

/// 著者 API の共有状態
pub struct AuthorState {
    pub usecase: AuthorUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// 著者 DTO
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorDto {
    pub id:         i32,
    pub first_name: String,
    pub last_name:  String,
    pub country_id: i32,
}

impl From<Author> for AuthorDto {
    fn from(author: Author) -> Self {
        Self {
            id:         author.id().as_i32(),
            first_name: author.first_name().as_str().to_string(),
            last_name:  author.last_name().as_str().to_string(),
            country_id: author.country_id().as_i32(),
        }
    }
}

/// 著者の作成・更新リクエスト
#[derive(Debug, Deserialize)]
pub struct AuthorRequest {
    pub id:         Option<i32>,
    pub first_name: String,
    pub last_name:  String,
    pub country_id: i32,
}

impl From<AuthorRequest> for AuthorInput {
    fn from(req: AuthorRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name:  req.last_name,
            country_id: CountryId::new(req.country_id),
        }
    }
}

// --- ハンドラ ---

/// GET /api/v1/authors
pub async fn list_authors(
    State(state): State<Arc<AuthorState>>,
) -> Result<impl IntoResponse, CoreError> {
    let authors = state.usecase.list_authors().await?;
    Ok(ok(authors.into_iter().map(AuthorDto::from).collect::<Vec<_>>()))
}

/// GET /api/v1/authors/{id}
pub async fn get_author(
    State(state): State<Arc<AuthorState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let author = state.usecase.get_author(AuthorId::new(id)).await?;
    Ok(ok(AuthorDto::from(author)))
}

/// GET /api/v1/authors/{id}/books
pub async fn list_books_of_author(
    State(state): State<Arc<AuthorState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let books = state.usecase.list_books_of(AuthorId::new(id)).await?;
    Ok(ok(books.into_iter().map(BookDto::from).collect::<Vec<_>>()))
}

/// GET /api/v1/authors/book/{book_id}
pub async fn list_authors_of_book(
    State(state): State<Arc<AuthorState>>,
    PathId(book_id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let authors = state
        .usecase
        .list_authors_of_book(BookId::new(book_id))
        .await?;
    Ok(ok(authors.into_iter().map(AuthorDto::from).collect::<Vec<_>>()))
}

/// POST /api/v1/authors
///
/// ## レスポンス
///
/// - `201 Created`: 作成された著者
/// - `400 Bad Request`: 氏名が空、または長すぎる
/// - `404 Not Found`: `country_id` の国が存在しない
pub async fn create_author(
    State(state): State<Arc<AuthorState>>,
    JsonBody(req): JsonBody<AuthorRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let author = state.usecase.create_author(req.into()).await?;
    Ok(created("authors", author.id(), AuthorDto::from(author)))
}

/// PUT /api/v1/authors/{id}
pub async fn update_author(
    State(state): State<Arc<AuthorState>>,
    PathId(id): PathId<i32>,
    JsonBody(req): JsonBody<AuthorRequest>,
) -> Result<impl IntoResponse, CoreError> {
    ensure_same_id(id, req.id)?;
    state
        .usecase
        .update_author(AuthorId::new(id), req.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/authors/{id}
pub async fn delete_author(
    State(state): State<Arc<AuthorState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let summary = state.usecase.delete_author(AuthorId::new(id)).await?;
    Ok(deleted(summary))
}
