//! # 書籍ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/v1/books` - 書籍一覧（タイトル順）
//! - `GET /api/v1/books/{id}` - 書籍の取得
//! - `GET /api/v1/books/isbn/{isbn}` - ISBN による書籍の取得
//! - `GET /api/v1/books/{id}/rating` - 平均評価（レビューがなければ 0）
//! - `POST /api/v1/books` - 書籍の作成（著者・カテゴリを 1 つ以上指定）
//! - `PUT /api/v1/books/{id}` - 書籍の更新（著者・カテゴリは全置き換え）
//! - `DELETE /api/v1/books/{id}` - 書籍の削除（レビューと関連行も削除）

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use bookshelf_domain::{
    author::AuthorId,
    book::{Book, BookId},
    category::CategoryId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::CoreError,
    extract::{JsonBody, PathId},
    handler::{created, deleted, ensure_same_id, ok},
    usecase::{BookUseCaseImpl, book::BookInput},
};

/// 書籍 API の共有状態
pub struct BookState {
    pub usecase: BookUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// 書籍 DTO
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookDto {
    pub id:             i32,
    pub isbn:           String,
    pub title:          String,
    pub date_published: Option<NaiveDate>,
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            id:             book.id().as_i32(),
            isbn:           book.isbn().as_str().to_string(),
            title:          book.title().as_str().to_string(),
            date_published: book.date_published(),
        }
    }
}

/// 書籍の作成・更新リクエスト
///
/// `author_ids` / `category_ids` は省略すると空リスト扱いになり 400 を返す。
#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub id:             Option<i32>,
    pub isbn:           String,
    pub title:          String,
    #[serde(default)]
    pub date_published: Option<NaiveDate>,
    #[serde(default)]
    pub author_ids:     Vec<i32>,
    #[serde(default)]
    pub category_ids:   Vec<i32>,
}

impl From<BookRequest> for BookInput {
    fn from(req: BookRequest) -> Self {
        Self {
            isbn:           req.isbn,
            title:          req.title,
            date_published: req.date_published,
            author_ids:     req.author_ids.into_iter().map(AuthorId::new).collect(),
            category_ids:   req.category_ids.into_iter().map(CategoryId::new).collect(),
        }
    }
}

// --- ハンドラ ---

/// GET /api/v1/books
pub async fn list_books(State(state): State<Arc<BookState>>) -> Result<impl IntoResponse, CoreError> {
    let books = state.usecase.list_books().await?;
    Ok(ok(books.into_iter().map(BookDto::from).collect::<Vec<_>>()))
}

/// GET /api/v1/books/{id}
pub async fn get_book(
    State(state): State<Arc<BookState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let book = state.usecase.get_book(BookId::new(id)).await?;
    Ok(ok(BookDto::from(book)))
}

/// GET /api/v1/books/isbn/{isbn}
pub async fn get_book_by_isbn(
    State(state): State<Arc<BookState>>,
    PathId(isbn): PathId<String>,
) -> Result<impl IntoResponse, CoreError> {
    let book = state.usecase.get_book_by_isbn(&isbn).await?;
    Ok(ok(BookDto::from(book)))
}

/// GET /api/v1/books/{id}/rating
///
/// `{ "data": 4.0 }` の形で平均評価を返す。
pub async fn get_book_rating(
    State(state): State<Arc<BookState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let rating = state.usecase.get_book_rating(BookId::new(id)).await?;
    Ok(ok(rating))
}

/// POST /api/v1/books
///
/// ## レスポンス
///
/// - `201 Created`: 作成された書籍
/// - `400 Bad Request`: 項目の検証エラー、著者・カテゴリが空
/// - `404 Not Found`: 指定した著者・カテゴリが存在しない
/// - `422 Unprocessable Entity`: ISBN が既存の書籍と重複
pub async fn create_book(
    State(state): State<Arc<BookState>>,
    JsonBody(req): JsonBody<BookRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let book = state.usecase.create_book(req.into()).await?;
    Ok(created("books", book.id(), BookDto::from(book)))
}

/// PUT /api/v1/books/{id}
pub async fn update_book(
    State(state): State<Arc<BookState>>,
    PathId(id): PathId<i32>,
    JsonBody(req): JsonBody<BookRequest>,
) -> Result<impl IntoResponse, CoreError> {
    ensure_same_id(id, req.id)?;
    state.usecase.update_book(BookId::new(id), req.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/books/{id}
pub async fn delete_book(
    State(state): State<Arc<BookState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let summary = state.usecase.delete_book(BookId::new(id)).await?;
    Ok(deleted(summary))
}
