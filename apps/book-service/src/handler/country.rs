//! # 国ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/v1/countries` - 国一覧（名前順）
//! - `GET /api/v1/countries/{id}` - 国の取得
//! - `GET /api/v1/countries/{id}/authors` - 国に所属する著者一覧
//! - `GET /api/v1/countries/authors/{author_id}` - 著者が所属する国
//! - `POST /api/v1/countries` - 国の作成
//! - `PUT /api/v1/countries/{id}` - 国の更新
//! - `DELETE /api/v1/countries/{id}` - 国の削除（著者がいれば 409）

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use bookshelf_domain::{
    author::AuthorId,
    country::{Country, CountryId},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::CoreError,
    extract::{JsonBody, PathId},
    handler::{author::AuthorDto, created, deleted, ensure_same_id, ok},
    usecase::{CountryUseCaseImpl, country::CountryInput},
};

/// 国 API の共有状態
pub struct CountryState {
    pub usecase: CountryUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// 国 DTO
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountryDto {
    pub id:   i32,
    pub name: String,
}

impl From<Country> for CountryDto {
    fn from(country: Country) -> Self {
        Self {
            id:   country.id().as_i32(),
            name: country.name().as_str().to_string(),
        }
    }
}

/// 国の作成・更新リクエスト（更新時は `id` 必須）
#[derive(Debug, Deserialize)]
pub struct CountryRequest {
    pub id:   Option<i32>,
    pub name: String,
}

impl From<CountryRequest> for CountryInput {
    fn from(req: CountryRequest) -> Self {
        Self { name: req.name }
    }
}

// --- ハンドラ ---

/// GET /api/v1/countries
pub async fn list_countries(
    State(state): State<Arc<CountryState>>,
) -> Result<impl IntoResponse, CoreError> {
    let countries = state.usecase.list_countries().await?;
    Ok(ok(countries.into_iter().map(CountryDto::from).collect::<Vec<_>>()))
}

/// GET /api/v1/countries/{id}
pub async fn get_country(
    State(state): State<Arc<CountryState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let country = state.usecase.get_country(CountryId::new(id)).await?;
    Ok(ok(CountryDto::from(country)))
}

/// GET /api/v1/countries/{id}/authors
pub async fn list_authors_of_country(
    State(state): State<Arc<CountryState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let authors = state.usecase.list_authors_of(CountryId::new(id)).await?;
    Ok(ok(authors.into_iter().map(AuthorDto::from).collect::<Vec<_>>()))
}

/// GET /api/v1/countries/authors/{author_id}
pub async fn get_country_of_author(
    State(state): State<Arc<CountryState>>,
    PathId(author_id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let country = state
        .usecase
        .get_country_of_author(AuthorId::new(author_id))
        .await?;
    Ok(ok(CountryDto::from(country)))
}

/// POST /api/v1/countries
///
/// ## レスポンス
///
/// - `201 Created`: 作成された国
/// - `400 Bad Request`: 国名が空、または 50 文字を超える
/// - `422 Unprocessable Entity`: 正規化後の国名が既存の国と重複
pub async fn create_country(
    State(state): State<Arc<CountryState>>,
    JsonBody(req): JsonBody<CountryRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let country = state.usecase.create_country(req.into()).await?;
    Ok(created("countries", country.id(), CountryDto::from(country)))
}

/// PUT /api/v1/countries/{id}
pub async fn update_country(
    State(state): State<Arc<CountryState>>,
    PathId(id): PathId<i32>,
    JsonBody(req): JsonBody<CountryRequest>,
) -> Result<impl IntoResponse, CoreError> {
    ensure_same_id(id, req.id)?;
    state
        .usecase
        .update_country(CountryId::new(id), req.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/countries/{id}
pub async fn delete_country(
    State(state): State<Arc<CountryState>>,
    PathId(id): PathId<i32>,
) -> Result<impl IntoResponse, CoreError> {
    let summary = state.usecase.delete_country(CountryId::new(id)).await?;
    Ok(deleted(summary))
}
