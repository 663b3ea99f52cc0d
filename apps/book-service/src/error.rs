//! # Book Service エラー定義
//!
//! Book Service 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! | バリアント | HTTP ステータス |
//! |-----------|----------------|
//! | `BadRequest` | 400 |
//! | `NotFound` | 404 |
//! | `Conflict` | 409 |
//! | `Duplicate` | 422 |
//! | `Database` / `Internal` | 500 |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bookshelf_domain::DomainError;
use bookshelf_infra::InfraError;
use bookshelf_shared::{ErrorResponse, event_log::error};
use thiserror::Error;

/// Book Service で発生するエラー
#[derive(Debug, Error)]
pub enum CoreError {
    /// 不正なリクエスト（JSON 不正、入力値検証、パスとボディの ID 不一致）
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// リソース、または参照先のリソースが見つからない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 依存データが残っているため削除できない
    #[error("競合が発生しました: {0}")]
    Conflict(String),

    /// 一意項目の重複
    #[error("重複しています: {0}")]
    Duplicate(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(InfraError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::BadRequest(msg),
            e @ DomainError::NotFound { .. } => Self::NotFound(e.to_string()),
            DomainError::Conflict(msg) => Self::Conflict(msg),
            DomainError::Duplicate(msg) => Self::Duplicate(msg),
        }
    }
}

/// 一意インデックス違反は事前チェックをすり抜けた重複なので 422 に寄せる
impl From<InfraError> for CoreError {
    fn from(err: InfraError) -> Self {
        match err.as_unique_violation() {
            Some(constraint) => Self::Duplicate(format!(
                "既に登録されている値と重複しています（{constraint}）"
            )),
            None => Self::Database(err),
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            CoreError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg)),
            CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::not_found(msg)),
            CoreError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse::conflict(msg)),
            CoreError::Duplicate(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::duplicate(msg),
            ),
            CoreError::Database(e) => {
                tracing::error!(
                    error.category = error::category::INFRASTRUCTURE,
                    error.kind = error::kind::DATABASE,
                    span_trace = %e.span_trace(),
                    "データベースエラー: {}",
                    e
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal_error(),
                )
            }
            CoreError::Internal(msg) => {
                tracing::error!(
                    error.category = error::category::INFRASTRUCTURE,
                    error.kind = error::kind::INTERNAL,
                    "内部エラー: {}",
                    msg
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal_error(),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
