//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - リソースごとにサブモジュールに配置し、ルーターからは `country::get_country` のように参照する
//! - ハンドラは薄く保ち、ビジネスロジックはユースケース層に委譲
//! - 成功レスポンスは `{ "data": ... }`、エラーは Problem Details で返す
//!
//! ## ステータスコード
//!
//! | 操作 | 成功時 |
//! |------|--------|
//! | 取得 | 200 |
//! | 作成 | 201 + `Location` ヘッダ |
//! | 更新・削除 | 204（ボディなし） |

pub mod author;
pub mod book;
pub mod category;
pub mod country;
pub mod health;
pub mod review;
pub mod reviewer;

use std::fmt::Display;

pub use author::AuthorState;
use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
pub use book::BookState;
use bookshelf_shared::ApiResponse;
pub use category::CategoryState;
pub use country::CountryState;
pub use health::{ReadinessState, health_check, readiness_check};
use itertools::Itertools;
pub use review::ReviewState;
pub use reviewer::ReviewerState;
use serde::Serialize;

use crate::{app::API_BASE_PATH, error::CoreError, usecase::DeletionSummary};

/// 200 OK + `{ "data": ... }`
pub(crate) fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::new(data))).into_response()
}

/// 201 Created + `Location: /api/v1/<resource>/<id>`
pub(crate) fn created<T: Serialize>(resource: &str, id: impl Display, data: T) -> Response {
    let location = format!("{API_BASE_PATH}/{resource}/{id}");
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ApiResponse::new(data)),
    )
        .into_response()
}

/// 削除結果をログに残して 204 を返す
pub(crate) fn deleted(summary: DeletionSummary) -> StatusCode {
    if !summary.cascaded.is_empty() {
        tracing::debug!(
            entity = %summary.entity,
            id = summary.id,
            cascaded = %summary
                .cascaded
                .iter()
                .map(|c| format!("{}={}", c.dependent, c.removed))
                .join(","),
            "依存データを合わせて削除しました"
        );
    }
    StatusCode::NO_CONTENT
}

/// PUT のボディに含まれる `id` がパスの ID と一致することを確認する
pub(crate) fn ensure_same_id(path_id: i32, body_id: Option<i32>) -> Result<(), CoreError> {
    match body_id {
        Some(body_id) if body_id == path_id => Ok(()),
        Some(body_id) => Err(CoreError::BadRequest(format!(
            "パスの ID（{path_id}）とボディの id（{body_id}）が一致しません"
        ))),
        None => Err(CoreError::BadRequest(
            "更新リクエストには id が必要です".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use bookshelf_domain::integrity::{Dependent, EntityKind};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::usecase::CascadeCount;

    #[rstest]
    #[case(1, Some(1), true)]
    #[case(1, Some(2), false)]
    #[case(1, None, false)]
    fn test_ensure_same_idはボディのidが一致するときだけ通す(
        #[case] path_id: i32,
        #[case] body_id: Option<i32>,
        #[case] expected_ok: bool,
    ) {
        let result = ensure_same_id(path_id, body_id);

        assert_eq!(result.is_ok(), expected_ok);
        if let Err(err) = result {
            assert!(matches!(err, CoreError::BadRequest(_)));
        }
    }

    #[test]
    fn test_createdはlocationヘッダを付ける() {
        let response = created("countries", 7, serde_json::json!({ "id": 7 }));

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/api/v1/countries/7"
        );
    }

    #[test]
    fn test_deletedは204を返す() {
        let summary = DeletionSummary {
            entity:   EntityKind::Reviewer,
            id:       1,
            cascaded: vec![CascadeCount {
                dependent: Dependent::Rows(EntityKind::Review),
                removed:   3,
            }],
        };

        assert_eq!(deleted(summary), StatusCode::NO_CONTENT);
    }
}
