//! # リクエスト抽出
//!
//! axum 標準の `Json` は本文の形式不正を 415 / 422 で返すが、
//! このサービスでは 422 を一意項目の重複に割り当てている。
//! そのため JSON の読み取り失敗はすべて 400 Bad Request に揃える。
//! パスパラメータの解析失敗も同じく Problem Details の 400 で返す。

use axum::extract::{
    FromRequest,
    FromRequestParts,
    rejection::{JsonRejection, PathRejection},
};

use crate::error::CoreError;

/// JSON ボディ抽出（失敗時は [`CoreError::BadRequest`]）
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(CoreError))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for CoreError {
    fn from(rejection: JsonRejection) -> Self {
        CoreError::BadRequest(rejection.body_text())
    }
}

/// パスパラメータ抽出（失敗時は [`CoreError::BadRequest`]）
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(CoreError))]
pub struct PathId<T>(pub T);

impl From<PathRejection> for CoreError {
    fn from(rejection: PathRejection) -> Self {
        CoreError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode, header},
        routing::{get, post},
    };
    use rstest::rstest;
    use serde::Deserialize;
    use tower::ServiceExt;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        name: String,
    }

    async fn accept(JsonBody(_payload): JsonBody<Payload>) -> StatusCode {
        StatusCode::NO_CONTENT
    }

    async fn echo(PathId(id): PathId<i32>) -> String {
        id.to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/", post(accept))
            .route("/items/{id}", get(echo))
    }

    #[rstest]
    #[case(Some("application/json"), r#"{"name": "France"}"#, StatusCode::NO_CONTENT)]
    #[case(Some("application/json"), r#"{"name": "#, StatusCode::BAD_REQUEST)]
    #[case(Some("application/json"), r#"{"title": "France"}"#, StatusCode::BAD_REQUEST)]
    #[case(Some("application/json"), "", StatusCode::BAD_REQUEST)]
    #[case(None, r#"{"name": "France"}"#, StatusCode::BAD_REQUEST)]
    #[tokio::test]
    async fn test_json読み取り失敗はすべて400になる(
        #[case] content_type: Option<&str>,
        #[case] body: &'static str,
        #[case] expected: StatusCode,
    ) {
        let mut builder = Request::builder().method(Method::POST).uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body)).unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), expected);
    }

    #[rstest]
    #[case("/items/42", StatusCode::OK)]
    #[case("/items/abc", StatusCode::BAD_REQUEST)]
    #[case("/items/99999999999", StatusCode::BAD_REQUEST)]
    #[tokio::test]
    async fn test_数値でないパスパラメータは400になる(
        #[case] uri: &str,
        #[case] expected: StatusCode,
    ) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), expected);
    }
}
