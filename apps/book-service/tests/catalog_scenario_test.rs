//! カタログ API のシナリオテスト
//!
//! インメモリ構成のルーターに HTTP リクエストを順に送り、
//! 作成・重複・参照先不在・削除ガード・カスケード削除の一連の流れを確認する。

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use bookshelf_book_service::test_utils::mock_api_router;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// 201 を確認して採番された ID を返す
async fn created_id(response: Response) -> i64 {
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_国と著者と書籍の登録シナリオで重複と参照先不在が拒否される() {
    let (app, _) = mock_api_router();

    // 国の作成
    let france = created_id(
        send(&app, Method::POST, "/api/v1/countries", Some(json!({ "name": "France" }))).await,
    )
    .await;

    // 正規化後に同じ国名は 422
    let response = send(
        &app,
        Method::POST,
        "/api/v1/countries",
        Some(json!({ "name": "france " })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let problem = json_body(response).await;
    assert_eq!(problem["status"], 422);
    assert_eq!(problem["type"], "https://bookshelf.example.com/errors/duplicate");

    // 存在しない国を指定した著者は 404
    let response = send(
        &app,
        Method::POST,
        "/api/v1/authors",
        Some(json!({ "first_name": "Victor", "last_name": "Hugo", "country_id": 999 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // 著者・カテゴリ・書籍の作成
    let hugo = created_id(
        send(
            &app,
            Method::POST,
            "/api/v1/authors",
            Some(json!({ "first_name": "Victor", "last_name": "Hugo", "country_id": france })),
        )
        .await,
    )
    .await;
    let novel = created_id(
        send(&app, Method::POST, "/api/v1/categories", Some(json!({ "name": "Novel" }))).await,
    )
    .await;
    let book = json!({
        "isbn": "X",
        "title": "Les Misérables",
        "author_ids": [hugo],
        "category_ids": [novel]
    });
    created_id(send(&app, Method::POST, "/api/v1/books", Some(book.clone())).await).await;

    // 既存の ISBN "X" での書籍作成は 422
    let response = send(&app, Method::POST, "/api/v1/books", Some(book)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // 著者のいる国、書籍に使われているカテゴリは削除できない
    let response = send(&app, Method::DELETE, &format!("/api/v1/countries/{france}"), None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let response = send(&app, Method::DELETE, &format!("/api/v1/categories/{novel}"), None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // 国の一覧は 1 件のまま
    let response = send(&app, Method::GET, "/api/v1/countries", None).await;
    let body = json_body(response).await;
    assert_eq!(body["data"], json!([{ "id": france, "name": "France" }]));
}

#[tokio::test]
async fn test_書籍を削除するとレビューが消えカテゴリが削除可能になる() {
    let (app, _) = mock_api_router();

    let japan = created_id(
        send(&app, Method::POST, "/api/v1/countries", Some(json!({ "name": "Japan" }))).await,
    )
    .await;
    let soseki = created_id(
        send(
            &app,
            Method::POST,
            "/api/v1/authors",
            Some(json!({ "first_name": "Soseki", "last_name": "Natsume", "country_id": japan })),
        )
        .await,
    )
    .await;
    let novel = created_id(
        send(&app, Method::POST, "/api/v1/categories", Some(json!({ "name": "Novel" }))).await,
    )
    .await;
    let book = created_id(
        send(
            &app,
            Method::POST,
            "/api/v1/books",
            Some(json!({
                "isbn": "4101010013",
                "title": "Kokoro",
                "author_ids": [soseki],
                "category_ids": [novel]
            })),
        )
        .await,
    )
    .await;
    let reviewer = created_id(
        send(
            &app,
            Method::POST,
            "/api/v1/reviewers",
            Some(json!({ "first_name": "Taro", "last_name": "Yamada" })),
        )
        .await,
    )
    .await;
    for rating in [3, 5] {
        created_id(
            send(
                &app,
                Method::POST,
                "/api/v1/reviews",
                Some(json!({
                    "headline": "感想",
                    "review_text": "よかった",
                    "rating": rating,
                    "book_id": book,
                    "reviewer_id": reviewer
                })),
            )
            .await,
        )
        .await;
    }

    let response = send(&app, Method::GET, &format!("/api/v1/books/{book}/rating"), None).await;
    assert_eq!(json_body(response).await["data"], 4.0);

    let response = send(&app, Method::DELETE, &format!("/api/v1/books/{book}"), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, Method::GET, "/api/v1/reviews", None).await;
    assert_eq!(json_body(response).await["data"], json!([]));
    let response = send(&app, Method::DELETE, &format!("/api/v1/categories/{novel}"), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = send(&app, Method::GET, &format!("/api/v1/authors/{soseki}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}
