//! # エラーレスポンス（RFC 9457 Problem Details）
//!
//! Book Service のエラーレスポンス構造体を提供する。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換はサービス側の責務（shared に axum 依存を入れない）
//! - よく使うエラー種別は便利コンストラクタで提供し、URI のハードコードを排除

use serde::{Deserialize, Serialize};

/// error_type URI のベースパス
const ERROR_TYPE_BASE: &str = "https://bookshelf.example.com/errors";

/// エラーレスポンス（RFC 9457 Problem Details）
///
/// `type` フィールドは URI で問題の種類を識別する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title:      String,
    pub status:     u16,
    pub detail:     String,
}

impl ErrorResponse {
    /// 汎用コンストラクタ
    ///
    /// `error_type_suffix` はベース URI に付加される（例: `"not-found"`）。
    pub fn new(
        error_type_suffix: &str,
        title: impl Into<String>,
        status: u16,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            error_type: format!("{ERROR_TYPE_BASE}/{error_type_suffix}"),
            title: title.into(),
            status,
            detail: detail.into(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new("bad-request", "Bad Request", 400, detail)
    }

    /// 404 Not Found
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new("not-found", "Not Found", 404, detail)
    }

    /// 409 Conflict
    ///
    /// 依存データが残っているため削除できない場合に使用する。
    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::new("conflict", "Conflict", 409, detail)
    }

    /// 422 Unprocessable Entity
    ///
    /// 一意であるべき値（名前、ISBN）が既存データと重複した場合に使用する。
    pub fn duplicate(detail: impl Into<String>) -> Self {
        Self::new("duplicate", "Unprocessable Entity", 422, detail)
    }

    /// 500 Internal Server Error
    ///
    /// detail は固定値（内部情報を漏らさないため）。
    pub fn internal_error() -> Self {
        Self::new(
            "internal-error",
            "Internal Server Error",
            500,
            "内部エラーが発生しました",
        )
    }

    /// 503 Service Unavailable
    pub fn service_unavailable(detail: impl Into<String>) -> Self {
        Self::new("service-unavailable", "Service Unavailable", 503, detail)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_new_で全フィールドが正しく設定される() {
        let error = ErrorResponse::new("custom-error", "Custom Error", 418, "カスタムエラー");

        assert_eq!(
            error,
            ErrorResponse {
                error_type: "https://bookshelf.example.com/errors/custom-error".to_string(),
                title:      "Custom Error".to_string(),
                status:     418,
                detail:     "カスタムエラー".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_が422と正しいerror_typeを返す() {
        let error = ErrorResponse::duplicate("国名 France は既に登録されています");

        assert_eq!(
            error.error_type,
            "https://bookshelf.example.com/errors/duplicate"
        );
        assert_eq!(error.title, "Unprocessable Entity");
        assert_eq!(error.status, 422);
    }

    #[test]
    fn test_internal_error_が500と固定detailを返す() {
        let error = ErrorResponse::internal_error();

        assert_eq!(error.status, 500);
        assert_eq!(error.detail, "内部エラーが発生しました");
    }

    #[test]
    fn test_jsonシリアライズでtypeフィールド名が正しい() {
        let error = ErrorResponse::bad_request("不正なリクエスト");
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "type": "https://bookshelf.example.com/errors/bad-request",
                "title": "Bad Request",
                "status": 400,
                "detail": "不正なリクエスト",
            })
        );
    }

    #[rstest]
    #[case(ErrorResponse::bad_request(""), 400)]
    #[case(ErrorResponse::not_found(""), 404)]
    #[case(ErrorResponse::conflict(""), 409)]
    #[case(ErrorResponse::duplicate(""), 422)]
    #[case(ErrorResponse::internal_error(), 500)]
    #[case(ErrorResponse::service_unavailable(""), 503)]
    fn test_便利コンストラクタのstatusが正しい(
        #[case] error: ErrorResponse,
        #[case] expected: u16,
    ) {
        assert_eq!(error.status, expected);
    }
}
