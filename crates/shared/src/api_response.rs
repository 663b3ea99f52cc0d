//! # API レスポンスエンベロープ
//!
//! 成功レスポンスの統一形式 `{ "data": T }` を提供する。

use serde::{Deserialize, Serialize};

/// 成功レスポンスの統一型
///
/// Book Service のすべてのエンドポイントは、ボディを返す場合
/// `{ "data": T }` 形式で返す。204 No Content の場合はボディを持たない。
///
/// ## 使用例
///
/// ```
/// use bookshelf_shared::ApiResponse;
///
/// let response = ApiResponse::new(4.0);
/// assert_eq!(response.data, 4.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// 新しい `ApiResponse` を作成する
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_serializeでdataキーに包まれる() {
        let response = ApiResponse::new("France");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json, serde_json::json!({ "data": "France" }));
    }

    #[test]
    fn test_vecペイロードは配列としてシリアライズされる() {
        let response = ApiResponse::new(vec![1, 2, 3]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json, serde_json::json!({ "data": [1, 2, 3] }));
    }

    #[test]
    fn test_deserializeでjsonからオブジェクトに変換する() {
        let json = r#"{"data": {"id": 1}}"#;
        let response: ApiResponse<serde_json::Value> = serde_json::from_str(json).unwrap();

        assert_eq!(response.data["id"], 1);
    }
}
