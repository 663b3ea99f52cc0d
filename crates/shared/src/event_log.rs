//! # ビジネスイベントログとエラーコンテキストの構造化ヘルパー
//!
//! `jq` で効率的に調査できるよう、ログフィールドの命名規約と
//! ヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## エラーコンテキスト
//!
//! `tracing::error!` に `error.category` + `error.kind` フィールドを直接追加する。
//! 定数は [`error`] モジュールで提供。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.entity_type`: エンティティ種別（[`event::entity_type`] の定数を使用）
/// - `event.entity_id`: エンティティ ID
/// - `event.result`: 結果（[`event::result`] の定数を使用）
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const CATALOG: &str = "catalog";
    }

    /// イベントアクション
    pub mod action {
        pub const COUNTRY_CREATED: &str = "country.created";
        pub const COUNTRY_UPDATED: &str = "country.updated";
        pub const COUNTRY_DELETED: &str = "country.deleted";

        pub const AUTHOR_CREATED: &str = "author.created";
        pub const AUTHOR_UPDATED: &str = "author.updated";
        pub const AUTHOR_DELETED: &str = "author.deleted";

        pub const CATEGORY_CREATED: &str = "category.created";
        pub const CATEGORY_UPDATED: &str = "category.updated";
        pub const CATEGORY_DELETED: &str = "category.deleted";

        pub const BOOK_CREATED: &str = "book.created";
        pub const BOOK_UPDATED: &str = "book.updated";
        pub const BOOK_DELETED: &str = "book.deleted";

        pub const REVIEW_CREATED: &str = "review.created";
        pub const REVIEW_UPDATED: &str = "review.updated";
        pub const REVIEW_DELETED: &str = "review.deleted";

        pub const REVIEWER_CREATED: &str = "reviewer.created";
        pub const REVIEWER_UPDATED: &str = "reviewer.updated";
        pub const REVIEWER_DELETED: &str = "reviewer.deleted";

        /// 依存データが残っているため削除を拒否した
        pub const DELETE_BLOCKED: &str = "catalog.delete_blocked";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const COUNTRY: &str = "country";
        pub const AUTHOR: &str = "author";
        pub const CATEGORY: &str = "category";
        pub const BOOK: &str = "book";
        pub const REVIEW: &str = "review";
        pub const REVIEWER: &str = "reviewer";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// インフラストラクチャ（DB）
        pub const INFRASTRUCTURE: &str = "infrastructure";
    }

    /// エラー種別
    pub mod kind {
        pub const DATABASE: &str = "database";
        pub const INTERNAL: &str = "internal";
    }
}
