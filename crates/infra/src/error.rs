//! # インフラ層エラー定義
//!
//! データベースとの通信で発生するエラーを表現する。
//!
//! ## 設計方針
//!
//! - **エラーの変換**: `sqlx::Error` をラップし、一意制約違反だけは別種別に振り分ける
//! - **ドメインエラーとの分離**: インフラ固有のエラーを明示
//! - **SpanTrace 自動捕捉**: `From` 実装や convenience constructor で
//!   エラー生成時の呼び出し経路を自動記録する
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別（Database, UniqueViolation 等）

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// PostgreSQL の一意制約違反を表す SQLSTATE
const UNIQUE_VIOLATION: &str = "23505";

/// インフラ層で発生するエラー
///
/// エラー種別（[`InfraErrorKind`]）と [`SpanTrace`]（呼び出し経路）を保持する。
/// `From<sqlx::Error>` 等の変換や convenience constructor でエラーを生成すると、
/// その時点のスパン情報が自動的にキャプチャされる。
///
/// ## パターンマッチ
///
/// エラー種別に応じた処理には [`kind()`](InfraError::kind) を使用する:
///
/// ```ignore
/// match error.kind() {
///     InfraErrorKind::UniqueViolation { constraint, .. } => { /* 重複 */ }
///     _ => { /* その他 */ }
/// }
/// ```
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// データベースエラー
    ///
    /// SQL クエリの実行失敗、接続エラー、外部キー違反など。
    #[error("データベースエラー: {0}")]
    Database(#[source] sqlx::Error),

    /// 一意制約違反
    ///
    /// 事前チェックをすり抜けた同時書き込みを、一意インデックスが拒否した場合。
    /// ユースケース層で重複エラーに変換する。
    #[error("一意制約違反: {constraint}")]
    UniqueViolation {
        /// 違反した制約（インデックス）名
        constraint: String,
        #[source]
        source:     sqlx::Error,
    },

    /// 予期しないエラー
    ///
    /// 上記に分類できない予期しないエラー。
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

// ===== InfraError のメソッド =====

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// 一意制約違反の場合、制約名を返す
    pub fn as_unique_violation(&self) -> Option<&str> {
        match &self.kind {
            InfraErrorKind::UniqueViolation { constraint, .. } => Some(constraint),
            _ => None,
        }
    }

    /// InfraError を分解して InfraErrorKind と SpanTrace を取り出す
    pub fn into_parts(self) -> (InfraErrorKind, SpanTrace) {
        (self.kind, self.span_trace)
    }

    // ===== Convenience constructors =====

    /// 予期しないエラーを生成する
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::Unexpected(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }

    /// 一意制約違反を生成する
    ///
    /// インメモリ実装が一意インデックスの振る舞いを再現するために使う。
    pub fn unique_violation(constraint: impl Into<String>) -> Self {
        let constraint = constraint.into();
        Self {
            kind:       InfraErrorKind::UniqueViolation {
                source: sqlx::Error::Protocol(format!("unique violation: {constraint}")),
                constraint,
            },
            span_trace: SpanTrace::capture(),
        }
    }
}

// ===== トレイト実装 =====

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<sqlx::Error> for InfraError {
    fn from(source: sqlx::Error) -> Self {
        let constraint = source
            .as_database_error()
            .filter(|db_err| db_err.code().as_deref() == Some(UNIQUE_VIOLATION))
            .map(|db_err| db_err.constraint().unwrap_or_default().to_string());

        let kind = match constraint {
            Some(constraint) => InfraErrorKind::UniqueViolation { constraint, source },
            None => InfraErrorKind::Database(source),
        };

        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }
}
