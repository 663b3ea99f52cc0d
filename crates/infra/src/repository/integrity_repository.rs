//! # IntegrityRepository
//!
//! 参照整合性チェックとカスケード削除を、エンティティ種別ごとに複製せず
//! 1 つの実装で提供するリポジトリ。
//!
//! ## 設計方針
//!
//! - **メタデータ駆動**: ドメイン層の関係テーブル（[`RELATIONS`](bookshelf_domain::integrity::RELATIONS)）
//!   を、ここで具体的なテーブル名・外部キー列に対応付ける
//! - **識別子は静的文字列のみ**: SQL に埋め込むテーブル名・列名は列挙型から
//!   引いた `&'static str` に限定し、リクエスト由来の値は必ずバインドする
//! - **一意性の比較は DB 側**: `UPPER(TRIM(..))` で比較し、一意インデックスと
//!   同じ正規化を使う

use async_trait::async_trait;
use bookshelf_domain::integrity::{Dependent, EntityKind, JoinTable, Relation, UniqueField};
use sqlx::PgPool;

use crate::{db::TxContext, error::InfraError};

/// 参照整合性リポジトリトレイト
#[async_trait]
pub trait IntegrityRepository: Send + Sync {
    /// 指定した ID の行が存在するか
    async fn exists(&self, kind: EntityKind, id: i32) -> Result<bool, InfraError>;

    /// 正規化後に `candidate` と一致する一意項目を持つ行があるか
    ///
    /// 更新時は `exclude` に自身の ID を渡して比較対象から外す。
    /// 一意項目を持たないエンティティは常に `false` を返す。
    async fn has_duplicate(
        &self,
        kind: EntityKind,
        exclude: Option<i32>,
        candidate: &str,
    ) -> Result<bool, InfraError>;

    /// 親を参照している依存データの件数を数える
    async fn count_dependents(&self, relation: &Relation, parent_id: i32)
    -> Result<i64, InfraError>;

    /// 親を参照している依存データを削除し、削除件数を返す
    async fn delete_dependents(
        &self,
        tx: &mut TxContext,
        relation: &Relation,
        parent_id: i32,
    ) -> Result<u64, InfraError>;

    /// 行を削除し、削除件数を返す
    async fn delete_row(
        &self,
        tx: &mut TxContext,
        kind: EntityKind,
        id: i32,
    ) -> Result<u64, InfraError>;
}

/// エンティティ種別に対応するテーブル名
pub(crate) fn table_of(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Country => "countries",
        EntityKind::Author => "authors",
        EntityKind::Category => "categories",
        EntityKind::Book => "books",
        EntityKind::Reviewer => "reviewers",
        EntityKind::Review => "reviews",
    }
}

fn unique_column(field: UniqueField) -> &'static str {
    match field {
        UniqueField::Name => "name",
        UniqueField::Isbn => "isbn",
    }
}

/// 関係の依存側テーブルと、親を指す外部キー列
fn dependent_target(relation: &Relation) -> Result<(&'static str, &'static str), InfraError> {
    let target = match (relation.parent, relation.dependent) {
        (EntityKind::Country, Dependent::Rows(EntityKind::Author)) => ("authors", "country_id"),
        (EntityKind::Book, Dependent::Rows(EntityKind::Review)) => ("reviews", "book_id"),
        (EntityKind::Reviewer, Dependent::Rows(EntityKind::Review)) => ("reviews", "reviewer_id"),
        (EntityKind::Author, Dependent::Links(JoinTable::BookAuthor)) => {
            ("book_authors", "author_id")
        }
        (EntityKind::Book, Dependent::Links(JoinTable::BookAuthor)) => ("book_authors", "book_id"),
        (EntityKind::Category, Dependent::Links(JoinTable::BookCategory)) => {
            ("book_categories", "category_id")
        }
        (EntityKind::Book, Dependent::Links(JoinTable::BookCategory)) => {
            ("book_categories", "book_id")
        }
        (parent, dependent) => {
            return Err(InfraError::unexpected(format!(
                "未対応の関係です: {parent} -> {dependent}"
            )));
        }
    };
    Ok(target)
}

/// PostgreSQL 実装の IntegrityRepository
#[derive(Debug, Clone)]
pub struct PostgresIntegrityRepository {
    pool: PgPool,
}

impl PostgresIntegrityRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IntegrityRepository for PostgresIntegrityRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%kind, id = id))]
    async fn exists(&self, kind: EntityKind, id: i32) -> Result<bool, InfraError> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            table_of(kind)
        );
        let (exists,): (bool,) = sqlx::query_as(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%kind, ?exclude))]
    async fn has_duplicate(
        &self,
        kind: EntityKind,
        exclude: Option<i32>,
        candidate: &str,
    ) -> Result<bool, InfraError> {
        let Some(field) = kind.unique_field() else {
            return Ok(false);
        };

        let column = unique_column(field);
        let sql = format!(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM {table}
                WHERE UPPER(TRIM({column})) = UPPER(TRIM($1))
                  AND ($2::int4 IS NULL OR id <> $2)
            )
            "#,
            table = table_of(kind),
        );
        let (duplicated,): (bool,) = sqlx::query_as(&sql)
            .bind(candidate)
            .bind(exclude)
            .fetch_one(&self.pool)
            .await?;

        Ok(duplicated)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(parent = %relation.parent, dependent = %relation.dependent, parent_id = parent_id))]
    async fn count_dependents(
        &self,
        relation: &Relation,
        parent_id: i32,
    ) -> Result<i64, InfraError> {
        let (table, column) = dependent_target(relation)?;
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE {column} = $1");
        let (count,): (i64,) = sqlx::query_as(&sql)
            .bind(parent_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(parent = %relation.parent, dependent = %relation.dependent, parent_id = parent_id))]
    async fn delete_dependents(
        &self,
        tx: &mut TxContext,
        relation: &Relation,
        parent_id: i32,
    ) -> Result<u64, InfraError> {
        let (table, column) = dependent_target(relation)?;
        let sql = format!("DELETE FROM {table} WHERE {column} = $1");
        let result = sqlx::query(&sql)
            .bind(parent_id)
            .execute(tx.conn()?)
            .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%kind, id = id))]
    async fn delete_row(
        &self,
        tx: &mut TxContext,
        kind: EntityKind,
        id: i32,
    ) -> Result<u64, InfraError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table_of(kind));
        let result = sqlx::query(&sql).bind(id).execute(tx.conn()?).await?;

        Ok(result.rows_affected())
    }
}
