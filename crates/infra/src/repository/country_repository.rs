//! # CountryRepository
//!
//! 国の永続化を担当するリポジトリ。
//!
//! 国名の一意性は `UPPER(TRIM(name))` の一意インデックスで保証される。
//! 重複の事前チェックは [`IntegrityRepository`](super::IntegrityRepository) が担当する。

use async_trait::async_trait;
use bookshelf_domain::{
    author::AuthorId,
    country::{Country, CountryId, CountryName, NewCountry},
};
use sqlx::PgPool;

use crate::{db::TxContext, error::InfraError};

/// 国リポジトリトレイト
#[async_trait]
pub trait CountryRepository: Send + Sync {
    /// すべての国を名前順で取得する
    async fn find_all(&self) -> Result<Vec<Country>, InfraError>;

    /// ID で国を検索する
    async fn find_by_id(&self, id: CountryId) -> Result<Option<Country>, InfraError>;

    /// 著者が所属する国を取得する
    async fn find_by_author(&self, author_id: AuthorId) -> Result<Option<Country>, InfraError>;

    /// 国を挿入し、採番された ID を含むエンティティを返す
    async fn insert(&self, tx: &mut TxContext, draft: &NewCountry) -> Result<Country, InfraError>;

    /// 国を更新する
    async fn update(&self, tx: &mut TxContext, country: &Country) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の CountryRepository
#[derive(Debug, Clone)]
pub struct PostgresCountryRepository {
    pool: PgPool,
}

impl PostgresCountryRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CountryRow {
    id:   i32,
    name: String,
}

impl TryFrom<CountryRow> for Country {
    type Error = InfraError;

    fn try_from(row: CountryRow) -> Result<Self, Self::Error> {
        let name = CountryName::new(row.name)
            .map_err(|e| InfraError::unexpected(format!("不正な国データ(id={}): {e}", row.id)))?;
        Ok(Country::from_db(CountryId::new(row.id), name))
    }
}

#[async_trait]
impl CountryRepository for PostgresCountryRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Country>, InfraError> {
        let rows = sqlx::query_as::<_, CountryRow>(
            r#"
            SELECT id, name
            FROM countries
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Country::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: CountryId) -> Result<Option<Country>, InfraError> {
        let row = sqlx::query_as::<_, CountryRow>(
            r#"
            SELECT id, name
            FROM countries
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Country::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%author_id))]
    async fn find_by_author(&self, author_id: AuthorId) -> Result<Option<Country>, InfraError> {
        let row = sqlx::query_as::<_, CountryRow>(
            r#"
            SELECT c.id, c.name
            FROM countries c
            INNER JOIN authors a ON a.country_id = c.id
            WHERE a.id = $1
            "#,
        )
        .bind(author_id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Country::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert(&self, tx: &mut TxContext, draft: &NewCountry) -> Result<Country, InfraError> {
        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO countries (name)
            VALUES ($1)
            RETURNING id
            "#,
        )
        .bind(draft.name.as_str())
        .fetch_one(tx.conn()?)
        .await?;

        Ok(Country::from_db(CountryId::new(id), draft.name.clone()))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %country.id()))]
    async fn update(&self, tx: &mut TxContext, country: &Country) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE countries
            SET name = $2
            WHERE id = $1
            "#,
        )
        .bind(country.id().as_i32())
        .bind(country.name().as_str())
        .execute(tx.conn()?)
        .await?;

        Ok(())
    }
}
