//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するエンティティ生成ヘルパー。
//! Rust の統合テスト規約に従い `tests/common/mod.rs` に配置。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use bookshelf_domain::{
    author::{Author, AuthorId, NewAuthor},
    book::{Book, NewBook},
    category::{Category, CategoryId, NewCategory},
    country::{Country, CountryId, NewCountry},
    review::{NewReview, Review},
    reviewer::{NewReviewer, Reviewer},
};
use bookshelf_infra::{
    db::{PgTransactionManager, TransactionManager},
    repository::{
        AuthorRepository,
        BookRepository,
        CategoryRepository,
        CountryRepository,
        PostgresAuthorRepository,
        PostgresBookRepository,
        PostgresCategoryRepository,
        PostgresCountryRepository,
        PostgresReviewRepository,
        PostgresReviewerRepository,
        ReviewRepository,
        ReviewerRepository,
    },
};
use sqlx::PgPool;

pub async fn insert_country(pool: &PgPool, name: &str) -> Country {
    let mut tx = PgTransactionManager::new(pool.clone()).begin().await.unwrap();
    let country = PostgresCountryRepository::new(pool.clone())
        .insert(&mut tx, &NewCountry::new(name).unwrap())
        .await
        .unwrap();
    tx.commit().await.unwrap();
    country
}

pub async fn insert_author(pool: &PgPool, last_name: &str, country_id: CountryId) -> Author {
    let mut tx = PgTransactionManager::new(pool.clone()).begin().await.unwrap();
    let author = PostgresAuthorRepository::new(pool.clone())
        .insert(
            &mut tx,
            &NewAuthor::new("Test", last_name, country_id).unwrap(),
        )
        .await
        .unwrap();
    tx.commit().await.unwrap();
    author
}

pub async fn insert_category(pool: &PgPool, name: &str) -> Category {
    let mut tx = PgTransactionManager::new(pool.clone()).begin().await.unwrap();
    let category = PostgresCategoryRepository::new(pool.clone())
        .insert(&mut tx, &NewCategory::new(name).unwrap())
        .await
        .unwrap();
    tx.commit().await.unwrap();
    category
}

/// 書籍と関連行を 1 トランザクションで作成する
pub async fn insert_book(
    pool: &PgPool,
    isbn: &str,
    title: &str,
    author_ids: &[AuthorId],
    category_ids: &[CategoryId],
) -> Book {
    let repo = PostgresBookRepository::new(pool.clone());
    let mut tx = PgTransactionManager::new(pool.clone()).begin().await.unwrap();
    let book = repo
        .insert(&mut tx, &NewBook::new(isbn, title, None).unwrap())
        .await
        .unwrap();
    repo.replace_authors(&mut tx, book.id(), author_ids)
        .await
        .unwrap();
    repo.replace_categories(&mut tx, book.id(), category_ids)
        .await
        .unwrap();
    tx.commit().await.unwrap();
    book
}

pub async fn insert_reviewer(pool: &PgPool, last_name: &str) -> Reviewer {
    let mut tx = PgTransactionManager::new(pool.clone()).begin().await.unwrap();
    let reviewer = PostgresReviewerRepository::new(pool.clone())
        .insert(&mut tx, &NewReviewer::new("Test", last_name).unwrap())
        .await
        .unwrap();
    tx.commit().await.unwrap();
    reviewer
}

pub async fn insert_review(pool: &PgPool, book: &Book, reviewer: &Reviewer, rating: i32) -> Review {
    let mut tx = PgTransactionManager::new(pool.clone()).begin().await.unwrap();
    let review = PostgresReviewRepository::new(pool.clone())
        .insert(
            &mut tx,
            &NewReview::new("見出し", "本文", rating, book.id(), reviewer.id()).unwrap(),
        )
        .await
        .unwrap();
    tx.commit().await.unwrap();
    review
}
