//! # Book Service アプリケーション構築
//!
//! リポジトリ → ユースケース → State → Router の順に組み立てる。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。

use std::sync::Arc;

use axum::{Router, routing::get};
use bookshelf_infra::{
    db::{PgTransactionManager, TransactionManager},
    repository::{
        AuthorRepository,
        BookRepository,
        CategoryRepository,
        CountryRepository,
        IntegrityRepository,
        PostgresAuthorRepository,
        PostgresBookRepository,
        PostgresCategoryRepository,
        PostgresCountryRepository,
        PostgresIntegrityRepository,
        PostgresReviewRepository,
        PostgresReviewerRepository,
        ReviewRepository,
        ReviewerRepository,
    },
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        AuthorState,
        BookState,
        CategoryState,
        CountryState,
        ReadinessState,
        ReviewState,
        ReviewerState,
        author,
        book,
        category,
        country,
        health_check,
        readiness_check,
        review,
        reviewer,
    },
    usecase::{
        AuthorUseCaseImpl,
        BookUseCaseImpl,
        CategoryUseCaseImpl,
        CountryUseCaseImpl,
        IntegrityGuard,
        ReviewUseCaseImpl,
        ReviewerUseCaseImpl,
    },
};

/// API のベースパス
pub const API_BASE_PATH: &str = "/api/v1";

/// ユースケースが依存するリポジトリ一式
#[derive(Clone)]
pub struct CatalogRepositories {
    pub countries:  Arc<dyn CountryRepository>,
    pub authors:    Arc<dyn AuthorRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub books:      Arc<dyn BookRepository>,
    pub reviews:    Arc<dyn ReviewRepository>,
    pub reviewers:  Arc<dyn ReviewerRepository>,
    pub integrity:  Arc<dyn IntegrityRepository>,
    pub tx_manager: Arc<dyn TransactionManager>,
}

impl CatalogRepositories {
    /// PostgreSQL 実装で組み立てる
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            countries:  Arc::new(PostgresCountryRepository::new(pool.clone())),
            authors:    Arc::new(PostgresAuthorRepository::new(pool.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(pool.clone())),
            books:      Arc::new(PostgresBookRepository::new(pool.clone())),
            reviews:    Arc::new(PostgresReviewRepository::new(pool.clone())),
            reviewers:  Arc::new(PostgresReviewerRepository::new(pool.clone())),
            integrity:  Arc::new(PostgresIntegrityRepository::new(pool.clone())),
            tx_manager: Arc::new(PgTransactionManager::new(pool)),
        }
    }
}

/// リソースごとのユースケース
pub struct UseCases {
    pub country:  CountryUseCaseImpl,
    pub author:   AuthorUseCaseImpl,
    pub category: CategoryUseCaseImpl,
    pub book:     BookUseCaseImpl,
    pub review:   ReviewUseCaseImpl,
    pub reviewer: ReviewerUseCaseImpl,
}

impl UseCases {
    pub fn new(repos: CatalogRepositories) -> Self {
        let guard = IntegrityGuard::new(repos.integrity.clone(), repos.tx_manager.clone());

        Self {
            country:  CountryUseCaseImpl::new(
                repos.countries.clone(),
                repos.authors.clone(),
                guard.clone(),
                repos.tx_manager.clone(),
            ),
            author:   AuthorUseCaseImpl::new(
                repos.authors.clone(),
                repos.books.clone(),
                guard.clone(),
                repos.tx_manager.clone(),
            ),
            category: CategoryUseCaseImpl::new(
                repos.categories.clone(),
                repos.books.clone(),
                guard.clone(),
                repos.tx_manager.clone(),
            ),
            book:     BookUseCaseImpl::new(
                repos.books.clone(),
                guard.clone(),
                repos.tx_manager.clone(),
            ),
            review:   ReviewUseCaseImpl::new(
                repos.reviews.clone(),
                repos.books.clone(),
                guard.clone(),
                repos.tx_manager.clone(),
            ),
            reviewer: ReviewerUseCaseImpl::new(
                repos.reviewers,
                repos.reviews,
                guard,
                repos.tx_manager,
            ),
        }
    }
}

/// `/api/v1` 配下のルーターを構築する
pub fn build_api_router(usecases: UseCases) -> Router {
    let country_state = Arc::new(CountryState {
        usecase: usecases.country,
    });
    let author_state = Arc::new(AuthorState {
        usecase: usecases.author,
    });
    let category_state = Arc::new(CategoryState {
        usecase: usecases.category,
    });
    let book_state = Arc::new(BookState {
        usecase: usecases.book,
    });
    let review_state = Arc::new(ReviewState {
        usecase: usecases.review,
    });
    let reviewer_state = Arc::new(ReviewerState {
        usecase: usecases.reviewer,
    });

    let countries = Router::new()
        .route(
            "/countries",
            get(country::list_countries).post(country::create_country),
        )
        .route(
            "/countries/{id}",
            get(country::get_country)
                .put(country::update_country)
                .delete(country::delete_country),
        )
        .route("/countries/{id}/authors", get(country::list_authors_of_country))
        .route(
            "/countries/authors/{author_id}",
            get(country::get_country_of_author),
        )
        .with_state(country_state);

    let authors = Router::new()
        .route(
            "/authors",
            get(author::list_authors).post(author::create_author),
        )
        .route(
            "/authors/{id}",
            get(author::get_author)
                .put(author::update_author)
                .delete(author::delete_author),
        )
        .route("/authors/{id}/books", get(author::list_books_of_author))
        .route("/authors/book/{book_id}", get(author::list_authors_of_book))
        .with_state(author_state);

    let categories = Router::new()
        .route(
            "/categories",
            get(category::list_categories).post(category::create_category),
        )
        .route(
            "/categories/{id}",
            get(category::get_category)
                .put(category::update_category)
                .delete(category::delete_category),
        )
        .route(
            "/categories/{id}/books",
            get(category::list_books_of_category),
        )
        .route(
            "/categories/books/{book_id}",
            get(category::list_categories_of_book),
        )
        .with_state(category_state);

    let books = Router::new()
        .route("/books", get(book::list_books).post(book::create_book))
        .route(
            "/books/{id}",
            get(book::get_book)
                .put(book::update_book)
                .delete(book::delete_book),
        )
        .route("/books/isbn/{isbn}", get(book::get_book_by_isbn))
        .route("/books/{id}/rating", get(book::get_book_rating))
        .with_state(book_state);

    let reviews = Router::new()
        .route(
            "/reviews",
            get(review::list_reviews).post(review::create_review),
        )
        .route(
            "/reviews/{id}",
            get(review::get_review)
                .put(review::update_review)
                .delete(review::delete_review),
        )
        .route("/reviews/{id}/book", get(review::get_book_of_review))
        .route("/reviews/book/{book_id}", get(review::list_reviews_of_book))
        .with_state(review_state);

    let reviewers = Router::new()
        .route(
            "/reviewers",
            get(reviewer::list_reviewers).post(reviewer::create_reviewer),
        )
        .route(
            "/reviewers/{id}",
            get(reviewer::get_reviewer)
                .put(reviewer::update_reviewer)
                .delete(reviewer::delete_reviewer),
        )
        .route(
            "/reviewers/{id}/reviews",
            get(reviewer::list_reviews_of_reviewer),
        )
        .route(
            "/reviewers/review/{review_id}",
            get(reviewer::get_reviewer_of_review),
        )
        .with_state(reviewer_state);

    Router::new().nest(
        API_BASE_PATH,
        countries
            .merge(authors)
            .merge(categories)
            .merge(books)
            .merge(reviews)
            .merge(reviewers),
    )
}

/// ヘルスチェックと API を束ねたアプリケーション全体のルーター
pub fn build_app(usecases: UseCases, readiness_state: Arc<ReadinessState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .with_state(readiness_state)
        .merge(build_api_router(usecases))
        .layer(TraceLayer::new_for_http())
}
