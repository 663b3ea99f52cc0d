//! # テスト用モックリポジトリ
//!
//! ユースケーステスト・ハンドラテストで使用するインメモリ実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! bookshelf-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! [`MockCatalog`] は全リポジトリトレイトを 1 つの共有テーブル集合の上に実装する。
//! 一意インデックス（正規化した国名・カテゴリ名・ISBN）も再現するため、
//! 事前チェックをすり抜けた重複書き込みは一意制約違反になる。
//!
//! 書き込み失敗の検証には [`MockCatalog::fail_writes_to`] で特定テーブルへの
//! 書き込みを失敗させる。[`MockTransactionManager::with_rollback`] で作った
//! マネージャは開始時のテーブルを保存し、コミットされずにドロップされた
//! トランザクションの変更を巻き戻す。同時に走るトランザクションの分離は再現しない。

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc,
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use bookshelf_domain::{
    author::{Author, AuthorId, NewAuthor},
    book::{Book, BookId, BookRating, NewBook},
    category::{Category, CategoryId, NewCategory},
    country::{Country, CountryId, NewCountry},
    integrity::{Dependent, EntityKind, JoinTable, Relation, normalize_unique_key},
    review::{NewReview, Review, ReviewId},
    reviewer::{NewReviewer, Reviewer, ReviewerId},
};

use crate::{
    db::{TransactionManager, TxContext},
    error::InfraError,
    repository::{
        AuthorRepository,
        BookRepository,
        CategoryRepository,
        CountryRepository,
        IntegrityRepository,
        ReviewRepository,
        ReviewerRepository,
        integrity_repository::table_of,
    },
};

// ===== CatalogTables =====

/// インメモリのテーブル集合
#[derive(Debug, Clone, Default)]
pub struct CatalogTables {
    pub countries:       Vec<Country>,
    pub authors:         Vec<Author>,
    pub categories:      Vec<Category>,
    pub books:           Vec<Book>,
    pub reviewers:       Vec<Reviewer>,
    pub reviews:         Vec<Review>,
    pub book_authors:    Vec<(BookId, AuthorId)>,
    pub book_categories: Vec<(BookId, CategoryId)>,
    sequences:           HashMap<EntityKind, i32>,
    failing:             HashSet<EntityKind>,
}

impl CatalogTables {
    fn next_id(&mut self, kind: EntityKind) -> i32 {
        let seq = self.sequences.entry(kind).or_insert(0);
        *seq += 1;
        *seq
    }

    fn check_writable(&self, kind: EntityKind) -> Result<(), InfraError> {
        if self.failing.contains(&kind) {
            return Err(InfraError::unexpected(format!(
                "{kind} への書き込みに失敗しました（注入された障害）"
            )));
        }
        Ok(())
    }

    /// 一意インデックスの再現
    fn check_unique(
        &self,
        kind: EntityKind,
        exclude: Option<i32>,
        candidate: &str,
    ) -> Result<(), InfraError> {
        if self.is_duplicate(kind, exclude, candidate) {
            return Err(InfraError::unique_violation(format!(
                "{}_unique_idx",
                table_of(kind)
            )));
        }
        Ok(())
    }

    fn is_duplicate(&self, kind: EntityKind, exclude: Option<i32>, candidate: &str) -> bool {
        let key = normalize_unique_key(candidate);
        let keys: Vec<(i32, &str)> = match kind {
            EntityKind::Country => self
                .countries
                .iter()
                .map(|c| (c.id().as_i32(), c.name().as_str()))
                .collect(),
            EntityKind::Category => self
                .categories
                .iter()
                .map(|c| (c.id().as_i32(), c.name().as_str()))
                .collect(),
            EntityKind::Book => self
                .books
                .iter()
                .map(|b| (b.id().as_i32(), b.isbn().as_str()))
                .collect(),
            EntityKind::Author | EntityKind::Reviewer | EntityKind::Review => Vec::new(),
        };

        keys.into_iter()
            .filter(|(id, _)| Some(*id) != exclude)
            .any(|(_, value)| normalize_unique_key(value) == key)
    }
}

// ===== MockCatalog =====

/// 全リポジトリトレイトを実装するインメモリカタログ
///
/// `Clone` しても同じテーブル集合を共有する。
#[derive(Clone, Default)]
pub struct MockCatalog {
    tables: Arc<Mutex<CatalogTables>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// テーブル集合を参照する
    pub fn with_tables<R>(&self, f: impl FnOnce(&CatalogTables) -> R) -> R {
        f(&self.tables.lock().unwrap())
    }

    /// 指定したエンティティのテーブルへの書き込みを失敗させる
    pub fn fail_writes_to(&self, kind: EntityKind) {
        self.tables.lock().unwrap().failing.insert(kind);
    }

    fn snapshot(&self) -> CatalogTables {
        self.tables.lock().unwrap().clone()
    }

    /// 保存したテーブルに戻す（採番と障害注入の設定は戻さない）
    fn restore(&self, snapshot: CatalogTables) {
        let mut tables = self.tables.lock().unwrap();
        let sequences = std::mem::take(&mut tables.sequences);
        let failing = std::mem::take(&mut tables.failing);
        *tables = CatalogTables {
            sequences,
            failing,
            ..snapshot
        };
    }

    // ===== シード =====

    pub fn seed_country(&self, name: &str) -> Country {
        let mut tables = self.tables.lock().unwrap();
        let id = CountryId::new(tables.next_id(EntityKind::Country));
        let country = Country::from_db(id, NewCountry::new(name).unwrap().name);
        tables.countries.push(country.clone());
        country
    }

    pub fn seed_author(&self, first_name: &str, last_name: &str, country_id: CountryId) -> Author {
        let mut tables = self.tables.lock().unwrap();
        let id = AuthorId::new(tables.next_id(EntityKind::Author));
        let draft = NewAuthor::new(first_name, last_name, country_id).unwrap();
        let author = Author::from_db(id, draft.first_name, draft.last_name, draft.country_id);
        tables.authors.push(author.clone());
        author
    }

    pub fn seed_category(&self, name: &str) -> Category {
        let mut tables = self.tables.lock().unwrap();
        let id = CategoryId::new(tables.next_id(EntityKind::Category));
        let category = Category::from_db(id, NewCategory::new(name).unwrap().name);
        tables.categories.push(category.clone());
        category
    }

    pub fn seed_book(
        &self,
        isbn: &str,
        title: &str,
        author_ids: &[AuthorId],
        category_ids: &[CategoryId],
    ) -> Book {
        let mut tables = self.tables.lock().unwrap();
        let id = BookId::new(tables.next_id(EntityKind::Book));
        let draft = NewBook::new(isbn, title, None).unwrap();
        let book = Book::from_db(id, draft.isbn, draft.title, draft.date_published);
        tables.books.push(book.clone());
        tables
            .book_authors
            .extend(author_ids.iter().map(|author_id| (id, *author_id)));
        tables
            .book_categories
            .extend(category_ids.iter().map(|category_id| (id, *category_id)));
        book
    }

    pub fn seed_reviewer(&self, first_name: &str, last_name: &str) -> Reviewer {
        let mut tables = self.tables.lock().unwrap();
        let id = ReviewerId::new(tables.next_id(EntityKind::Reviewer));
        let draft = NewReviewer::new(first_name, last_name).unwrap();
        let reviewer = Reviewer::from_db(id, draft.first_name, draft.last_name);
        tables.reviewers.push(reviewer.clone());
        reviewer
    }

    pub fn seed_review(&self, book_id: BookId, reviewer_id: ReviewerId, rating: i32) -> Review {
        let mut tables = self.tables.lock().unwrap();
        let id = ReviewId::new(tables.next_id(EntityKind::Review));
        let draft = NewReview::new("見出し", "本文", rating, book_id, reviewer_id).unwrap();
        let review = Review::from_db(id, draft);
        tables.reviews.push(review.clone());
        review
    }

    // ===== 検証用アクセサ =====

    /// 書籍に紐付く著者 ID（登録順）
    pub fn author_ids_of(&self, book_id: BookId) -> Vec<AuthorId> {
        self.with_tables(|t| {
            t.book_authors
                .iter()
                .filter(|(b, _)| *b == book_id)
                .map(|(_, a)| *a)
                .collect()
        })
    }

    /// 書籍に紐付くカテゴリ ID（登録順）
    pub fn category_ids_of(&self, book_id: BookId) -> Vec<CategoryId> {
        self.with_tables(|t| {
            t.book_categories
                .iter()
                .filter(|(b, _)| *b == book_id)
                .map(|(_, c)| *c)
                .collect()
        })
    }
}

#[async_trait]
impl CountryRepository for MockCatalog {
    async fn find_all(&self) -> Result<Vec<Country>, InfraError> {
        let mut countries = self.with_tables(|t| t.countries.clone());
        countries.sort_by(|a, b| a.name().as_str().cmp(b.name().as_str()));
        Ok(countries)
    }

    async fn find_by_id(&self, id: CountryId) -> Result<Option<Country>, InfraError> {
        Ok(self.with_tables(|t| t.countries.iter().find(|c| c.id() == id).cloned()))
    }

    async fn find_by_author(&self, author_id: AuthorId) -> Result<Option<Country>, InfraError> {
        Ok(self.with_tables(|t| {
            let author = t.authors.iter().find(|a| a.id() == author_id)?;
            t.countries
                .iter()
                .find(|c| c.id() == author.country_id())
                .cloned()
        }))
    }

    async fn insert(&self, _tx: &mut TxContext, draft: &NewCountry) -> Result<Country, InfraError> {
        let mut tables = self.tables.lock().unwrap();
        tables.check_writable(EntityKind::Country)?;
        tables.check_unique(EntityKind::Country, None, draft.name.as_str())?;
        let id = CountryId::new(tables.next_id(EntityKind::Country));
        let country = Country::from_db(id, draft.name.clone());
        tables.countries.push(country.clone());
        Ok(country)
    }

    async fn update(&self, _tx: &mut TxContext, country: &Country) -> Result<(), InfraError> {
        let mut tables = self.tables.lock().unwrap();
        tables.check_writable(EntityKind::Country)?;
        tables.check_unique(
            EntityKind::Country,
            Some(country.id().as_i32()),
            country.name().as_str(),
        )?;
        if let Some(slot) = tables.countries.iter_mut().find(|c| c.id() == country.id()) {
            *slot = country.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl AuthorRepository for MockCatalog {
    async fn find_all(&self) -> Result<Vec<Author>, InfraError> {
        let mut authors = self.with_tables(|t| t.authors.clone());
        authors.sort_by(|a, b| a.last_name().as_str().cmp(b.last_name().as_str()));
        Ok(authors)
    }

    async fn find_by_id(&self, id: AuthorId) -> Result<Option<Author>, InfraError> {
        Ok(self.with_tables(|t| t.authors.iter().find(|a| a.id() == id).cloned()))
    }

    async fn find_by_book(&self, book_id: BookId) -> Result<Vec<Author>, InfraError> {
        let ids = self.author_ids_of(book_id);
        let mut authors: Vec<Author> = self.with_tables(|t| {
            t.authors
                .iter()
                .filter(|a| ids.contains(&a.id()))
                .cloned()
                .collect()
        });
        authors.sort_by(|a, b| a.last_name().as_str().cmp(b.last_name().as_str()));
        Ok(authors)
    }

    async fn find_by_country(&self, country_id: CountryId) -> Result<Vec<Author>, InfraError> {
        let mut authors: Vec<Author> = self.with_tables(|t| {
            t.authors
                .iter()
                .filter(|a| a.country_id() == country_id)
                .cloned()
                .collect()
        });
        authors.sort_by(|a, b| a.last_name().as_str().cmp(b.last_name().as_str()));
        Ok(authors)
    }

    async fn insert(&self, _tx: &mut TxContext, draft: &NewAuthor) -> Result<Author, InfraError> {
        let mut tables = self.tables.lock().unwrap();
        tables.check_writable(EntityKind::Author)?;
        let id = AuthorId::new(tables.next_id(EntityKind::Author));
        let author = Author::from_db(
            id,
            draft.first_name.clone(),
            draft.last_name.clone(),
            draft.country_id,
        );
        tables.authors.push(author.clone());
        Ok(author)
    }

    async fn update(&self, _tx: &mut TxContext, author: &Author) -> Result<(), InfraError> {
        let mut tables = self.tables.lock().unwrap();
        tables.check_writable(EntityKind::Author)?;
        if let Some(slot) = tables.authors.iter_mut().find(|a| a.id() == author.id()) {
            *slot = author.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MockCatalog {
    async fn find_all(&self) -> Result<Vec<Category>, InfraError> {
        let mut categories = self.with_tables(|t| t.categories.clone());
        categories.sort_by(|a, b| a.name().as_str().cmp(b.name().as_str()));
        Ok(categories)
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, InfraError> {
        Ok(self.with_tables(|t| t.categories.iter().find(|c| c.id() == id).cloned()))
    }

    async fn find_by_book(&self, book_id: BookId) -> Result<Vec<Category>, InfraError> {
        let ids = self.category_ids_of(book_id);
        let mut categories: Vec<Category> = self.with_tables(|t| {
            t.categories
                .iter()
                .filter(|c| ids.contains(&c.id()))
                .cloned()
                .collect()
        });
        categories.sort_by(|a, b| a.name().as_str().cmp(b.name().as_str()));
        Ok(categories)
    }

    async fn insert(
        &self,
        _tx: &mut TxContext,
        draft: &NewCategory,
    ) -> Result<Category, InfraError> {
        let mut tables = self.tables.lock().unwrap();
        tables.check_writable(EntityKind::Category)?;
        tables.check_unique(EntityKind::Category, None, draft.name.as_str())?;
        let id = CategoryId::new(tables.next_id(EntityKind::Category));
        let category = Category::from_db(id, draft.name.clone());
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn update(&self, _tx: &mut TxContext, category: &Category) -> Result<(), InfraError> {
        let mut tables = self.tables.lock().unwrap();
        tables.check_writable(EntityKind::Category)?;
        tables.check_unique(
            EntityKind::Category,
            Some(category.id().as_i32()),
            category.name().as_str(),
        )?;
        if let Some(slot) = tables.categories.iter_mut().find(|c| c.id() == category.id()) {
            *slot = category.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl BookRepository for MockCatalog {
    async fn find_all(&self) -> Result<Vec<Book>, InfraError> {
        let mut books = self.with_tables(|t| t.books.clone());
        books.sort_by(|a, b| a.title().as_str().cmp(b.title().as_str()));
        Ok(books)
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, InfraError> {
        Ok(self.with_tables(|t| t.books.iter().find(|b| b.id() == id).cloned()))
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, InfraError> {
        let key = normalize_unique_key(isbn);
        Ok(self.with_tables(|t| {
            t.books
                .iter()
                .find(|b| normalize_unique_key(b.isbn().as_str()) == key)
                .cloned()
        }))
    }

    async fn find_by_author(&self, author_id: AuthorId) -> Result<Vec<Book>, InfraError> {
        let mut books: Vec<Book> = self.with_tables(|t| {
            let ids: Vec<BookId> = t
                .book_authors
                .iter()
                .filter(|(_, a)| *a == author_id)
                .map(|(b, _)| *b)
                .collect();
            t.books
                .iter()
                .filter(|b| ids.contains(&b.id()))
                .cloned()
                .collect()
        });
        books.sort_by(|a, b| a.title().as_str().cmp(b.title().as_str()));
        Ok(books)
    }

    async fn find_by_category(&self, category_id: CategoryId) -> Result<Vec<Book>, InfraError> {
        let mut books: Vec<Book> = self.with_tables(|t| {
            let ids: Vec<BookId> = t
                .book_categories
                .iter()
                .filter(|(_, c)| *c == category_id)
                .map(|(b, _)| *b)
                .collect();
            t.books
                .iter()
                .filter(|b| ids.contains(&b.id()))
                .cloned()
                .collect()
        });
        books.sort_by(|a, b| a.title().as_str().cmp(b.title().as_str()));
        Ok(books)
    }

    async fn find_by_review(&self, review_id: ReviewId) -> Result<Option<Book>, InfraError> {
        Ok(self.with_tables(|t| {
            let review = t.reviews.iter().find(|r| r.id() == review_id)?;
            t.books.iter().find(|b| b.id() == review.book_id()).cloned()
        }))
    }

    async fn average_rating(&self, id: BookId) -> Result<BookRating, InfraError> {
        let ratings: Vec<i32> = self.with_tables(|t| {
            t.reviews
                .iter()
                .filter(|r| r.book_id() == id)
                .map(|r| r.rating().as_i32())
                .collect()
        });
        Ok(BookRating::average_of(&ratings))
    }

    async fn insert(&self, _tx: &mut TxContext, draft: &NewBook) -> Result<Book, InfraError> {
        let mut tables = self.tables.lock().unwrap();
        tables.check_writable(EntityKind::Book)?;
        tables.check_unique(EntityKind::Book, None, draft.isbn.as_str())?;
        let id = BookId::new(tables.next_id(EntityKind::Book));
        let book = Book::from_db(
            id,
            draft.isbn.clone(),
            draft.title.clone(),
            draft.date_published,
        );
        tables.books.push(book.clone());
        Ok(book)
    }

    async fn update(&self, _tx: &mut TxContext, book: &Book) -> Result<(), InfraError> {
        let mut tables = self.tables.lock().unwrap();
        tables.check_writable(EntityKind::Book)?;
        tables.check_unique(
            EntityKind::Book,
            Some(book.id().as_i32()),
            book.isbn().as_str(),
        )?;
        if let Some(slot) = tables.books.iter_mut().find(|b| b.id() == book.id()) {
            *slot = book.clone();
        }
        Ok(())
    }

    async fn replace_authors(
        &self,
        _tx: &mut TxContext,
        book_id: BookId,
        author_ids: &[AuthorId],
    ) -> Result<(), InfraError> {
        let mut tables = self.tables.lock().unwrap();
        tables.check_writable(EntityKind::Book)?;
        tables.book_authors.retain(|(b, _)| *b != book_id);
        let mut seen = HashSet::new();
        for author_id in author_ids.iter().filter(|id| seen.insert(**id)) {
            tables.book_authors.push((book_id, *author_id));
        }
        Ok(())
    }

    async fn replace_categories(
        &self,
        _tx: &mut TxContext,
        book_id: BookId,
        category_ids: &[CategoryId],
    ) -> Result<(), InfraError> {
        let mut tables = self.tables.lock().unwrap();
        tables.check_writable(EntityKind::Book)?;
        tables.book_categories.retain(|(b, _)| *b != book_id);
        let mut seen = HashSet::new();
        for category_id in category_ids.iter().filter(|id| seen.insert(**id)) {
            tables.book_categories.push((book_id, *category_id));
        }
        Ok(())
    }
}

#[async_trait]
impl ReviewerRepository for MockCatalog {
    async fn find_all(&self) -> Result<Vec<Reviewer>, InfraError> {
        let mut reviewers = self.with_tables(|t| t.reviewers.clone());
        reviewers.sort_by(|a, b| a.last_name().as_str().cmp(b.last_name().as_str()));
        Ok(reviewers)
    }

    async fn find_by_id(&self, id: ReviewerId) -> Result<Option<Reviewer>, InfraError> {
        Ok(self.with_tables(|t| t.reviewers.iter().find(|r| r.id() == id).cloned()))
    }

    async fn find_by_review(&self, review_id: ReviewId) -> Result<Option<Reviewer>, InfraError> {
        Ok(self.with_tables(|t| {
            let review = t.reviews.iter().find(|r| r.id() == review_id)?;
            t.reviewers
                .iter()
                .find(|r| r.id() == review.reviewer_id())
                .cloned()
        }))
    }

    async fn insert(
        &self,
        _tx: &mut TxContext,
        draft: &NewReviewer,
    ) -> Result<Reviewer, InfraError> {
        let mut tables = self.tables.lock().unwrap();
        tables.check_writable(EntityKind::Reviewer)?;
        let id = ReviewerId::new(tables.next_id(EntityKind::Reviewer));
        let reviewer = Reviewer::from_db(id, draft.first_name.clone(), draft.last_name.clone());
        tables.reviewers.push(reviewer.clone());
        Ok(reviewer)
    }

    async fn update(&self, _tx: &mut TxContext, reviewer: &Reviewer) -> Result<(), InfraError> {
        let mut tables = self.tables.lock().unwrap();
        tables.check_writable(EntityKind::Reviewer)?;
        if let Some(slot) = tables.reviewers.iter_mut().find(|r| r.id() == reviewer.id()) {
            *slot = reviewer.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl ReviewRepository for MockCatalog {
    async fn find_all(&self) -> Result<Vec<Review>, InfraError> {
        let mut reviews = self.with_tables(|t| t.reviews.clone());
        reviews.sort_by_key(|r| r.rating());
        Ok(reviews)
    }

    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, InfraError> {
        Ok(self.with_tables(|t| t.reviews.iter().find(|r| r.id() == id).cloned()))
    }

    async fn find_by_book(&self, book_id: BookId) -> Result<Vec<Review>, InfraError> {
        Ok(self.with_tables(|t| {
            t.reviews
                .iter()
                .filter(|r| r.book_id() == book_id)
                .cloned()
                .collect()
        }))
    }

    async fn find_by_reviewer(&self, reviewer_id: ReviewerId) -> Result<Vec<Review>, InfraError> {
        Ok(self.with_tables(|t| {
            t.reviews
                .iter()
                .filter(|r| r.reviewer_id() == reviewer_id)
                .cloned()
                .collect()
        }))
    }

    async fn insert(&self, _tx: &mut TxContext, draft: &NewReview) -> Result<Review, InfraError> {
        let mut tables = self.tables.lock().unwrap();
        tables.check_writable(EntityKind::Review)?;
        let id = ReviewId::new(tables.next_id(EntityKind::Review));
        let review = Review::from_db(id, draft.clone());
        tables.reviews.push(review.clone());
        Ok(review)
    }

    async fn update(&self, _tx: &mut TxContext, review: &Review) -> Result<(), InfraError> {
        let mut tables = self.tables.lock().unwrap();
        tables.check_writable(EntityKind::Review)?;
        if let Some(slot) = tables.reviews.iter_mut().find(|r| r.id() == review.id()) {
            *slot = review.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl IntegrityRepository for MockCatalog {
    async fn exists(&self, kind: EntityKind, id: i32) -> Result<bool, InfraError> {
        Ok(self.with_tables(|t| match kind {
            EntityKind::Country => t.countries.iter().any(|c| c.id().as_i32() == id),
            EntityKind::Author => t.authors.iter().any(|a| a.id().as_i32() == id),
            EntityKind::Category => t.categories.iter().any(|c| c.id().as_i32() == id),
            EntityKind::Book => t.books.iter().any(|b| b.id().as_i32() == id),
            EntityKind::Reviewer => t.reviewers.iter().any(|r| r.id().as_i32() == id),
            EntityKind::Review => t.reviews.iter().any(|r| r.id().as_i32() == id),
        }))
    }

    async fn has_duplicate(
        &self,
        kind: EntityKind,
        exclude: Option<i32>,
        candidate: &str,
    ) -> Result<bool, InfraError> {
        Ok(self.with_tables(|t| t.is_duplicate(kind, exclude, candidate)))
    }

    async fn count_dependents(
        &self,
        relation: &Relation,
        parent_id: i32,
    ) -> Result<i64, InfraError> {
        let count = self.with_tables(|t| match (relation.parent, relation.dependent) {
            (EntityKind::Country, Dependent::Rows(EntityKind::Author)) => t
                .authors
                .iter()
                .filter(|a| a.country_id().as_i32() == parent_id)
                .count(),
            (EntityKind::Book, Dependent::Rows(EntityKind::Review)) => t
                .reviews
                .iter()
                .filter(|r| r.book_id().as_i32() == parent_id)
                .count(),
            (EntityKind::Reviewer, Dependent::Rows(EntityKind::Review)) => t
                .reviews
                .iter()
                .filter(|r| r.reviewer_id().as_i32() == parent_id)
                .count(),
            (EntityKind::Author, Dependent::Links(JoinTable::BookAuthor)) => t
                .book_authors
                .iter()
                .filter(|(_, a)| a.as_i32() == parent_id)
                .count(),
            (EntityKind::Book, Dependent::Links(JoinTable::BookAuthor)) => t
                .book_authors
                .iter()
                .filter(|(b, _)| b.as_i32() == parent_id)
                .count(),
            (EntityKind::Category, Dependent::Links(JoinTable::BookCategory)) => t
                .book_categories
                .iter()
                .filter(|(_, c)| c.as_i32() == parent_id)
                .count(),
            (EntityKind::Book, Dependent::Links(JoinTable::BookCategory)) => t
                .book_categories
                .iter()
                .filter(|(b, _)| b.as_i32() == parent_id)
                .count(),
            _ => 0,
        });
        Ok(count as i64)
    }

    async fn delete_dependents(
        &self,
        _tx: &mut TxContext,
        relation: &Relation,
        parent_id: i32,
    ) -> Result<u64, InfraError> {
        let mut tables = self.tables.lock().unwrap();
        if let Dependent::Rows(kind) = relation.dependent {
            tables.check_writable(kind)?;
        }

        let removed = match (relation.parent, relation.dependent) {
            (EntityKind::Country, Dependent::Rows(EntityKind::Author)) => {
                let before = tables.authors.len();
                tables.authors.retain(|a| a.country_id().as_i32() != parent_id);
                before - tables.authors.len()
            }
            (EntityKind::Book, Dependent::Rows(EntityKind::Review)) => {
                let before = tables.reviews.len();
                tables.reviews.retain(|r| r.book_id().as_i32() != parent_id);
                before - tables.reviews.len()
            }
            (EntityKind::Reviewer, Dependent::Rows(EntityKind::Review)) => {
                let before = tables.reviews.len();
                tables.reviews.retain(|r| r.reviewer_id().as_i32() != parent_id);
                before - tables.reviews.len()
            }
            (EntityKind::Author, Dependent::Links(JoinTable::BookAuthor)) => {
                let before = tables.book_authors.len();
                tables.book_authors.retain(|(_, a)| a.as_i32() != parent_id);
                before - tables.book_authors.len()
            }
            (EntityKind::Book, Dependent::Links(JoinTable::BookAuthor)) => {
                let before = tables.book_authors.len();
                tables.book_authors.retain(|(b, _)| b.as_i32() != parent_id);
                before - tables.book_authors.len()
            }
            (EntityKind::Category, Dependent::Links(JoinTable::BookCategory)) => {
                let before = tables.book_categories.len();
                tables.book_categories.retain(|(_, c)| c.as_i32() != parent_id);
                before - tables.book_categories.len()
            }
            (EntityKind::Book, Dependent::Links(JoinTable::BookCategory)) => {
                let before = tables.book_categories.len();
                tables.book_categories.retain(|(b, _)| b.as_i32() != parent_id);
                before - tables.book_categories.len()
            }
            (parent, dependent) => {
                return Err(InfraError::unexpected(format!(
                    "未対応の関係です: {parent} -> {dependent}"
                )));
            }
        };
        Ok(removed as u64)
    }

    async fn delete_row(
        &self,
        _tx: &mut TxContext,
        kind: EntityKind,
        id: i32,
    ) -> Result<u64, InfraError> {
        let mut tables = self.tables.lock().unwrap();
        tables.check_writable(kind)?;

        let removed = match kind {
            EntityKind::Country => {
                let before = tables.countries.len();
                tables.countries.retain(|c| c.id().as_i32() != id);
                before - tables.countries.len()
            }
            EntityKind::Author => {
                let before = tables.authors.len();
                tables.authors.retain(|a| a.id().as_i32() != id);
                before - tables.authors.len()
            }
            EntityKind::Category => {
                let before = tables.categories.len();
                tables.categories.retain(|c| c.id().as_i32() != id);
                before - tables.categories.len()
            }
            EntityKind::Book => {
                let before = tables.books.len();
                tables.books.retain(|b| b.id().as_i32() != id);
                before - tables.books.len()
            }
            EntityKind::Reviewer => {
                let before = tables.reviewers.len();
                tables.reviewers.retain(|r| r.id().as_i32() != id);
                before - tables.reviewers.len()
            }
            EntityKind::Review => {
                let before = tables.reviews.len();
                tables.reviews.retain(|r| r.id().as_i32() != id);
                before - tables.reviews.len()
            }
        };
        Ok(removed as u64)
    }
}

// ===== MockTransactionManager =====

/// テスト用 TransactionManager
///
/// 開始されたトランザクション数を記録する。
/// [`MockTransactionManager::new`] は巻き戻さない `TxContext::mock()` を返し、
/// [`MockTransactionManager::with_rollback`] はドロップ時に開始前のテーブルへ戻す
/// `TxContext` を返す。
#[derive(Clone, Default)]
pub struct MockTransactionManager {
    begun:   Arc<AtomicUsize>,
    catalog: Option<MockCatalog>,
}

impl MockTransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// コミットされなかった変更を `catalog` から巻き戻すマネージャを作成する
    pub fn with_rollback(catalog: &MockCatalog) -> Self {
        Self {
            begun:   Arc::default(),
            catalog: Some(catalog.clone()),
        }
    }

    /// 開始されたトランザクション数
    pub fn begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionManager for MockTransactionManager {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        self.begun.fetch_add(1, Ordering::SeqCst);
        let Some(catalog) = self.catalog.clone() else {
            return Ok(TxContext::mock());
        };
        let snapshot = catalog.snapshot();
        Ok(TxContext::mock_with_rollback(move || {
            catalog.restore(snapshot);
        }))
    }
}
