//! # 参照整合性メタデータ
//!
//! エンティティ間の関係を小さな静的テーブルとして表現する。
//! 存在確認・一意性チェック・削除ガード・カスケード削除は、
//! エンティティごとに実装を複製せず、このテーブルを引いて汎用的に処理する。
//!
//! ## 関係テーブル
//!
//! | 親 | 依存 | 削除時 |
//! |----|------|--------|
//! | 国 | 著者 | 拒否 |
//! | カテゴリ | 書籍カテゴリ関連 | 拒否 |
//! | 著者 | 書籍著者関連 | カスケード |
//! | 書籍 | レビュー | カスケード |
//! | 書籍 | 書籍著者関連 | カスケード |
//! | 書籍 | 書籍カテゴリ関連 | カスケード |
//! | レビュアー | レビュー | カスケード |
//!
//! テーブル名や外部キー列への対応付けは永続化層の責務とし、
//! ここでは関係の形だけを持つ。
//!
//! ## 使用例
//!
//! ```rust
//! use bookshelf_domain::integrity::{DeletePolicy, EntityKind, relations_of};
//!
//! let restricts: Vec<_> = relations_of(EntityKind::Country)
//!     .filter(|r| r.on_delete == DeletePolicy::Restrict)
//!     .collect();
//! assert_eq!(restricts.len(), 1);
//! ```

use serde::Serialize;
use strum::IntoStaticStr;

/// エンティティ種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Country,
    Author,
    Category,
    Book,
    Reviewer,
    Review,
}

impl EntityKind {
    /// エラーメッセージ用の表示名
    pub fn label(&self) -> &'static str {
        match self {
            Self::Country => "国",
            Self::Author => "著者",
            Self::Category => "カテゴリ",
            Self::Book => "書籍",
            Self::Reviewer => "レビュアー",
            Self::Review => "レビュー",
        }
    }

    /// 一意制約の対象項目
    ///
    /// 国とカテゴリは名前、書籍は ISBN。それ以外は一意項目を持たない。
    pub fn unique_field(&self) -> Option<UniqueField> {
        match self {
            Self::Country | Self::Category => Some(UniqueField::Name),
            Self::Book => Some(UniqueField::Isbn),
            Self::Author | Self::Reviewer | Self::Review => None,
        }
    }
}

/// 一意制約の対象項目
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum UniqueField {
    Name,
    Isbn,
}

impl UniqueField {
    /// エラーメッセージ用の表示名
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "名前",
            Self::Isbn => "ISBN",
        }
    }
}

/// 多対多の関連テーブル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum JoinTable {
    BookAuthor,
    BookCategory,
}

/// 親エンティティに依存するデータ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependent {
    /// 外部キーで親を参照するエンティティの行
    Rows(EntityKind),
    /// 親を含む関連テーブルの行
    Links(JoinTable),
}

impl Dependent {
    /// エラーメッセージ用の表示名
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rows(kind) => kind.label(),
            Self::Links(JoinTable::BookAuthor) | Self::Links(JoinTable::BookCategory) => "書籍",
        }
    }
}

impl std::fmt::Display for Dependent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rows(kind) => write!(f, "{kind}"),
            Self::Links(table) => write!(f, "{table}"),
        }
    }
}

/// 親削除時の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// 依存データが 1 件でもあれば削除を拒否する
    Restrict,
    /// 依存データを親と同じトランザクションで削除する
    Cascade,
}

/// 親と依存データの関係
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub parent:    EntityKind,
    pub dependent: Dependent,
    pub on_delete: DeletePolicy,
}

/// 関係テーブル
///
/// カスケード削除はこの並び順で実行される。
/// 書籍はレビューを先に消し、関連行、最後に書籍本体の順になる。
pub const RELATIONS: &[Relation] = &[
    Relation {
        parent:    EntityKind::Country,
        dependent: Dependent::Rows(EntityKind::Author),
        on_delete: DeletePolicy::Restrict,
    },
    Relation {
        parent:    EntityKind::Category,
        dependent: Dependent::Links(JoinTable::BookCategory),
        on_delete: DeletePolicy::Restrict,
    },
    Relation {
        parent:    EntityKind::Author,
        dependent: Dependent::Links(JoinTable::BookAuthor),
        on_delete: DeletePolicy::Cascade,
    },
    Relation {
        parent:    EntityKind::Book,
        dependent: Dependent::Rows(EntityKind::Review),
        on_delete: DeletePolicy::Cascade,
    },
    Relation {
        parent:    EntityKind::Book,
        dependent: Dependent::Links(JoinTable::BookAuthor),
        on_delete: DeletePolicy::Cascade,
    },
    Relation {
        parent:    EntityKind::Book,
        dependent: Dependent::Links(JoinTable::BookCategory),
        on_delete: DeletePolicy::Cascade,
    },
    Relation {
        parent:    EntityKind::Reviewer,
        dependent: Dependent::Rows(EntityKind::Review),
        on_delete: DeletePolicy::Cascade,
    },
];

/// 指定した親を持つ関係を宣言順に返す
pub fn relations_of(parent: EntityKind) -> impl Iterator<Item = &'static Relation> {
    RELATIONS.iter().filter(move |r| r.parent == parent)
}

/// 一意性比較用に値を正規化する（前後の空白除去 + 大文字化）
///
/// ```rust
/// use bookshelf_domain::integrity::normalize_unique_key;
///
/// assert_eq!(normalize_unique_key(" france "), "FRANCE");
/// ```
pub fn normalize_unique_key(value: &str) -> String {
    value.trim().to_uppercase()
}

/// 削除を拒否する理由
///
/// 拒否ポリシーの関係に依存データが残っている場合に生成される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConflict {
    pub entity:    EntityKind,
    pub dependent: Dependent,
    /// 残っている依存データの件数
    pub count:     i64,
}

impl std::fmt::Display for DeleteConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}は {} 件の{}から参照されているため削除できません",
            self.entity.label(),
            self.count,
            self.dependent.label()
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(EntityKind::Country, Some(UniqueField::Name))]
    #[case(EntityKind::Category, Some(UniqueField::Name))]
    #[case(EntityKind::Book, Some(UniqueField::Isbn))]
    #[case(EntityKind::Author, None)]
    #[case(EntityKind::Reviewer, None)]
    #[case(EntityKind::Review, None)]
    fn test_unique_fieldが一意項目を返す(
        #[case] kind: EntityKind,
        #[case] expected: Option<UniqueField>,
    ) {
        assert_eq!(kind.unique_field(), expected);
    }

    #[test]
    fn test_国の削除は著者によって拒否される() {
        let relations: Vec<_> = relations_of(EntityKind::Country).collect();

        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].dependent, Dependent::Rows(EntityKind::Author));
        assert_eq!(relations[0].on_delete, DeletePolicy::Restrict);
    }

    #[test]
    fn test_カテゴリの削除は書籍との関連によって拒否される() {
        let relations: Vec<_> = relations_of(EntityKind::Category).collect();

        assert_eq!(relations.len(), 1);
        assert_eq!(
            relations[0].dependent,
            Dependent::Links(JoinTable::BookCategory)
        );
        assert_eq!(relations[0].on_delete, DeletePolicy::Restrict);
    }

    #[test]
    fn test_書籍の削除はレビューから先にカスケードする() {
        let dependents: Vec<_> = relations_of(EntityKind::Book)
            .map(|r| (r.dependent, r.on_delete))
            .collect();

        assert_eq!(
            dependents,
            vec![
                (
                    Dependent::Rows(EntityKind::Review),
                    DeletePolicy::Cascade
                ),
                (
                    Dependent::Links(JoinTable::BookAuthor),
                    DeletePolicy::Cascade
                ),
                (
                    Dependent::Links(JoinTable::BookCategory),
                    DeletePolicy::Cascade
                ),
            ]
        );
    }

    #[test]
    fn test_レビュアーの削除はレビューをカスケードする() {
        let relations: Vec<_> = relations_of(EntityKind::Reviewer).collect();

        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].dependent, Dependent::Rows(EntityKind::Review));
        assert_eq!(relations[0].on_delete, DeletePolicy::Cascade);
    }

    #[test]
    fn test_レビューは依存データを持たない() {
        assert_eq!(relations_of(EntityKind::Review).count(), 0);
    }

    #[rstest]
    #[case("France", "FRANCE")]
    #[case("france ", "FRANCE")]
    #[case("  fRaNcE\t", "FRANCE")]
    #[case("978-3-16", "978-3-16")]
    fn test_normalize_unique_keyが空白除去と大文字化を行う(
        #[case] input: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(normalize_unique_key(input), expected);
    }

    #[test]
    fn test_delete_conflictのメッセージに件数が含まれる() {
        let conflict = DeleteConflict {
            entity:    EntityKind::Country,
            dependent: Dependent::Rows(EntityKind::Author),
            count:     3,
        };

        assert_eq!(
            conflict.to_string(),
            "国は 3 件の著者から参照されているため削除できません"
        );
    }

    #[test]
    fn test_entity_kindの文字列表現はスネークケース() {
        let name: &'static str = EntityKind::Reviewer.into();
        assert_eq!(name, "reviewer");
        assert_eq!(Dependent::Links(JoinTable::BookCategory).to_string(), "book_category");
    }
}
