//! JSON column predicates that differ per storage backend.
//!
//! The catalog only ever asks two questions of a JSON column: "does this
//! array contain this string" and "is this key of this object true". Each
//! backend answers them with its own operators; callers go through
//! [`JsonDialect`] and never write backend SQL themselves.

use sea_orm::DbBackend;
use sea_orm::sea_query::{Condition, Expr, SimpleExpr};

use crate::entities::{entries, entry_metadata};

/// How a backend evaluates JSON predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonDialect {
    /// PostgreSQL `jsonb`: `@>` containment and `->>` extraction.
    Document,
    /// MySQL: `JSON_OVERLAPS` against a one-element `JSON_ARRAY`.
    Overlaps,
    /// SQLite: `json_each` table-valued function and `json_extract`.
    TableValued,
}

impl JsonDialect {
    #[must_use]
    pub const fn for_backend(backend: DbBackend) -> Self {
        match backend {
            DbBackend::Postgres => Self::Document,
            DbBackend::MySql => Self::Overlaps,
            DbBackend::Sqlite => Self::TableValued,
        }
    }

    /// True iff `value` is an element of the JSON array in `column`.
    ///
    /// A NULL column never matches.
    #[must_use]
    pub fn array_contains(self, column: SimpleExpr, value: &str) -> SimpleExpr {
        match self {
            Self::Document => {
                let needle = serde_json::Value::Array(vec![value.into()]).to_string();
                Expr::cust_with_exprs("? @> CAST(? AS jsonb)", [column, Expr::val(needle).into()])
            }
            Self::Overlaps => Expr::cust_with_exprs(
                "JSON_OVERLAPS(?, JSON_ARRAY(?))",
                [column, Expr::val(value).into()],
            ),
            Self::TableValued => Expr::cust_with_exprs(
                "EXISTS (SELECT 1 FROM json_each(?) WHERE json_each.value = ?)",
                [column, Expr::val(value).into()],
            ),
        }
    }

    /// True iff the JSON object in `column` has `key` set to boolean true.
    ///
    /// `key` must be one of the compile-time flag names; it is inlined for
    /// the document dialect.
    #[must_use]
    pub fn flag_is_true(self, column: SimpleExpr, key: &'static str) -> SimpleExpr {
        match self {
            Self::Document => {
                Expr::cust_with_exprs(format!("CAST(? ->> '{key}' AS boolean)"), [column])
            }
            Self::Overlaps => Expr::cust_with_exprs(
                "JSON_EXTRACT(?, ?) = true",
                [column, Expr::val(format!("$.{key}")).into()],
            ),
            Self::TableValued => Expr::cust_with_exprs(
                "json_extract(?, ?) = 1",
                [column, Expr::val(format!("$.{key}")).into()],
            ),
        }
    }

    /// True iff any of `keys` is true in the JSON object in `column`.
    #[must_use]
    pub fn any_flag_true(self, column: &SimpleExpr, keys: &[&'static str]) -> Condition {
        keys.iter().fold(Condition::any(), |cond, key| {
            cond.add(self.flag_is_true(column.clone(), *key))
        })
    }
}

/// JSON array columns that can be filtered by element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayField {
    Genres,
    Franchises,
    Collections,
    Companies,
    AgeRatings,
    GameModes,
    Regions,
    Languages,
}

impl ArrayField {
    /// Whether the column lives on `entry_metadata` and therefore needs the join.
    #[must_use]
    pub const fn on_metadata(self) -> bool {
        !matches!(self, Self::Regions | Self::Languages)
    }

    #[must_use]
    pub fn column(self) -> SimpleExpr {
        let expr = match self {
            Self::Genres => Expr::col((entry_metadata::Entity, entry_metadata::Column::Genres)),
            Self::Franchises => {
                Expr::col((entry_metadata::Entity, entry_metadata::Column::Franchises))
            }
            Self::Collections => {
                Expr::col((entry_metadata::Entity, entry_metadata::Column::Collections))
            }
            Self::Companies => {
                Expr::col((entry_metadata::Entity, entry_metadata::Column::Companies))
            }
            Self::AgeRatings => {
                Expr::col((entry_metadata::Entity, entry_metadata::Column::AgeRatings))
            }
            Self::GameModes => {
                Expr::col((entry_metadata::Entity, entry_metadata::Column::GameModes))
            }
            Self::Regions => Expr::col((entries::Entity, entries::Column::Regions)),
            Self::Languages => Expr::col((entries::Entity, entries::Column::Languages)),
        };
        expr.into()
    }
}
