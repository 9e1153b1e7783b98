//! Compiles [`EntryFilters`] into a single SQL condition over `entries`.
//!
//! Every dimension is a standalone function `QueryPlan × value → QueryPlan`.
//! Predicates AND together and can be applied in any order: a dimension that
//! needs another table only marks the join on the plan, and the joins are
//! emitted once when the plan is applied to a select.

use sea_orm::sea_query::{Condition, ConditionExpression, Expr, IntoCondition, SimpleExpr};
use sea_orm::{ColumnTrait, JoinType, QueryFilter, QuerySelect, RelationTrait, Select};
use serde::Deserialize;

use super::json_array::{ArrayField, JsonDialect};
use super::siblings::{SIBLING_PROVIDERS, has_sibling};
use crate::constants::{EMULATOR_PLATFORMS, VERIFICATION_FLAGS, status};
use crate::entities::{entries, entry_users, platforms};

/// The full set of filter options. Every field is optional and an absent
/// (or empty string) option leaves the query unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EntryFilters {
    pub platform_id: Option<i32>,
    pub collection_id: Option<i32>,
    pub virtual_collection_id: Option<String>,
    pub search_term: Option<String>,
    pub matched: Option<bool>,
    pub favourite: Option<bool>,
    pub duplicate: Option<bool>,
    pub playable: Option<bool>,
    pub has_ra: Option<bool>,
    pub missing: Option<bool>,
    /// Only `Some(true)` filters; there is no "not verified" query.
    pub verified: Option<bool>,
    pub selected_genre: Option<String>,
    pub selected_franchise: Option<String>,
    pub selected_collection: Option<String>,
    pub selected_company: Option<String>,
    pub selected_age_rating: Option<String>,
    pub selected_region: Option<String>,
    pub selected_language: Option<String>,
    pub selected_status: Option<String>,
}

impl EntryFilters {
    /// Array-containment selections paired with the column they probe.
    fn array_selections(&self) -> [(ArrayField, Option<&str>); 7] {
        [
            (ArrayField::Genres, non_empty(&self.selected_genre)),
            (ArrayField::Franchises, non_empty(&self.selected_franchise)),
            (ArrayField::Collections, non_empty(&self.selected_collection)),
            (ArrayField::Companies, non_empty(&self.selected_company)),
            (ArrayField::AgeRatings, non_empty(&self.selected_age_rating)),
            (ArrayField::Regions, non_empty(&self.selected_region)),
            (ArrayField::Languages, non_empty(&self.selected_language)),
        ]
    }
}

/// Collection memberships looked up before compilation.
///
/// `None` means the referenced collection does not exist (or, for
/// favourites, that the user has no favourites collection).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedMemberships {
    pub collection: Option<Vec<i32>>,
    pub virtual_collection: Option<Vec<i32>>,
    pub favourites: Option<Vec<i32>>,
}

/// Accumulated predicate set plus the joins it depends on.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    condition: Condition,
    join_platform: bool,
    join_metadata: bool,
    user_id: Option<i32>,
    dialect: JsonDialect,
}

impl QueryPlan {
    #[must_use]
    pub fn new(dialect: JsonDialect, user_id: Option<i32>) -> Self {
        Self {
            condition: Condition::all(),
            join_platform: false,
            join_metadata: false,
            user_id,
            dialect,
        }
    }

    #[must_use]
    pub fn filter<C>(mut self, condition: C) -> Self
    where
        C: Into<ConditionExpression>,
    {
        self.condition = self.condition.add(condition);
        self
    }

    #[must_use]
    pub const fn user_id(&self) -> Option<i32> {
        self.user_id
    }

    #[must_use]
    pub const fn joins_metadata(&self) -> bool {
        self.join_metadata
    }

    #[must_use]
    pub const fn joins_platform(&self) -> bool {
        self.join_platform
    }

    #[must_use]
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Adds the joins the predicates rely on and filters by them.
    ///
    /// The per-user row is always left-joined when a user is present, scoped
    /// to that user so at most one row matches per entry.
    #[must_use]
    pub fn apply(self, mut select: Select<entries::Entity>) -> Select<entries::Entity> {
        if let Some(uid) = self.user_id {
            select = select.join(
                JoinType::LeftJoin,
                entries::Relation::EntryUsers
                    .def()
                    .on_condition(move |_left, right| {
                        Expr::col((right, entry_users::Column::UserId))
                            .eq(uid)
                            .into_condition()
                    }),
            );
        }
        if self.join_platform {
            select = select.join(JoinType::InnerJoin, entries::Relation::Platforms.def());
        }
        if self.join_metadata {
            select = select.join(JoinType::InnerJoin, entries::Relation::EntryMetadata.def());
        }
        select.filter(self.condition)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn negate_unless(value: bool, condition: Condition) -> Condition {
    if value { condition } else { condition.not() }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn user_hidden_is_false() -> SimpleExpr {
    entry_users::Column::Hidden.eq(false)
}

#[must_use]
pub fn by_platform_id(plan: QueryPlan, platform_id: i32) -> QueryPlan {
    plan.filter(entries::Column::PlatformId.eq(platform_id))
}

/// Restricts to an explicit id set. An empty set matches nothing.
#[must_use]
pub fn by_entry_ids(plan: QueryPlan, ids: &[i32]) -> QueryPlan {
    plan.filter(entries::Column::Id.is_in(ids.iter().copied()))
}

/// Case-insensitive substring match on `fs_name` or `name`.
///
/// Both sides are lowered by the database so the column and the pattern
/// fold case under the same rules.
#[must_use]
pub fn by_search_term(plan: QueryPlan, term: &str) -> QueryPlan {
    let pattern = format!("%{}%", escape_like(term));
    let like = |column: entries::Column| {
        Expr::cust_with_exprs(
            "lower(?) LIKE lower(?) ESCAPE '\\'",
            [
                Expr::col((entries::Entity, column)).into(),
                Expr::val(pattern.clone()).into(),
            ],
        )
    };

    plan.filter(
        Condition::any()
            .add(like(entries::Column::FsName))
            .add(like(entries::Column::Name)),
    )
}

#[must_use]
pub fn by_matched(plan: QueryPlan, value: bool) -> QueryPlan {
    let any_provider = SIBLING_PROVIDERS
        .iter()
        .fold(Condition::any(), |cond, column| cond.add(column.is_not_null()));
    plan.filter(negate_unless(value, any_provider))
}

/// `favourites` is the user's favourites membership, `None` when the user
/// has no such collection: `true` then matches nothing and `false` is a no-op.
#[must_use]
pub fn by_favourite(plan: QueryPlan, value: bool, favourites: Option<&[i32]>) -> QueryPlan {
    match favourites {
        Some(ids) => {
            let member = Condition::all().add(entries::Column::Id.is_in(ids.iter().copied()));
            plan.filter(negate_unless(value, member))
        }
        None if value => by_entry_ids(plan, &[]),
        None => plan,
    }
}

#[must_use]
pub fn by_duplicate(plan: QueryPlan, value: bool) -> QueryPlan {
    plan.filter(negate_unless(value, Condition::all().add(has_sibling())))
}

#[must_use]
pub fn by_playable(mut plan: QueryPlan, value: bool) -> QueryPlan {
    plan.join_platform = true;
    let supported =
        Condition::all().add(platforms::Column::Slug.is_in(EMULATOR_PLATFORMS.iter().copied()));
    plan.filter(negate_unless(value, supported))
}

#[must_use]
pub fn by_has_ra(plan: QueryPlan, value: bool) -> QueryPlan {
    plan.filter(negate_unless(
        value,
        Condition::all().add(entries::Column::RaId.is_not_null()),
    ))
}

#[must_use]
pub fn by_missing(plan: QueryPlan, value: bool) -> QueryPlan {
    plan.filter(negate_unless(
        value,
        Condition::all().add(entries::Column::MissingFromFs.eq(true)),
    ))
}

/// At least one verification flag in `hasheous_metadata` is true.
#[must_use]
pub fn by_verified(plan: QueryPlan) -> QueryPlan {
    let column: SimpleExpr = Expr::col((entries::Entity, entries::Column::HasheousMetadata)).into();
    let any_flag = plan.dialect.any_flag_true(&column, VERIFICATION_FLAGS);
    plan.filter(any_flag)
}

/// `value` must be an element of the JSON array in `field`.
#[must_use]
pub fn by_array(mut plan: QueryPlan, field: ArrayField, value: &str) -> QueryPlan {
    if field.on_metadata() {
        plan.join_metadata = true;
    }
    let contains = plan.dialect.array_contains(field.column(), value);
    plan.filter(contains)
}

/// Maps a status selection onto the user's row.
///
/// The three flag statuses test their flag; any other value is compared
/// with the free-form `status` column. Every status except `hidden` also
/// requires the row not to be hidden.
#[must_use]
pub fn by_status(plan: QueryPlan, selected: &str) -> QueryPlan {
    let condition = match selected {
        status::NOW_PLAYING => Condition::all()
            .add(entry_users::Column::NowPlaying.eq(true))
            .add(user_hidden_is_false()),
        status::BACKLOGGED => Condition::all()
            .add(entry_users::Column::Backlogged.eq(true))
            .add(user_hidden_is_false()),
        status::HIDDEN => Condition::all().add(entry_users::Column::Hidden.eq(true)),
        other => Condition::all()
            .add(entry_users::Column::Status.eq(other))
            .add(user_hidden_is_false()),
    };
    plan.filter(condition)
}

/// Excludes rows the user hid. Entries the user never touched have no row
/// and stay visible.
#[must_use]
pub fn suppress_hidden(plan: QueryPlan) -> QueryPlan {
    plan.filter(
        Condition::any()
            .add(user_hidden_is_false())
            .add(entry_users::Column::Hidden.is_null()),
    )
}

type Stage<'a> = Box<dyn FnOnce(QueryPlan) -> QueryPlan + 'a>;

fn stage<'a>(f: impl FnOnce(QueryPlan) -> QueryPlan + 'a) -> Stage<'a> {
    Box::new(f)
}

/// Folds every present option into `plan`.
///
/// Status and hidden suppression only apply when the plan carries a user.
#[must_use]
pub fn compile(filters: &EntryFilters, resolved: &ResolvedMemberships, plan: QueryPlan) -> QueryPlan {
    let has_user = plan.user_id().is_some();
    let selected_status = non_empty(&filters.selected_status);

    let mut stages: Vec<Option<Stage<'_>>> = vec![
        filters
            .platform_id
            .map(|id| stage(move |p| by_platform_id(p, id))),
        filters
            .collection_id
            .and(resolved.collection.as_deref())
            .map(|ids| stage(move |p| by_entry_ids(p, ids))),
        non_empty(&filters.virtual_collection_id)
            .and(resolved.virtual_collection.as_deref())
            .map(|ids| stage(move |p| by_entry_ids(p, ids))),
        non_empty(&filters.search_term).map(|term| stage(move |p| by_search_term(p, term))),
        filters.matched.map(|v| stage(move |p| by_matched(p, v))),
        filters.favourite.map(|v| {
            let favourites = resolved.favourites.as_deref();
            stage(move |p| by_favourite(p, v, favourites))
        }),
        filters.duplicate.map(|v| stage(move |p| by_duplicate(p, v))),
        filters.playable.map(|v| stage(move |p| by_playable(p, v))),
        filters.has_ra.map(|v| stage(move |p| by_has_ra(p, v))),
        filters.missing.map(|v| stage(move |p| by_missing(p, v))),
        filters
            .verified
            .filter(|v| *v)
            .map(|_| stage(by_verified)),
    ];

    stages.extend(
        filters
            .array_selections()
            .into_iter()
            .map(|(field, value)| value.map(|value| stage(move |p| by_array(p, field, value)))),
    );

    stages.push(
        selected_status
            .filter(|_| has_user)
            .map(|selected| stage(move |p| by_status(p, selected))),
    );
    stages.push(
        (has_user && selected_status != Some(status::HIDDEN)).then(|| stage(suppress_hidden)),
    );

    stages.into_iter().flatten().fold(plan, |plan, stage| stage(plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, EntityTrait, QueryTrait};

    fn sql(filters: &EntryFilters, resolved: &ResolvedMemberships, user: Option<i32>) -> String {
        let plan = compile(
            filters,
            resolved,
            QueryPlan::new(JsonDialect::TableValued, user),
        );
        plan.apply(entries::Entity::find())
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn no_options_leave_the_query_unfiltered() {
        let plan = compile(
            &EntryFilters::default(),
            &ResolvedMemberships::default(),
            QueryPlan::new(JsonDialect::TableValued, None),
        );
        assert!(plan.condition().is_empty());
        assert!(!plan.joins_metadata());
        assert!(!plan.joins_platform());
    }

    #[test]
    fn empty_strings_count_as_unset() {
        let filters = EntryFilters {
            search_term: Some(String::new()),
            selected_genre: Some(String::new()),
            ..Default::default()
        };
        let plan = compile(
            &filters,
            &ResolvedMemberships::default(),
            QueryPlan::new(JsonDialect::TableValued, None),
        );
        assert!(plan.condition().is_empty());
        assert!(!plan.joins_metadata());
    }

    #[test]
    fn metadata_join_only_for_metadata_arrays() {
        let regional = EntryFilters {
            selected_region: Some("USA".into()),
            selected_language: Some("En".into()),
            ..Default::default()
        };
        let plan = compile(
            &regional,
            &ResolvedMemberships::default(),
            QueryPlan::new(JsonDialect::TableValued, None),
        );
        assert!(!plan.joins_metadata());

        let genre = EntryFilters {
            selected_genre: Some("Action".into()),
            ..Default::default()
        };
        let sql = sql(&genre, &ResolvedMemberships::default(), None);
        assert!(sql.contains("INNER JOIN \"entry_metadata\""), "{sql}");
        assert!(sql.contains("json_each"), "{sql}");
    }

    #[test]
    fn stage_order_does_not_matter() {
        let filters = EntryFilters {
            platform_id: Some(3),
            selected_genre: Some("Action".into()),
            ..Default::default()
        };
        let forward = by_array(
            by_platform_id(QueryPlan::new(JsonDialect::TableValued, None), 3),
            ArrayField::Genres,
            "Action",
        );
        let backward = by_platform_id(
            by_array(
                QueryPlan::new(JsonDialect::TableValued, None),
                ArrayField::Genres,
                "Action",
            ),
            3,
        );
        assert_eq!(forward.joins_metadata(), backward.joins_metadata());
        let compiled = sql(&filters, &ResolvedMemberships::default(), None);
        assert!(compiled.contains("INNER JOIN \"entry_metadata\""), "{compiled}");
        assert!(compiled.contains("\"entries\".\"platform_id\" = 3"), "{compiled}");
    }

    #[test]
    fn playable_joins_platforms() {
        let filters = EntryFilters {
            playable: Some(true),
            ..Default::default()
        };
        let sql = sql(&filters, &ResolvedMemberships::default(), None);
        assert!(sql.contains("INNER JOIN \"platforms\""), "{sql}");
        assert!(sql.contains("'gba'"), "{sql}");
    }

    #[test]
    fn status_is_ignored_without_a_user() {
        let filters = EntryFilters {
            selected_status: Some("backlogged".into()),
            ..Default::default()
        };
        let sql = sql(&filters, &ResolvedMemberships::default(), None);
        assert!(!sql.contains("entry_users"), "{sql}");
    }

    #[test]
    fn hidden_suppression_follows_status() {
        let none = sql(&EntryFilters::default(), &ResolvedMemberships::default(), Some(1));
        assert!(none.contains("LEFT JOIN \"entry_users\""), "{none}");
        assert!(none.contains("\"entry_users\".\"hidden\" IS NULL"), "{none}");

        let hidden = EntryFilters {
            selected_status: Some("hidden".into()),
            ..Default::default()
        };
        let hidden = sql(&hidden, &ResolvedMemberships::default(), Some(1));
        assert!(!hidden.contains("IS NULL"), "{hidden}");

        let custom = EntryFilters {
            selected_status: Some("finished".into()),
            ..Default::default()
        };
        let custom = sql(&custom, &ResolvedMemberships::default(), Some(1));
        assert!(custom.contains("'finished'"), "{custom}");
        assert!(custom.contains("IS NULL"), "{custom}");
    }

    #[test]
    fn unresolved_collections_are_no_ops() {
        let filters = EntryFilters {
            collection_id: Some(99),
            virtual_collection_id: Some("bm9wZTpnZW5yZQ==".into()),
            ..Default::default()
        };
        let plan = compile(
            &filters,
            &ResolvedMemberships::default(),
            QueryPlan::new(JsonDialect::TableValued, None),
        );
        assert!(plan.condition().is_empty());
    }

    #[test]
    fn favourite_without_collection() {
        let wanted = by_favourite(QueryPlan::new(JsonDialect::TableValued, Some(1)), true, None);
        assert!(!wanted.condition().is_empty());

        let unwanted = by_favourite(QueryPlan::new(JsonDialect::TableValued, Some(1)), false, None);
        assert!(unwanted.condition().is_empty());
    }

    #[test]
    fn verified_true_only() {
        let off = EntryFilters {
            verified: Some(false),
            ..Default::default()
        };
        let plan = compile(
            &off,
            &ResolvedMemberships::default(),
            QueryPlan::new(JsonDialect::TableValued, None),
        );
        assert!(plan.condition().is_empty());

        let on = EntryFilters {
            verified: Some(true),
            ..Default::default()
        };
        let sql = sql(&on, &ResolvedMemberships::default(), None);
        assert!(sql.contains("$.nointro_match"), "{sql}");
        assert!(sql.contains("$.fbneo_match"), "{sql}");
    }

    #[test]
    fn search_term_escapes_wildcards() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");

        let filters = EntryFilters {
            search_term: Some("Zelda".into()),
            ..Default::default()
        };
        let sql = sql(&filters, &ResolvedMemberships::default(), None);
        assert!(sql.contains("lower('%Zelda%')"), "{sql}");
    }
}
