//! Resolves `order_by` keys and orders result rows.
//!
//! Keys are looked up in a fixed registry rather than matched against entity
//! attributes at runtime. Textual keys compare on a normalized form: lower
//! case, one leading article removed, trimmed.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::SortOrder;
use crate::entities::{entries, entry_metadata, entry_users};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    Id,
    Name,
    FsName,
    FsNameNoExt,
    PlatformId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    LastPlayed,
    Rating,
    Difficulty,
    Completion,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    FirstReleaseDate,
    AverageRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputedField {
    /// Sum of the entry's file sizes, 0 when it has no files.
    FsSizeBytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Entry(EntryField),
    User(UserField),
    Metadata(MetadataField),
    Computed(ComputedField),
}

const REGISTRY: &[(&str, SortField)] = &[
    ("id", SortField::Entry(EntryField::Id)),
    ("name", SortField::Entry(EntryField::Name)),
    ("fs_name", SortField::Entry(EntryField::FsName)),
    ("fs_name_no_ext", SortField::Entry(EntryField::FsNameNoExt)),
    ("platform_id", SortField::Entry(EntryField::PlatformId)),
    ("created_at", SortField::Entry(EntryField::CreatedAt)),
    ("updated_at", SortField::Entry(EntryField::UpdatedAt)),
    ("fs_size_bytes", SortField::Computed(ComputedField::FsSizeBytes)),
    ("last_played", SortField::User(UserField::LastPlayed)),
    ("rating", SortField::User(UserField::Rating)),
    ("difficulty", SortField::User(UserField::Difficulty)),
    ("completion", SortField::User(UserField::Completion)),
    ("status", SortField::User(UserField::Status)),
    ("first_release_date", SortField::Metadata(MetadataField::FirstReleaseDate)),
    ("average_rating", SortField::Metadata(MetadataField::AverageRating)),
];

impl SortField {
    pub const DEFAULT: Self = Self::Entry(EntryField::Name);

    /// Looks `order_by` up in the registry.
    ///
    /// Per-user keys need a user; without one they, like unknown keys, fall
    /// back to ordering by name.
    #[must_use]
    pub fn resolve(order_by: Option<&str>, has_user: bool) -> Self {
        let Some(key) = order_by else {
            return Self::DEFAULT;
        };

        match REGISTRY.iter().find(|(name, _)| *name == key) {
            Some((_, Self::User(_))) if !has_user => Self::DEFAULT,
            Some((_, field)) => *field,
            None => Self::DEFAULT,
        }
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        REGISTRY
            .iter()
            .find(|(_, field)| *field == self)
            .map_or("name", |(name, _)| *name)
    }
}

/// A comparable sort value. Values of one field are always the same variant.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl SortValue {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Lowercases, strips one leading `the`/`a`/`an` and trims.
#[must_use]
pub fn normalize_sort_text(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i)^(the|a|an)\s+").expect("Invalid regex"));

    let lowered = text.to_lowercase();
    re.replace(&lowered, "").trim().to_string()
}

/// Related rows the non-entry keys read from, keyed by entry id.
#[derive(Debug, Clone, Copy)]
pub struct SortContext<'a> {
    pub users: &'a HashMap<i32, entry_users::Model>,
    pub metadata: &'a HashMap<i32, entry_metadata::Model>,
    pub sizes: &'a HashMap<i32, i64>,
}

impl SortContext<'_> {
    /// The value `entry` sorts by, or `None` when the key is per-user or
    /// metadata and the entry has no value for it.
    #[must_use]
    pub fn value(&self, entry: &entries::Model, field: SortField) -> Option<SortValue> {
        let text = |s: &str| SortValue::Text(normalize_sort_text(s));

        match field {
            SortField::Entry(field) => Some(match field {
                EntryField::Id => SortValue::Int(entry.id.into()),
                EntryField::Name => text(&entry.name),
                EntryField::FsName => text(&entry.fs_name),
                EntryField::FsNameNoExt => text(&entry.fs_name_no_ext),
                EntryField::PlatformId => SortValue::Int(entry.platform_id.into()),
                EntryField::CreatedAt => SortValue::Text(entry.created_at.clone()),
                EntryField::UpdatedAt => SortValue::Text(entry.updated_at.clone()),
            }),
            SortField::User(field) => {
                let user = self.users.get(&entry.id)?;
                match field {
                    UserField::LastPlayed => user.last_played.clone().map(SortValue::Text),
                    UserField::Rating => user.rating.map(|v| SortValue::Int(v.into())),
                    UserField::Difficulty => user.difficulty.map(|v| SortValue::Int(v.into())),
                    UserField::Completion => user.completion.map(|v| SortValue::Int(v.into())),
                    UserField::Status => user.status.as_deref().map(text),
                }
            }
            SortField::Metadata(field) => {
                let metadata = self.metadata.get(&entry.id)?;
                match field {
                    MetadataField::FirstReleaseDate => {
                        metadata.first_release_date.map(SortValue::Int)
                    }
                    MetadataField::AverageRating => metadata.average_rating.map(SortValue::Float),
                }
            }
            SortField::Computed(ComputedField::FsSizeBytes) => Some(SortValue::Int(
                self.sizes.get(&entry.id).copied().unwrap_or(0),
            )),
        }
    }
}

/// Orders `entries` by `field`.
///
/// Rows without a value for a per-user or metadata key are dropped. The
/// sort is stable in both directions, so ties keep their input order.
#[must_use]
pub fn sort_entries(
    entries: Vec<entries::Model>,
    field: SortField,
    order: SortOrder,
    ctx: &SortContext<'_>,
) -> Vec<entries::Model> {
    let mut keyed: Vec<(SortValue, entries::Model)> = entries
        .into_iter()
        .filter_map(|entry| ctx.value(&entry, field).map(|value| (value, entry)))
        .collect();

    if order.is_ascending() {
        keyed.sort_by(|(a, _), (b, _)| a.compare(b));
    } else {
        keyed.sort_by(|(a, _), (b, _)| b.compare(a));
    }

    keyed.into_iter().map(|(_, entry)| entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::entry;

    struct Maps {
        users: HashMap<i32, entry_users::Model>,
        metadata: HashMap<i32, entry_metadata::Model>,
        sizes: HashMap<i32, i64>,
    }

    impl Maps {
        fn empty() -> Self {
            Self {
                users: HashMap::new(),
                metadata: HashMap::new(),
                sizes: HashMap::new(),
            }
        }

        fn ctx(&self) -> SortContext<'_> {
            SortContext {
                users: &self.users,
                metadata: &self.metadata,
                sizes: &self.sizes,
            }
        }
    }

    fn user_row(rom_id: i32, rating: Option<i32>) -> entry_users::Model {
        entry_users::Model {
            id: rom_id,
            rom_id,
            user_id: 1,
            status: None,
            now_playing: false,
            backlogged: false,
            hidden: false,
            is_main_sibling: None,
            last_played: None,
            rating,
            difficulty: None,
            completion: None,
            updated_at: String::new(),
        }
    }

    fn names(entries: &[entries::Model]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn normalization_strips_one_leading_article() {
        assert_eq!(normalize_sort_text("The Legend"), "legend");
        assert_eq!(normalize_sort_text("A Game"), "game");
        assert_eq!(normalize_sort_text("AN  Apple "), "apple");
        assert_eq!(normalize_sort_text("Theme Park"), "theme park");
        assert_eq!(normalize_sort_text("The The Band"), "the band");
    }

    #[test]
    fn names_sort_ignoring_articles_and_case() {
        let maps = Maps::empty();
        let rows = vec![
            entry(1, 1, "The Legend"),
            entry(2, 1, "A Game"),
            entry(3, 1, "Zelda"),
        ];

        let asc = sort_entries(rows.clone(), SortField::DEFAULT, SortOrder::Ascending, &maps.ctx());
        assert_eq!(names(&asc), ["A Game", "The Legend", "Zelda"]);

        let desc = sort_entries(rows, SortField::DEFAULT, SortOrder::Descending, &maps.ctx());
        assert_eq!(names(&desc), ["Zelda", "The Legend", "A Game"]);
    }

    #[test]
    fn resolution_falls_back_to_name() {
        assert_eq!(SortField::resolve(None, true), SortField::DEFAULT);
        assert_eq!(SortField::resolve(Some("no_such_column"), true), SortField::DEFAULT);
        assert_eq!(SortField::resolve(Some("rating"), false), SortField::DEFAULT);
        assert_eq!(
            SortField::resolve(Some("rating"), true),
            SortField::User(UserField::Rating)
        );
        assert_eq!(
            SortField::resolve(Some("average_rating"), false),
            SortField::Metadata(MetadataField::AverageRating)
        );
        assert_eq!(
            SortField::resolve(Some("fs_size_bytes"), false),
            SortField::Computed(ComputedField::FsSizeBytes)
        );
        assert_eq!(SortField::User(UserField::LastPlayed).key(), "last_played");
    }

    #[test]
    fn user_keys_drop_rows_without_a_value() {
        let mut maps = Maps::empty();
        maps.users.insert(1, user_row(1, Some(3)));
        maps.users.insert(2, user_row(2, None));
        maps.users.insert(3, user_row(3, Some(9)));

        let rows = vec![
            entry(1, 1, "a"),
            entry(2, 1, "b"),
            entry(3, 1, "c"),
            entry(4, 1, "d"),
        ];
        let sorted = sort_entries(
            rows,
            SortField::User(UserField::Rating),
            SortOrder::Descending,
            &maps.ctx(),
        );
        assert_eq!(sorted.iter().map(|e| e.id).collect::<Vec<_>>(), vec![3, 1]);
    }

    #[test]
    fn file_size_treats_missing_files_as_zero() {
        let mut maps = Maps::empty();
        maps.sizes.insert(1, 300);
        maps.sizes.insert(2, 100);

        let rows = vec![entry(1, 1, "a"), entry(2, 1, "b"), entry(3, 1, "c")];
        let sorted = sort_entries(
            rows,
            SortField::Computed(ComputedField::FsSizeBytes),
            SortOrder::Ascending,
            &maps.ctx(),
        );
        assert_eq!(sorted.iter().map(|e| e.id).collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn ties_keep_input_order() {
        let maps = Maps::empty();
        let rows = vec![entry(5, 1, "Same"), entry(2, 1, "the same"), entry(9, 1, "SAME")];

        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let sorted = sort_entries(rows.clone(), SortField::DEFAULT, order, &maps.ctx());
            assert_eq!(sorted.iter().map(|e| e.id).collect::<Vec<_>>(), vec![5, 2, 9]);
        }
    }
}
