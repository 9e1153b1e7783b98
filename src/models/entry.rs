use serde::{Deserialize, Serialize};

use crate::catalog::EntryFilters;
use crate::domain::UserId;
use crate::entities::{entries, entry_files, entry_metadata, entry_users};

/// An entry with everything a list or detail view needs.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub entry: entries::Model,
    pub files: Vec<entry_files::Model>,
    /// The requesting user's row, when there is a user and they have one.
    pub user_state: Option<entry_users::Model>,
    pub metadata: Option<entry_metadata::Model>,
    pub sibling_ids: Vec<i32>,
    pub fs_size_bytes: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEntry {
    pub platform_id: i32,
    pub fs_name: String,
    pub name: String,
    pub igdb_id: Option<i32>,
    pub moby_id: Option<i32>,
    pub ss_id: Option<i32>,
    pub ra_id: Option<i32>,
    pub launchbox_id: Option<i32>,
    pub hasheous_id: Option<i32>,
    pub regions: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub hasheous_metadata: Option<serde_json::Value>,
}

/// Partial entry update. `None` leaves a field untouched; for nullable
/// columns `Some(None)` clears it.
///
/// `missing_from_fs` is deliberately absent: only missing-file
/// recomputation may change it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryUpdate {
    pub name: Option<String>,
    pub fs_name: Option<String>,
    pub igdb_id: Option<Option<i32>>,
    pub moby_id: Option<Option<i32>>,
    pub ss_id: Option<Option<i32>>,
    pub ra_id: Option<Option<i32>>,
    pub launchbox_id: Option<Option<i32>>,
    pub hasheous_id: Option<Option<i32>>,
    pub regions: Option<Option<Vec<String>>>,
    pub languages: Option<Option<Vec<String>>>,
    pub hasheous_metadata: Option<Option<serde_json::Value>>,
}

/// Partial per-user state. Same `None`/`Some(None)` convention as
/// [`EntryUpdate`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserStateUpdate {
    pub status: Option<Option<String>>,
    pub now_playing: Option<bool>,
    pub backlogged: Option<bool>,
    pub hidden: Option<bool>,
    pub is_main_sibling: Option<Option<bool>>,
    pub last_played: Option<Option<String>>,
    pub rating: Option<Option<i32>>,
    pub difficulty: Option<Option<i32>>,
    pub completion: Option<Option<i32>>,
}

impl UserStateUpdate {
    /// True iff this update designates the entry as the user's main sibling.
    #[must_use]
    pub fn sets_main_sibling(&self) -> bool {
        self.is_main_sibling == Some(Some(true))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntryFile {
    pub file_name: String,
    pub file_path: String,
    pub file_size_bytes: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileUpdate {
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub file_size_bytes: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCollection {
    pub name: String,
    pub description: Option<String>,
    pub user_id: Option<i32>,
    pub is_public: bool,
    pub rom_ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlatform {
    pub slug: String,
    pub name: String,
}

/// Provider metadata for one entry. Arrays are stored as JSON arrays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataInput {
    pub genres: Vec<String>,
    pub franchises: Vec<String>,
    pub collections: Vec<String>,
    pub companies: Vec<String>,
    pub game_modes: Vec<String>,
    pub age_ratings: Vec<String>,
    pub first_release_date: Option<i64>,
    pub average_rating: Option<f64>,
}

/// Window applied after grouping and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

/// Everything a list request can ask for.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EntryQuery {
    #[serde(flatten)]
    pub filters: EntryFilters,
    pub group_by_meta_id: bool,
    pub order_by: Option<String>,
    pub order_dir: Option<String>,
    pub user_id: Option<UserId>,
    pub page: Option<Page>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryPage {
    /// Size of the grouped, ordered result before the page window.
    pub total: usize,
    pub offset: u64,
    pub items: Vec<CatalogEntry>,
}

/// Strips the last extension from a filesystem name.
///
/// ```
/// # use romshelf::models::entry::fs_name_no_ext;
/// assert_eq!(fs_name_no_ext("Super Game (USA).zip"), "Super Game (USA)");
/// assert_eq!(fs_name_no_ext("folder"), "folder");
/// ```
#[must_use]
pub fn fs_name_no_ext(fs_name: &str) -> String {
    std::path::Path::new(fs_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(fs_name)
        .to_string()
}
