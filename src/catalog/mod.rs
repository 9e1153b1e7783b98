//! The pure catalog engine.
//!
//! Filtering compiles to SQL conditions over the `entries` table; grouping,
//! ordering and the letter index run in memory over the rows the filter
//! produced. Nothing in here touches a connection.

pub mod filters;
pub mod grouping;
pub mod index;
pub mod json_array;
pub mod siblings;
pub mod sorting;
pub mod virtual_collection;

pub use filters::{EntryFilters, QueryPlan, ResolvedMemberships, compile};
pub use grouping::{GroupKey, MainSiblingFlags, collapse, group_key};
pub use index::{LetterOffset, char_index};
pub use json_array::{ArrayField, JsonDialect};
pub use siblings::sibling_map;
pub use sorting::{SortContext, SortField, sort_entries};
pub use virtual_collection::{VirtualCollection, VirtualCollectionKind};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::entities::entries;

    /// Bare entry with no provider ids and no JSON fields.
    pub fn entry(id: i32, platform_id: i32, name: &str) -> entries::Model {
        entries::Model {
            id,
            platform_id,
            fs_name: format!("{name}.zip"),
            fs_name_no_ext: name.to_string(),
            name: name.to_string(),
            igdb_id: None,
            moby_id: None,
            ss_id: None,
            ra_id: None,
            launchbox_id: None,
            hasheous_id: None,
            missing_from_fs: false,
            regions: None,
            languages: None,
            hasheous_metadata: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }
}
