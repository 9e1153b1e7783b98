//! Collapses sibling entries into one representative per matched title.
//!
//! Entries are keyed by the first provider id present in the order igdb,
//! moby, ss, launchbox. Within a key the user's main sibling wins, then the
//! lowest `fs_name_no_ext`, then the lowest id. Entries with none of those
//! provider ids form singleton groups.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::entities::entries;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Provider {
        provider: &'static str,
        platform_id: i32,
        provider_id: i32,
    },
    Ungrouped {
        platform_id: i32,
        entry_id: i32,
    },
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider {
                provider,
                platform_id,
                provider_id,
            } => write!(f, "{provider}-{platform_id}-{provider_id}"),
            Self::Ungrouped {
                platform_id,
                entry_id,
            } => write!(f, "romm-{platform_id}-{entry_id}"),
        }
    }
}

#[must_use]
pub fn group_key(entry: &entries::Model) -> GroupKey {
    let candidates = [
        ("igdb", entry.igdb_id),
        ("moby", entry.moby_id),
        ("ss", entry.ss_id),
        ("launchbox", entry.launchbox_id),
    ];

    candidates
        .into_iter()
        .find_map(|(provider, id)| {
            id.map(|provider_id| GroupKey::Provider {
                provider,
                platform_id: entry.platform_id,
                provider_id,
            })
        })
        .unwrap_or(GroupKey::Ungrouped {
            platform_id: entry.platform_id,
            entry_id: entry.id,
        })
}

/// Per-entry `is_main_sibling` flags of the requesting user.
///
/// Passing `None` to [`representatives`] means there is no user context and
/// every member ties on the main-sibling rank.
pub type MainSiblingFlags = HashMap<i32, Option<bool>>;

fn rank<'a>(
    entry: &'a entries::Model,
    flags: Option<&MainSiblingFlags>,
) -> (Reverse<u8>, &'a str, i32) {
    let is_main = flags
        .and_then(|flags| flags.get(&entry.id).copied().flatten())
        .unwrap_or(false);
    (Reverse(u8::from(is_main)), entry.fs_name_no_ext.as_str(), entry.id)
}

/// Ids of the rank-1 member of every group present in `entries`.
#[must_use]
pub fn representatives(
    entries: &[entries::Model],
    flags: Option<&MainSiblingFlags>,
) -> HashSet<i32> {
    let mut best: HashMap<GroupKey, &entries::Model> = HashMap::new();

    for entry in entries {
        best.entry(group_key(entry))
            .and_modify(|current| {
                if rank(entry, flags) < rank(*current, flags) {
                    *current = entry;
                }
            })
            .or_insert(entry);
    }

    best.into_values().map(|entry| entry.id).collect()
}

/// Keeps only group representatives, preserving the input order.
#[must_use]
pub fn collapse(
    entries: Vec<entries::Model>,
    flags: Option<&MainSiblingFlags>,
) -> Vec<entries::Model> {
    let keep = representatives(&entries, flags);
    entries
        .into_iter()
        .filter(|entry| keep.contains(&entry.id))
        .collect()
}
