//! Sibling detection.
//!
//! Two entries are siblings when they sit on the same platform and share at
//! least one non-null provider id. The relation is symmetric and never
//! includes the entry itself.

use std::collections::{BTreeSet, HashMap};

use sea_orm::sea_query::{Alias, Condition, Expr, Query, SimpleExpr};
use sea_orm::ColumnTrait;

use crate::entities::entries;

/// Provider id columns that link siblings.
pub const SIBLING_PROVIDERS: [entries::Column; 6] = [
    entries::Column::IgdbId,
    entries::Column::MobyId,
    entries::Column::SsId,
    entries::Column::RaId,
    entries::Column::LaunchboxId,
    entries::Column::HasheousId,
];

/// Provider ids in [`SIBLING_PROVIDERS`] order.
#[must_use]
pub fn provider_ids(entry: &entries::Model) -> [Option<i32>; 6] {
    [
        entry.igdb_id,
        entry.moby_id,
        entry.ss_id,
        entry.ra_id,
        entry.launchbox_id,
        entry.hasheous_id,
    ]
}

/// `EXISTS` subquery that is true iff the outer `entries` row has a sibling.
#[must_use]
pub fn has_sibling() -> SimpleExpr {
    let sibling = Alias::new("sibling");

    let shares_provider = SIBLING_PROVIDERS.iter().fold(Condition::any(), |cond, column| {
        cond.add(Expr::col((sibling.clone(), *column)).equals((entries::Entity, *column)))
    });

    let subquery = Query::select()
        .expr(Expr::val(1))
        .from_as(entries::Entity, sibling.clone())
        .and_where(
            Expr::col((sibling.clone(), entries::Column::PlatformId))
                .equals((entries::Entity, entries::Column::PlatformId)),
        )
        .and_where(
            Expr::col((sibling.clone(), entries::Column::Id))
                .ne(Expr::col((entries::Entity, entries::Column::Id))),
        )
        .cond_where(shares_provider)
        .to_owned();

    Expr::exists(subquery)
}

/// Condition selecting the siblings of one entry, or `None` when it has no
/// provider ids and therefore cannot have any.
#[must_use]
pub fn siblings_of(entry: &entries::Model) -> Option<Condition> {
    let shares_provider = SIBLING_PROVIDERS
        .iter()
        .zip(provider_ids(entry))
        .filter_map(|(column, id)| id.map(|id| column.eq(id)))
        .fold(Condition::any(), Condition::add);

    if shares_provider.is_empty() {
        return None;
    }

    Some(
        Condition::all()
            .add(entries::Column::PlatformId.eq(entry.platform_id))
            .add(entries::Column::Id.ne(entry.id))
            .add(shares_provider),
    )
}

/// Computes the sibling ids of every entry in `entries`, considering only
/// the entries passed in. Ids are ascending; entries without siblings map to
/// an empty list.
#[must_use]
pub fn sibling_map(entries: &[entries::Model]) -> HashMap<i32, Vec<i32>> {
    let mut by_provider: HashMap<(i32, usize, i32), Vec<i32>> = HashMap::new();
    for entry in entries {
        for (slot, id) in provider_ids(entry).into_iter().enumerate() {
            if let Some(id) = id {
                by_provider
                    .entry((entry.platform_id, slot, id))
                    .or_default()
                    .push(entry.id);
            }
        }
    }

    entries
        .iter()
        .map(|entry| {
            let mut ids = BTreeSet::new();
            for (slot, id) in provider_ids(entry).into_iter().enumerate() {
                let Some(id) = id else { continue };
                if let Some(members) = by_provider.get(&(entry.platform_id, slot, id)) {
                    ids.extend(members.iter().copied().filter(|other| *other != entry.id));
                }
            }
            (entry.id, ids.into_iter().collect())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::entry;

    #[test]
    fn siblings_share_platform_and_provider() {
        let mut a = entry(1, 7, "a");
        a.igdb_id = Some(42);
        let mut b = entry(2, 7, "b");
        b.igdb_id = Some(42);
        let mut c = entry(3, 8, "c");
        c.igdb_id = Some(42);
        let d = entry(4, 7, "d");

        let map = sibling_map(&[a, b, c, d]);
        assert_eq!(map[&1], vec![2]);
        assert_eq!(map[&2], vec![1]);
        assert!(map[&3].is_empty());
        assert!(map[&4].is_empty());
    }

    #[test]
    fn any_shared_provider_links_siblings() {
        let mut a = entry(1, 1, "a");
        a.igdb_id = Some(5);
        a.ra_id = Some(9);
        let mut b = entry(2, 1, "b");
        b.ra_id = Some(9);
        let mut c = entry(3, 1, "c");
        c.igdb_id = Some(5);

        let map = sibling_map(&[a, b, c]);
        assert_eq!(map[&1], vec![2, 3]);
        assert_eq!(map[&2], vec![1]);
        assert_eq!(map[&3], vec![1]);
    }

    #[test]
    fn unmatched_entry_has_no_sibling_condition() {
        assert!(siblings_of(&entry(1, 1, "solo")).is_none());

        let mut matched = entry(1, 1, "matched");
        matched.moby_id = Some(3);
        assert!(siblings_of(&matched).is_some());
    }
}
