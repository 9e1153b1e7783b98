//! Virtual collections: memberships computed from metadata arrays.
//!
//! A virtual collection is named by one array element (a genre, a franchise,
//! ...) and contains every entry whose metadata lists it. Its id is the
//! URL-safe base64 of `"{name}:{type}"`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use serde::Serialize;
use thiserror::Error;

use super::json_array::ArrayField;
use crate::entities::entry_metadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VirtualCollectionKind {
    Genre,
    Franchise,
    Collection,
    Company,
    Mode,
}

impl VirtualCollectionKind {
    pub const ALL: [Self; 5] = [
        Self::Genre,
        Self::Franchise,
        Self::Collection,
        Self::Company,
        Self::Mode,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Genre => "genre",
            Self::Franchise => "franchise",
            Self::Collection => "collection",
            Self::Company => "company",
            Self::Mode => "mode",
        }
    }

    /// Metadata column the membership is computed from.
    #[must_use]
    pub const fn field(self) -> ArrayField {
        match self {
            Self::Genre => ArrayField::Genres,
            Self::Franchise => ArrayField::Franchises,
            Self::Collection => ArrayField::Collections,
            Self::Company => ArrayField::Companies,
            Self::Mode => ArrayField::GameModes,
        }
    }

    fn values(self, metadata: &entry_metadata::Model) -> Vec<&str> {
        let column = match self {
            Self::Genre => &metadata.genres,
            Self::Franchise => &metadata.franchises,
            Self::Collection => &metadata.collections,
            Self::Company => &metadata.companies,
            Self::Mode => &metadata.game_modes,
        };
        column
            .as_ref()
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(|item| item.as_str()).collect())
            .unwrap_or_default()
    }
}

impl fmt::Display for VirtualCollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a virtual collection id or type name could not be read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VirtualCollectionIdError {
    #[error("invalid virtual collection id: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("virtual collection id is not UTF-8")]
    NotUtf8,

    #[error("virtual collection id has no type")]
    MissingType,

    #[error("unknown virtual collection type: {0}")]
    UnknownType(String),
}

impl FromStr for VirtualCollectionKind {
    type Err = VirtualCollectionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| VirtualCollectionIdError::UnknownType(s.to_string()))
    }
}

#[must_use]
pub fn encode_id(name: &str, kind: VirtualCollectionKind) -> String {
    URL_SAFE.encode(format!("{name}:{kind}"))
}

/// Splits an id back into `(name, kind)`. Names may themselves contain
/// `:`; the type is everything after the last one.
pub fn decode_id(id: &str) -> Result<(String, VirtualCollectionKind), VirtualCollectionIdError> {
    let bytes = URL_SAFE.decode(id)?;
    let text = String::from_utf8(bytes).map_err(|_| VirtualCollectionIdError::NotUtf8)?;
    let (name, kind) = text
        .rsplit_once(':')
        .ok_or(VirtualCollectionIdError::MissingType)?;
    Ok((name.to_string(), kind.parse()?))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualCollection {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VirtualCollectionKind,
    pub rom_ids: Vec<i32>,
}

impl VirtualCollection {
    #[must_use]
    pub fn new(name: &str, kind: VirtualCollectionKind, mut rom_ids: Vec<i32>) -> Self {
        rom_ids.sort_unstable();
        rom_ids.dedup();
        Self {
            id: encode_id(name, kind),
            name: name.to_string(),
            kind,
            rom_ids,
        }
    }
}

/// Every non-empty virtual collection of `kind` over `metadata`, ordered by
/// name.
#[must_use]
pub fn build_all(
    kind: VirtualCollectionKind,
    metadata: &[entry_metadata::Model],
) -> Vec<VirtualCollection> {
    let mut members: BTreeMap<&str, Vec<i32>> = BTreeMap::new();
    for row in metadata {
        for value in kind.values(row) {
            members.entry(value).or_default().push(row.rom_id);
        }
    }

    members
        .into_iter()
        .map(|(name, ids)| VirtualCollection::new(name, kind, ids))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(rom_id: i32, genres: serde_json::Value) -> entry_metadata::Model {
        entry_metadata::Model {
            rom_id,
            genres: Some(genres),
            franchises: None,
            collections: None,
            companies: None,
            game_modes: None,
            age_ratings: None,
            first_release_date: None,
            average_rating: None,
        }
    }

    #[test]
    fn id_encodes_name_and_type() {
        let id = encode_id("Action", VirtualCollectionKind::Genre);
        assert_eq!(id, "QWN0aW9uOmdlbnJl");
        assert_eq!(
            decode_id(&id).unwrap(),
            ("Action".to_string(), VirtualCollectionKind::Genre)
        );
    }

    #[test]
    fn names_may_contain_colons() {
        let id = encode_id("Zelda: Oracle", VirtualCollectionKind::Franchise);
        let (name, kind) = decode_id(&id).unwrap();
        assert_eq!(name, "Zelda: Oracle");
        assert_eq!(kind, VirtualCollectionKind::Franchise);
    }

    #[test]
    fn malformed_ids_are_rejected() {
        assert!(matches!(
            decode_id("not base64!"),
            Err(VirtualCollectionIdError::Encoding(_))
        ));
        assert_eq!(
            decode_id(&URL_SAFE.encode("no-type")),
            Err(VirtualCollectionIdError::MissingType)
        );
        assert_eq!(
            decode_id(&URL_SAFE.encode("Action:platform")),
            Err(VirtualCollectionIdError::UnknownType("platform".to_string()))
        );
    }

    #[test]
    fn build_all_groups_by_element() {
        let rows = vec![
            metadata(1, json!(["Action", "Platformer"])),
            metadata(2, json!(["Action"])),
            metadata(3, json!([])),
        ];

        let collections = build_all(VirtualCollectionKind::Genre, &rows);
        let summary: Vec<(&str, &[i32])> = collections
            .iter()
            .map(|c| (c.name.as_str(), c.rom_ids.as_slice()))
            .collect();
        assert_eq!(summary, vec![("Action", &[1, 2][..]), ("Platformer", &[1][..])]);
        assert!(build_all(VirtualCollectionKind::Company, &rows).is_empty());
    }
}
