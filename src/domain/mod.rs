//! Domain types for the catalog with strong typing.
//!
//! Newtype wrappers keep entry ids and user ids from being mixed up at the
//! service boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a catalog entry.
///
/// # Examples
///
/// ```rust
/// use romshelf::domain::EntryId;
///
/// let id = EntryId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EntryId(i32);

impl EntryId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        debug_assert!(id >= 0, "EntryId should be non-negative");
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EntryId> for i32 {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

impl From<i32> for EntryId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl Serialize for EntryId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = i32::deserialize(deserializer)?;
        Ok(Self::new(id))
    }
}

/// Identifier of the user a request is made on behalf of.
///
/// Users are owned by the authentication layer; the catalog only stores the
/// raw id on per-user rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

/// Sort direction.
///
/// Parsing is lenient: only `desc` (any case) selects descending order,
/// everything else, including an absent value, is ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        matches!(self, Self::Ascending)
    }

    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(dir) if dir.eq_ignore_ascii_case("desc") => Self::Descending,
            _ => Self::Ascending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_id_conversions() {
        let id = EntryId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(EntryId::from(42), id);
    }

    #[test]
    fn entry_id_serialization() {
        let id = EntryId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let back: EntryId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn user_id_is_transparent() {
        let json = serde_json::to_string(&UserId::new(3)).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn sort_order_parsing_is_lenient() {
        assert_eq!(SortOrder::parse(Some("desc")), SortOrder::Descending);
        assert_eq!(SortOrder::parse(Some("DESC")), SortOrder::Descending);
        assert_eq!(SortOrder::parse(Some("asc")), SortOrder::Ascending);
        assert_eq!(SortOrder::parse(Some("sideways")), SortOrder::Ascending);
        assert_eq!(SortOrder::parse(None), SortOrder::Ascending);
        assert!(!SortOrder::Descending.is_ascending());
    }
}
