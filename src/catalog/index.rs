use std::collections::BTreeMap;

use serde::Serialize;

use crate::entities::entries;

/// First row of the result that starts with `letter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LetterOffset {
    pub letter: String,
    pub position: usize,
}

/// Jump table over an already ordered result: for every distinct lowercased
/// first character of `name`, the smallest zero-based position where it
/// occurs. Sorted by letter. Entries with an empty name are skipped.
#[must_use]
pub fn char_index(entries: &[entries::Model]) -> Vec<LetterOffset> {
    let mut first_seen: BTreeMap<String, usize> = BTreeMap::new();

    for (position, entry) in entries.iter().enumerate() {
        let Some(first) = entry.name.chars().next() else {
            continue;
        };
        first_seen
            .entry(first.to_lowercase().collect())
            .or_insert(position);
    }

    first_seen
        .into_iter()
        .map(|(letter, position)| LetterOffset { letter, position })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::entry;

    #[test]
    fn minimum_position_per_letter() {
        let rows = vec![
            entry(1, 1, "alpha"),
            entry(2, 1, "Beta"),
            entry(3, 1, "Another"),
            entry(4, 1, "bravo"),
            entry(5, 1, "7th Saga"),
        ];

        let index = char_index(&rows);
        let pairs: Vec<(&str, usize)> = index
            .iter()
            .map(|o| (o.letter.as_str(), o.position))
            .collect();
        assert_eq!(pairs, vec![("7", 4), ("a", 0), ("b", 1)]);
    }

    #[test]
    fn empty_input_gives_empty_index() {
        assert!(char_index(&[]).is_empty());
    }
}
