//! Abstracts arrive as an inverted index: word -> positions it occupies.

use std::collections::{BTreeMap, HashMap};

pub type InvertedIndex = HashMap<String, Vec<usize>>;

/// Rebuild the text by placing every word at its positions and joining in
/// position order. Gaps in the positions are closed up.
pub fn reconstruct_abstract(index: &InvertedIndex) -> String {
    let mut by_position: BTreeMap<usize, &str> = BTreeMap::new();
    for (word, positions) in index {
        for &pos in positions {
            by_position.insert(pos, word.as_str());
        }
    }
    by_position.into_values().collect::<Vec<_>>().join(" ")
}

/// Derive the inverted index of whitespace-separated text.
pub fn invert_abstract(text: &str) -> InvertedIndex {
    let mut index = InvertedIndex::new();
    for (pos, word) in text.split_whitespace().enumerate() {
        index.entry(word.to_string()).or_default().push(pos);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(entries: &[(&str, &[usize])]) -> InvertedIndex {
        entries.iter().map(|(w, p)| (w.to_string(), p.to_vec())).collect()
    }

    #[test]
    fn words_land_in_position_order() {
        let idx = index(&[("world", &[1]), ("hello", &[0, 2])]);
        assert_eq!(reconstruct_abstract(&idx), "hello world hello");
    }

    #[test]
    fn empty_index_gives_empty_text() {
        assert_eq!(reconstruct_abstract(&InvertedIndex::new()), "");
    }

    #[test]
    fn reinversion_recovers_the_index() {
        let idx = index(&[
            ("quantum", &[0, 4]),
            ("error", &[1]),
            ("correction", &[2]),
            ("beyond", &[3]),
            ("limits", &[5]),
        ]);
        assert_eq!(invert_abstract(&reconstruct_abstract(&idx)), idx);
    }

    #[test]
    fn gaps_are_closed() {
        let idx = index(&[("a", &[0]), ("b", &[7])]);
        assert_eq!(reconstruct_abstract(&idx), "a b");
    }
}
