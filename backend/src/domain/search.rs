//! Client-side herd filtering: free-text matching, the special-cased
//! birth date range query, and the sort keys the herd list offers.
//! The store has no full-text search in this configuration, so all of
//! this runs over fetched aggregates.

use crate::domain::models::cow::Cow;
use crate::domain::models::ranch::Pasture;

/// Sort keys offered by the herd list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Newest,
    Oldest,
    LastUpdated,
    LeastUpdated,
}

impl SortKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "newest" => Some(SortKey::Newest),
            "oldest" => Some(SortKey::Oldest),
            "last_updated" => Some(SortKey::LastUpdated),
            "least_updated" => Some(SortKey::LeastUpdated),
            _ => None,
        }
    }
}

/// Parse a query of the exact form `MM/YYYY-MM/YYYY` (optional
/// surrounding whitespace, hyphen or en-dash separator) into a
/// comparable `year*100+month` pair. Anything else — including
/// near-misses like a one-digit month — is not a date range and falls
/// through to plain text search.
pub fn parse_date_range(query: &str) -> Option<(i32, i32)> {
    let trimmed = query.trim();

    let (left, right) = trimmed
        .split_once('-')
        .or_else(|| trimmed.split_once('\u{2013}'))?;

    let from = parse_month_year(left)?;
    let to = parse_month_year(right)?;
    Some((from, to))
}

/// Exactly `MM/YYYY`: two digit month, four digit year.
fn parse_month_year(part: &str) -> Option<i32> {
    let bytes = part.as_bytes();
    if bytes.len() != 7 || bytes[2] != b'/' {
        return None;
    }
    if !part[..2].bytes().all(|b| b.is_ascii_digit())
        || !part[3..].bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let month: i32 = part[..2].parse().ok()?;
    let year: i32 = part[3..].parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }

    Some(year * 100 + month)
}

/// Whether a cow's birth month/year falls inside the encoded range.
/// Cows missing either birth field never match.
pub fn matches_birth_range(cow: &Cow, from: i32, to: i32) -> bool {
    match cow.birth_key() {
        Some(key) => from <= key && key <= to,
        None => false,
    }
}

/// Case-insensitive substring match across tag numbers, status, breed,
/// description, assigned pasture name, and note text. Keeps the input
/// order; no relevance ranking.
pub fn text_search(query: &str, cows: Vec<Cow>, pastures: &[Pasture]) -> Vec<Cow> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return cows;
    }

    cows.into_iter()
        .filter(|cow| {
            let pasture_name = cow
                .pasture_id
                .as_deref()
                .and_then(|id| pastures.iter().find(|p| p.id == id))
                .map(|p| p.name.as_str());
            cow_matches(cow, pasture_name, &needle)
        })
        .collect()
}

fn cow_matches(cow: &Cow, pasture_name: Option<&str>, needle: &str) -> bool {
    if cow
        .tags
        .iter()
        .any(|tag| tag.number.to_lowercase().contains(needle))
    {
        return true;
    }
    if cow.status.as_str().contains(needle) {
        return true;
    }
    if let Some(breed) = &cow.breed {
        if breed.to_lowercase().contains(needle) {
            return true;
        }
    }
    if let Some(description) = &cow.description {
        if description.to_lowercase().contains(needle) {
            return true;
        }
    }
    if let Some(name) = pasture_name {
        if name.to_lowercase().contains(needle) {
            return true;
        }
    }
    cow.notes
        .iter()
        .any(|note| note.text.to_lowercase().contains(needle))
}

/// Merge text-search results with cow ids matched through medical
/// labels: text matches keep their order and take precedence,
/// medical-only matches are appended in id order, deduplicated by id.
pub fn merge_medical_matches(
    text_matches: Vec<Cow>,
    medical_cow_ids: &[String],
    herd: &[Cow],
) -> Vec<Cow> {
    let mut merged = text_matches;

    for cow_id in medical_cow_ids {
        if merged.iter().any(|cow| &cow.id == cow_id) {
            continue;
        }
        if let Some(cow) = herd.iter().find(|cow| &cow.id == cow_id) {
            merged.push(cow.clone());
        }
    }

    merged
}

/// Stable sort on the respective timestamp.
pub fn sort_cows(cows: &mut [Cow], key: SortKey) {
    match key {
        SortKey::Newest => cows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Oldest => cows.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortKey::LastUpdated => cows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        SortKey::LeastUpdated => cows.sort_by(|a, b| a.updated_at.cmp(&b.updated_at)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::cow::{CowStatus, Note, Tag, TagLabel};
    use chrono::{Duration, TimeZone, Utc};

    fn cow(id: &str, numbers: &[&str]) -> Cow {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Cow {
            id: id.to_string(),
            ranch_id: "ranch-1".to_string(),
            description: None,
            status: CowStatus::Wet,
            breed: None,
            birth_month: None,
            birth_year: None,
            pasture_id: None,
            photos: Vec::new(),
            mother_tag: None,
            tags: numbers
                .iter()
                .map(|n| Tag {
                    id: format!("tag-{}", n),
                    label: TagLabel::EarTag,
                    number: n.to_string(),
                })
                .collect(),
            notes: Vec::new(),
            medical: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn date_range_round_trip() {
        assert_eq!(parse_date_range("02/2024-06/2025"), Some((202402, 202506)));
        assert_eq!(parse_date_range("  02/2024 - 06/2025  "), None); // inner spaces break the form
        assert_eq!(parse_date_range(" 02/2024-06/2025 "), Some((202402, 202506)));
        assert_eq!(parse_date_range("02/2024\u{2013}06/2025"), Some((202402, 202506)));
    }

    #[test]
    fn date_range_near_misses_are_not_ranges() {
        assert_eq!(parse_date_range("2/2024-06/2025"), None);
        assert_eq!(parse_date_range("02/2024-06/25"), None);
        assert_eq!(parse_date_range("13/2024-06/2025"), None);
        assert_eq!(parse_date_range("02/2024"), None);
        assert_eq!(parse_date_range("A100"), None);
    }

    #[test]
    fn birth_range_matching() {
        let mut c = cow("c1", &["A1"]);
        c.birth_month = Some(3);
        c.birth_year = Some(2024);
        assert!(matches_birth_range(&c, 202402, 202506));

        c.birth_month = Some(1);
        assert!(!matches_birth_range(&c, 202402, 202506));

        c.birth_month = None;
        assert!(!matches_birth_range(&c, 202402, 202506));
    }

    #[test]
    fn text_search_hits_all_fields() {
        let pastures = vec![Pasture {
            id: "p1".to_string(),
            name: "North Forty".to_string(),
            created_at: Utc::now(),
        }];

        let mut by_tag = cow("c1", &["A100"]);
        by_tag.breed = Some("Angus".to_string());
        let mut by_pasture = cow("c2", &["B2"]);
        by_pasture.pasture_id = Some("p1".to_string());
        let mut by_note = cow("c3", &["C3"]);
        by_note.notes.push(Note {
            id: "n1".to_string(),
            text: "treated for pinkeye".to_string(),
            created_at: Utc::now(),
        });

        let herd = vec![by_tag, by_pasture, by_note];

        let hits = text_search("a10", herd.clone(), &pastures);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "c1");

        let hits = text_search("north", herd.clone(), &pastures);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "c2");

        let hits = text_search("PINKEYE", herd.clone(), &pastures);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "c3");

        // Status matches too.
        let hits = text_search("wet", herd, &pastures);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn merge_appends_medical_only_matches() {
        let herd = vec![cow("c1", &["A1"]), cow("c2", &["B2"]), cow("c3", &["C3"])];
        let text_matches = vec![herd[2].clone(), herd[0].clone()];
        let medical_ids = vec!["c1".to_string(), "c2".to_string()];

        let merged = merge_medical_matches(text_matches, &medical_ids, &herd);
        let ids: Vec<&str> = merged.iter().map(|c| c.id.as_str()).collect();
        // Text order first, medical-only appended, no duplicate c1.
        assert_eq!(ids, vec!["c3", "c1", "c2"]);
    }

    #[test]
    fn sort_keys_order_by_the_right_timestamp() {
        let mut a = cow("a", &["A1"]);
        let mut b = cow("b", &["B2"]);
        a.created_at = a.created_at - Duration::days(5);
        b.updated_at = b.updated_at + Duration::days(1);
        let mut cows = vec![a.clone(), b.clone()];

        sort_cows(&mut cows, SortKey::Newest);
        assert_eq!(cows[0].id, "b");
        sort_cows(&mut cows, SortKey::Oldest);
        assert_eq!(cows[0].id, "a");
        sort_cows(&mut cows, SortKey::LastUpdated);
        assert_eq!(cows[0].id, "b");
        sort_cows(&mut cows, SortKey::LeastUpdated);
        assert_eq!(cows[0].id, "a");
    }
}
