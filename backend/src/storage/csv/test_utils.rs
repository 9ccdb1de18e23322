//! Shared fixtures for storage tests.

use chrono::Utc;
use tempfile::TempDir;

use super::connection::CsvConnection;
use crate::domain::models::cow::{Cow, CowStatus, Tag, TagLabel};

/// A connection rooted in a fresh temporary directory. Keep the
/// returned TempDir alive for the duration of the test.
pub fn test_connection() -> (CsvConnection, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let connection = CsvConnection::new(temp_dir.path()).unwrap();
    (connection, temp_dir)
}

/// An ear tag with a fresh id and the given number.
pub fn tag(number: &str) -> Tag {
    Tag {
        id: uuid::Uuid::new_v4().to_string(),
        label: TagLabel::EarTag,
        number: number.to_string(),
    }
}

/// A minimal wet cow with no tags attached yet.
pub fn sample_cow(ranch_id: &str, cow_id: &str) -> Cow {
    let now = Utc::now();
    Cow {
        id: cow_id.to_string(),
        ranch_id: ranch_id.to_string(),
        description: None,
        status: CowStatus::Wet,
        breed: None,
        birth_month: None,
        birth_year: None,
        pasture_id: None,
        photos: Vec::new(),
        mother_tag: None,
        tags: Vec::new(),
        notes: Vec::new(),
        medical: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}
