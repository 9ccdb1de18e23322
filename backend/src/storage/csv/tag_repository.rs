use anyhow::Result;
use csv::{Reader, Writer};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use tracing::warn;

use super::connection::{write_atomic, CsvConnection, TAGS_HEADER};
use crate::domain::models::cow::{Tag, TagLabel};
use crate::storage::traits::{TagConflict, TagRow, TagStorage};

/// CSV-based tag repository. One `tags.csv` per ranch holds every tag
/// row of every cow; the ranch-wide unique-number constraint lives
/// here, making this file the final arbiter when two writers race.
#[derive(Clone)]
pub struct TagRepository {
    connection: Arc<CsvConnection>,
}

impl TagRepository {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    fn read_tag_rows(&self, ranch_id: &str) -> Result<Vec<TagRow>> {
        let file_path = self.connection.tags_file(ranch_id);

        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let label_raw = record.get(2).unwrap_or("");
            let label = match TagLabel::parse(label_raw) {
                Some(label) => label,
                None => {
                    warn!("Unknown tag label '{}', treating as other", label_raw);
                    TagLabel::Other
                }
            };

            rows.push(TagRow {
                cow_id: record.get(1).unwrap_or("").to_string(),
                tag: Tag {
                    id: record.get(0).unwrap_or("").to_string(),
                    label,
                    number: record.get(3).unwrap_or("").to_string(),
                },
            });
        }

        Ok(rows)
    }

    fn write_tag_rows(&self, ranch_id: &str, rows: &[TagRow]) -> Result<()> {
        self.connection.ensure_ranch_layout(ranch_id)?;

        let mut csv_writer = Writer::from_writer(Vec::new());
        csv_writer.write_record(TAGS_HEADER)?;
        for row in rows {
            csv_writer.write_record([
                row.tag.id.as_str(),
                row.cow_id.as_str(),
                row.tag.label.as_str(),
                row.tag.number.as_str(),
            ])?;
        }

        let bytes = csv_writer.into_inner()?;
        write_atomic(&self.connection.tags_file(ranch_id), &bytes)
    }
}

impl TagStorage for TagRepository {
    fn insert_tags(&self, ranch_id: &str, cow_id: &str, tags: &[Tag]) -> Result<()> {
        let mut rows = self.read_tag_rows(ranch_id)?;

        // Uniqueness check before anything is written: against the file
        // and within the incoming batch itself.
        let mut batch_numbers: HashSet<&str> = HashSet::new();
        for tag in tags {
            let number = tag.number.trim();
            if let Some(existing) = rows.iter().find(|row| row.tag.number == number) {
                return Err(TagConflict {
                    number: number.to_string(),
                    cow_id: existing.cow_id.clone(),
                }
                .into());
            }
            if !batch_numbers.insert(number) {
                return Err(TagConflict {
                    number: number.to_string(),
                    cow_id: cow_id.to_string(),
                }
                .into());
            }
        }

        for tag in tags {
            rows.push(TagRow {
                cow_id: cow_id.to_string(),
                tag: Tag {
                    id: tag.id.clone(),
                    label: tag.label,
                    number: tag.number.trim().to_string(),
                },
            });
        }

        self.write_tag_rows(ranch_id, &rows)
    }

    fn delete_tags_for_cow(&self, ranch_id: &str, cow_id: &str) -> Result<Vec<Tag>> {
        let rows = self.read_tag_rows(ranch_id)?;

        let (removed, kept): (Vec<TagRow>, Vec<TagRow>) =
            rows.into_iter().partition(|row| row.cow_id == cow_id);

        self.write_tag_rows(ranch_id, &kept)?;
        Ok(removed.into_iter().map(|row| row.tag).collect())
    }

    fn list_tags(&self, ranch_id: &str) -> Result<Vec<TagRow>> {
        self.read_tag_rows(ranch_id)
    }

    fn list_tags_for_cow(&self, ranch_id: &str, cow_id: &str) -> Result<Vec<Tag>> {
        Ok(self
            .read_tag_rows(ranch_id)?
            .into_iter()
            .filter(|row| row.cow_id == cow_id)
            .map(|row| row.tag)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::{tag, test_connection};

    fn setup() -> (TagRepository, tempfile::TempDir) {
        let (connection, temp_dir) = test_connection();
        (TagRepository::new(Arc::new(connection)), temp_dir)
    }

    #[test]
    fn insert_and_list_tags() {
        let (repo, _temp_dir) = setup();

        repo.insert_tags("ranch-1", "cow-1", &[tag("A100"), tag("A101")])
            .unwrap();

        let rows = repo.list_tags("ranch-1").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cow_id, "cow-1");
        assert_eq!(rows[0].tag.number, "A100");

        let cow_tags = repo.list_tags_for_cow("ranch-1", "cow-1").unwrap();
        assert_eq!(cow_tags.len(), 2);
    }

    #[test]
    fn insert_conflicting_number_names_holder() {
        let (repo, _temp_dir) = setup();

        repo.insert_tags("ranch-1", "cow-1", &[tag("A100")]).unwrap();
        let err = repo
            .insert_tags("ranch-1", "cow-2", &[tag("A100")])
            .unwrap_err();

        let conflict = err.downcast_ref::<TagConflict>().expect("typed conflict");
        assert_eq!(conflict.number, "A100");
        assert_eq!(conflict.cow_id, "cow-1");

        // Nothing written for the losing cow.
        assert!(repo.list_tags_for_cow("ranch-1", "cow-2").unwrap().is_empty());
    }

    #[test]
    fn insert_trims_numbers_before_comparing() {
        let (repo, _temp_dir) = setup();

        repo.insert_tags("ranch-1", "cow-1", &[tag("A100")]).unwrap();
        let err = repo
            .insert_tags("ranch-1", "cow-2", &[tag("  A100 ")])
            .unwrap_err();
        assert!(err.downcast_ref::<TagConflict>().is_some());

        // Case matters: a100 is a different number.
        repo.insert_tags("ranch-1", "cow-2", &[tag("a100")]).unwrap();
    }

    #[test]
    fn batch_internal_duplicate_rejected() {
        let (repo, _temp_dir) = setup();

        let err = repo
            .insert_tags("ranch-1", "cow-1", &[tag("A100"), tag("A100")])
            .unwrap_err();

        let conflict = err.downcast_ref::<TagConflict>().expect("typed conflict");
        assert_eq!(conflict.cow_id, "cow-1");
        assert!(repo.list_tags("ranch-1").unwrap().is_empty());
    }

    #[test]
    fn delete_tags_returns_removed_rows_in_order() {
        let (repo, _temp_dir) = setup();

        repo.insert_tags("ranch-1", "cow-1", &[tag("A100"), tag("B7")])
            .unwrap();
        repo.insert_tags("ranch-1", "cow-2", &[tag("C3")]).unwrap();

        let removed = repo.delete_tags_for_cow("ranch-1", "cow-1").unwrap();
        assert_eq!(
            removed.iter().map(|t| t.number.as_str()).collect::<Vec<_>>(),
            vec!["A100", "B7"]
        );

        let remaining = repo.list_tags("ranch-1").unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].cow_id, "cow-2");

        // Freed numbers can be reused.
        repo.insert_tags("ranch-1", "cow-3", &[tag("A100")]).unwrap();
    }
}
