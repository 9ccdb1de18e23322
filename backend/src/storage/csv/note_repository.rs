use anyhow::Result;
use csv::{Reader, Writer};
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use tracing::warn;

use super::connection::{write_atomic, CsvConnection, NOTES_HEADER};
use crate::domain::models::cow::Note;
use crate::storage::traits::{NoteRow, NoteStorage};

/// CSV-based note repository; one `notes.csv` per ranch with a cow_id
/// column. Notes are append-only.
#[derive(Clone)]
pub struct NoteRepository {
    connection: Arc<CsvConnection>,
}

impl NoteRepository {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    fn read_note_rows(&self, ranch_id: &str) -> Result<Vec<NoteRow>> {
        let file_path = self.connection.notes_file(ranch_id);

        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let created_raw = record.get(3).unwrap_or("");
            let created_at = match chrono::DateTime::parse_from_rfc3339(created_raw) {
                Ok(dt) => dt.with_timezone(&chrono::Utc),
                Err(e) => {
                    warn!("Failed to parse note date '{}': {}", created_raw, e);
                    continue;
                }
            };

            rows.push(NoteRow {
                cow_id: record.get(1).unwrap_or("").to_string(),
                note: Note {
                    id: record.get(0).unwrap_or("").to_string(),
                    text: record.get(2).unwrap_or("").to_string(),
                    created_at,
                },
            });
        }

        Ok(rows)
    }

    fn write_note_rows(&self, ranch_id: &str, rows: &[NoteRow]) -> Result<()> {
        self.connection.ensure_ranch_layout(ranch_id)?;

        let mut csv_writer = Writer::from_writer(Vec::new());
        csv_writer.write_record(NOTES_HEADER)?;
        for row in rows {
            csv_writer.write_record([
                row.note.id.as_str(),
                row.cow_id.as_str(),
                row.note.text.as_str(),
                row.note.created_at.to_rfc3339().as_str(),
            ])?;
        }

        let bytes = csv_writer.into_inner()?;
        write_atomic(&self.connection.notes_file(ranch_id), &bytes)
    }
}

impl NoteStorage for NoteRepository {
    fn append_note(&self, ranch_id: &str, cow_id: &str, note: &Note) -> Result<()> {
        let mut rows = self.read_note_rows(ranch_id)?;
        rows.push(NoteRow {
            cow_id: cow_id.to_string(),
            note: note.clone(),
        });
        self.write_note_rows(ranch_id, &rows)
    }

    fn list_notes_for_cow(&self, ranch_id: &str, cow_id: &str) -> Result<Vec<Note>> {
        Ok(self
            .read_note_rows(ranch_id)?
            .into_iter()
            .filter(|row| row.cow_id == cow_id)
            .map(|row| row.note)
            .collect())
    }

    fn list_notes(&self, ranch_id: &str) -> Result<Vec<NoteRow>> {
        self.read_note_rows(ranch_id)
    }

    fn delete_notes_for_cow(&self, ranch_id: &str, cow_id: &str) -> Result<()> {
        let rows = self.read_note_rows(ranch_id)?;
        let kept: Vec<NoteRow> = rows.into_iter().filter(|row| row.cow_id != cow_id).collect();
        self.write_note_rows(ranch_id, &kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::test_connection;
    use chrono::Utc;

    fn note(id: &str, text: &str) -> Note {
        Note {
            id: id.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn append_preserves_order() {
        let (connection, _temp_dir) = test_connection();
        let repo = NoteRepository::new(Arc::new(connection));

        repo.append_note("ranch-1", "cow-1", &note("n1", "weaned"))
            .unwrap();
        repo.append_note("ranch-1", "cow-1", &note("n2", "moved to north pasture"))
            .unwrap();
        repo.append_note("ranch-1", "cow-2", &note("n3", "limping, watch her"))
            .unwrap();

        let notes = repo.list_notes_for_cow("ranch-1", "cow-1").unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].text, "weaned");
        assert_eq!(notes[1].text, "moved to north pasture");
    }

    #[test]
    fn notes_with_commas_round_trip() {
        let (connection, _temp_dir) = test_connection();
        let repo = NoteRepository::new(Arc::new(connection));

        let text = "vet visit, gave LA-300, recheck \"next week\"";
        repo.append_note("ranch-1", "cow-1", &note("n1", text)).unwrap();

        let notes = repo.list_notes_for_cow("ranch-1", "cow-1").unwrap();
        assert_eq!(notes[0].text, text);
    }

    #[test]
    fn delete_notes_for_cow_keeps_others() {
        let (connection, _temp_dir) = test_connection();
        let repo = NoteRepository::new(Arc::new(connection));

        repo.append_note("ranch-1", "cow-1", &note("n1", "a")).unwrap();
        repo.append_note("ranch-1", "cow-2", &note("n2", "b")).unwrap();

        repo.delete_notes_for_cow("ranch-1", "cow-1").unwrap();

        assert!(repo.list_notes_for_cow("ranch-1", "cow-1").unwrap().is_empty());
        assert_eq!(repo.list_notes("ranch-1").unwrap().len(), 1);
    }
}
