use anyhow::Result;
use csv::{Reader, Writer};
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use tracing::warn;

use super::connection::{write_atomic, CsvConnection, PASTURES_HEADER};
use crate::domain::models::ranch::Pasture;
use crate::storage::traits::PastureStorage;

/// CSV-based pasture repository; one `pastures.csv` per ranch.
#[derive(Clone)]
pub struct PastureRepository {
    connection: Arc<CsvConnection>,
}

impl PastureRepository {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    fn read_pastures(&self, ranch_id: &str) -> Result<Vec<Pasture>> {
        let file_path = self.connection.pastures_file(ranch_id);

        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut pastures = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let created_raw = record.get(2).unwrap_or("");
            let created_at = match chrono::DateTime::parse_from_rfc3339(created_raw) {
                Ok(dt) => dt.with_timezone(&chrono::Utc),
                Err(e) => {
                    warn!("Failed to parse pasture date '{}': {}", created_raw, e);
                    continue;
                }
            };

            pastures.push(Pasture {
                id: record.get(0).unwrap_or("").to_string(),
                name: record.get(1).unwrap_or("").to_string(),
                created_at,
            });
        }

        Ok(pastures)
    }

    fn write_pastures(&self, ranch_id: &str, pastures: &[Pasture]) -> Result<()> {
        self.connection.ensure_ranch_layout(ranch_id)?;

        let mut csv_writer = Writer::from_writer(Vec::new());
        csv_writer.write_record(PASTURES_HEADER)?;
        for pasture in pastures {
            csv_writer.write_record([
                pasture.id.as_str(),
                pasture.name.as_str(),
                pasture.created_at.to_rfc3339().as_str(),
            ])?;
        }

        let bytes = csv_writer.into_inner()?;
        write_atomic(&self.connection.pastures_file(ranch_id), &bytes)
    }
}

impl PastureStorage for PastureRepository {
    fn store_pasture(&self, ranch_id: &str, pasture: &Pasture) -> Result<()> {
        let mut pastures = self.read_pastures(ranch_id)?;
        pastures.push(pasture.clone());
        self.write_pastures(ranch_id, &pastures)
    }

    fn list_pastures(&self, ranch_id: &str) -> Result<Vec<Pasture>> {
        self.read_pastures(ranch_id)
    }

    fn delete_pasture(&self, ranch_id: &str, pasture_id: &str) -> Result<()> {
        let pastures = self.read_pastures(ranch_id)?;
        let kept: Vec<Pasture> = pastures
            .into_iter()
            .filter(|p| p.id != pasture_id)
            .collect();
        self.write_pastures(ranch_id, &kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::test_connection;
    use chrono::Utc;

    #[test]
    fn store_list_delete_pasture() {
        let (connection, _temp_dir) = test_connection();
        let repo = PastureRepository::new(Arc::new(connection));

        let pasture = Pasture {
            id: "p1".to_string(),
            name: "North Forty".to_string(),
            created_at: Utc::now(),
        };
        repo.store_pasture("ranch-1", &pasture).unwrap();

        let pastures = repo.list_pastures("ranch-1").unwrap();
        assert_eq!(pastures.len(), 1);
        assert_eq!(pastures[0].name, "North Forty");

        repo.delete_pasture("ranch-1", "p1").unwrap();
        assert!(repo.list_pastures("ranch-1").unwrap().is_empty());
    }
}
