use anyhow::Result;
use csv::{Reader, Writer};
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use tracing::warn;

use super::connection::{write_atomic, CsvConnection, MEDICAL_HEADER};
use crate::domain::models::cow::MedicalIssue;
use crate::storage::traits::{MedicalRow, MedicalStorage};

/// CSV-based medical-issue repository; one `medical.csv` per ranch.
/// Also answers the store-side label search used by herd search.
#[derive(Clone)]
pub struct MedicalRepository {
    connection: Arc<CsvConnection>,
}

impl MedicalRepository {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    fn read_rows(&self, ranch_id: &str) -> Result<Vec<MedicalRow>> {
        let file_path = self.connection.medical_file(ranch_id);

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
                    warn!("Failed to parse medical date '{}': {}", created_raw, e);
                    continue;
                }
            };

            rows.push(MedicalRow {
                cow_id: record.get(1).unwrap_or("").to_string(),
                issue: MedicalIssue {
                    id: record.get(0).unwrap_or("").to_string(),
                    label: record.get(2).unwrap_or("").to_string(),
                    created_at,
                },
            });
        }

        Ok(rows)
    }

    fn write_rows(&self, ranch_id: &str, rows: &[MedicalRow]) -> Result<()> {
        self.connection.ensure_ranch_layout(ranch_id)?;

        let mut csv_writer = Writer::from_writer(Vec::new());
        csv_writer.write_record(MEDICAL_HEADER)?;
        for row in rows {
            csv_writer.write_record([
                row.issue.id.as_str(),
                row.cow_id.as_str(),
                row.issue.label.as_str(),
                row.issue.created_at.to_rfc3339().as_str(),
            ])?;
        }

        let bytes = csv_writer.into_inner()?;
        write_atomic(&self.connection.medical_file(ranch_id), &bytes)
    }
}

impl MedicalStorage for MedicalRepository {
    fn record_issue(&self, ranch_id: &str, cow_id: &str, issue: &MedicalIssue) -> Result<()> {
        let mut rows = self.read_rows(ranch_id)?;
        rows.push(MedicalRow {
            cow_id: cow_id.to_string(),
            issue: issue.clone(),
        });
        self.write_rows(ranch_id, &rows)
    }

    fn list_issues_for_cow(&self, ranch_id: &str, cow_id: &str) -> Result<Vec<MedicalIssue>> {
        Ok(self
            .read_rows(ranch_id)?
            .into_iter()
            .filter(|row| row.cow_id == cow_id)
            .map(|row| row.issue)
            .collect())
    }

    fn list_issues(&self, ranch_id: &str) -> Result<Vec<MedicalRow>> {
        self.read_rows(ranch_id)
    }

    fn search_labels(&self, ranch_id: &str, query: &str) -> Result<Vec<String>> {
        let needle = query.to_lowercase();
        let mut cow_ids = Vec::new();

        for row in self.read_rows(ranch_id)? {
            if row.issue.label.to_lowercase().contains(&needle)
                && !cow_ids.contains(&row.cow_id)
            {
                cow_ids.push(row.cow_id);
            }
        }

        Ok(cow_ids)
    }

    fn delete_issues_for_cow(&self, ranch_id: &str, cow_id: &str) -> Result<()> {
        let rows = self.read_rows(ranch_id)?;
        let kept: Vec<MedicalRow> =
            rows.into_iter().filter(|row| row.cow_id != cow_id).collect();
        self.write_rows(ranch_id, &kept)
    }
}
