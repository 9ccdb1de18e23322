use anyhow::Result;
use csv::{Reader, Writer};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::connection::{write_atomic, CsvConnection, PRESETS_HEADER};
use crate::storage::traits::PresetStorage;

/// CSV-based preset repository for the ranch-scoped suggestion lists
/// (breeds, medical labels). One label per row, deduplicated on add by
/// exact trimmed match.
#[derive(Clone)]
pub struct PresetRepository {
    connection: Arc<CsvConnection>,
}

impl PresetRepository {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    fn read_labels(&self, file_path: &Path) -> Result<Vec<String>> {
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut labels = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            if let Some(label) = record.get(0) {
                labels.push(label.to_string());
            }
        }

        Ok(labels)
    }

    fn write_labels(&self, ranch_id: &str, file_path: &PathBuf, labels: &[String]) -> Result<()> {
        self.connection.ensure_ranch_layout(ranch_id)?;

        let mut csv_writer = Writer::from_writer(Vec::new());
        csv_writer.write_record(PRESETS_HEADER)?;
        for label in labels {
            csv_writer.write_record([label.as_str()])?;
        }

        let bytes = csv_writer.into_inner()?;
        write_atomic(file_path, &bytes)
    }

    fn add_label(&self, ranch_id: &str, file_path: PathBuf, label: &str) -> Result<bool> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }

        let mut labels = self.read_labels(&file_path)?;
        if labels.iter().any(|existing| existing == trimmed) {
            return Ok(false);
        }

        labels.push(trimmed.to_string());
        self.write_labels(ranch_id, &file_path, &labels)?;
        Ok(true)
    }
}

impl PresetStorage for PresetRepository {
    fn add_breed(&self, ranch_id: &str, label: &str) -> Result<bool> {
        self.add_label(ranch_id, self.connection.breeds_file(ranch_id), label)
    }

    fn list_breeds(&self, ranch_id: &str) -> Result<Vec<String>> {
        self.read_labels(&self.connection.breeds_file(ranch_id))
    }

    fn add_medical_preset(&self, ranch_id: &str, label: &str) -> Result<bool> {
        self.add_label(
            ranch_id,
            self.connection.medical_presets_file(ranch_id),
            label,
        )
    }

    fn list_medical_presets(&self, ranch_id: &str) -> Result<Vec<String>> {
        self.read_labels(&self.connection.medical_presets_file(ranch_id))
    }
}
