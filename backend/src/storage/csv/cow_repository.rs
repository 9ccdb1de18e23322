use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::Arc;
use tracing::{debug, warn};

use super::connection::{write_atomic, CsvConnection};
use crate::domain::models::cow::{Cow, CowStatus, MotherTag};
use crate::storage::traits::CowStorage;

/// Intermediate struct for YAML serialization with string date fields.
/// Tags, notes, and medical issues are row files, not part of the cow
/// document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct YamlCow {
    id: String,
    ranch_id: String,
    description: Option<String>,
    status: String,
    breed: Option<String>,
    birth_month: Option<u32>,
    birth_year: Option<i32>,
    pasture_id: Option<String>,
    #[serde(default)]
    photos: Vec<String>,
    mother_tag: Option<String>,
    created_at: String,
    updated_at: String,
}

/// YAML-based cow repository; one document per cow under the ranch's
/// `cows/` directory.
#[derive(Clone)]
pub struct CowRepository {
    connection: Arc<CsvConnection>,
}

impl CowRepository {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    fn load_cow_file(&self, ranch_id: &str, cow_id: &str) -> Result<Option<Cow>> {
        let yaml_path = self.connection.cow_file(ranch_id, cow_id);

        if !yaml_path.exists() {
            return Ok(None);
        }

        let yaml_content = fs::read_to_string(&yaml_path)?;
        let yaml_cow: YamlCow = serde_yaml::from_str(&yaml_content)?;
        Ok(Some(self.to_domain(yaml_cow, ranch_id)?))
    }

    fn to_domain(&self, yaml_cow: YamlCow, ranch_id: &str) -> Result<Cow> {
        let status = match CowStatus::parse(&yaml_cow.status) {
            Some(status) => status,
            None => {
                warn!(
                    "Unknown status '{}' on cow {} in ranch {}, treating as dry",
                    yaml_cow.status, yaml_cow.id, ranch_id
                );
                CowStatus::Dry
            }
        };

        Ok(Cow {
            id: yaml_cow.id,
            ranch_id: yaml_cow.ranch_id,
            description: yaml_cow.description,
            status,
            breed: yaml_cow.breed,
            birth_month: yaml_cow.birth_month,
            birth_year: yaml_cow.birth_year,
            pasture_id: yaml_cow.pasture_id,
            photos: yaml_cow.photos,
            mother_tag: yaml_cow.mother_tag.map(MotherTag::new),
            tags: Vec::new(),
            notes: Vec::new(),
            medical: Vec::new(),
            created_at: chrono::DateTime::parse_from_rfc3339(&yaml_cow.created_at)
                .map_err(|e| anyhow::anyhow!("Failed to parse created_at: {}", e))?
                .with_timezone(&chrono::Utc),
            updated_at: chrono::DateTime::parse_from_rfc3339(&yaml_cow.updated_at)
                .map_err(|e| anyhow::anyhow!("Failed to parse updated_at: {}", e))?
                .with_timezone(&chrono::Utc),
        })
    }

    fn save_cow(&self, ranch_id: &str, cow: &Cow) -> Result<()> {
        self.connection.ensure_ranch_layout(ranch_id)?;

        let yaml_cow = YamlCow {
            id: cow.id.clone(),
            ranch_id: cow.ranch_id.clone(),
            description: cow.description.clone(),
            status: cow.status.as_str().to_string(),
            breed: cow.breed.clone(),
            birth_month: cow.birth_month,
            birth_year: cow.birth_year,
            pasture_id: cow.pasture_id.clone(),
            photos: cow.photos.clone(),
            mother_tag: cow.mother_tag.as_ref().map(|m| m.number().to_string()),
            created_at: cow.created_at.to_rfc3339(),
            updated_at: cow.updated_at.to_rfc3339(),
        };

        let yaml_content = serde_yaml::to_string(&yaml_cow)?;
        write_atomic(
            &self.connection.cow_file(ranch_id, &cow.id),
            yaml_content.as_bytes(),
        )
    }
}

impl CowStorage for CowRepository {
    fn store_cow(&self, ranch_id: &str, cow: &Cow) -> Result<()> {
        self.save_cow(ranch_id, cow)
    }

    fn get_cow(&self, ranch_id: &str, cow_id: &str) -> Result<Option<Cow>> {
        self.load_cow_file(ranch_id, cow_id)
    }

    fn list_cows(&self, ranch_id: &str) -> Result<Vec<Cow>> {
        let cows_dir = self.connection.cows_directory(ranch_id);

        if !cows_dir.exists() {
            return Ok(Vec::new());
        }

        let mut cows = Vec::new();
        for entry in fs::read_dir(cows_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }

            let cow_id = match path.file_stem().and_then(|n| n.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };

            match self.load_cow_file(ranch_id, &cow_id) {
                Ok(Some(cow)) => cows.push(cow),
                Ok(None) => {}
                Err(e) => warn!("Error loading cow {} in ranch {}: {}", cow_id, ranch_id, e),
            }
        }

        // Creation-descending, the order every herd fetch returns.
        cows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cows)
    }

    fn update_cow(&self, ranch_id: &str, cow: &Cow) -> Result<()> {
        if !self.connection.cow_file(ranch_id, &cow.id).exists() {
            warn!("Attempted to update a non-existent cow: {}", cow.id);
            return Err(anyhow::anyhow!("Cow not found for update"));
        }
        self.save_cow(ranch_id, cow)
    }

    fn delete_cow(&self, ranch_id: &str, cow_id: &str) -> Result<()> {
        let path = self.connection.cow_file(ranch_id, cow_id);
        if path.exists() {
            fs::remove_file(&path)?;
            debug!("Deleted cow file: {:?}", path);
        } else {
            warn!("Attempted to delete a non-existent cow: {}", cow_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::{sample_cow, test_connection};
    use chrono::{Duration, Utc};

    #[test]
    fn store_and_load_cow() {
        let (connection, _temp_dir) = test_connection();
        let repo = CowRepository::new(Arc::new(connection));

        let mut cow = sample_cow("ranch-1", "cow-1");
        cow.description = Some("brindle, gentle".to_string());
        cow.mother_tag = Some(MotherTag::new(" A42 "));
        repo.store_cow("ranch-1", &cow).unwrap();

        let loaded = repo.get_cow("ranch-1", "cow-1").unwrap().unwrap();
        assert_eq!(loaded.description.as_deref(), Some("brindle, gentle"));
        assert_eq!(loaded.status, CowStatus::Wet);
        // Mother tag comes back trimmed, and the aggregate rows are not
        // part of the cow document.
        assert_eq!(loaded.mother_tag.as_ref().unwrap().number(), "A42");
        assert!(loaded.tags.is_empty());
        assert!(loaded.notes.is_empty());
    }

    #[test]
    fn list_cows_creation_descending() {
        let (connection, _temp_dir) = test_connection();
        let repo = CowRepository::new(Arc::new(connection));

        let mut older = sample_cow("ranch-1", "cow-old");
        older.created_at = Utc::now() - Duration::days(2);
        older.updated_at = older.created_at;
        let newer = sample_cow("ranch-1", "cow-new");
        repo.store_cow("ranch-1", &older).unwrap();
        repo.store_cow("ranch-1", &newer).unwrap();

        let cows = repo.list_cows("ranch-1").unwrap();
        assert_eq!(cows.len(), 2);
        assert_eq!(cows[0].id, "cow-new");
        assert_eq!(cows[1].id, "cow-old");
    }

    #[test]
    fn delete_cow_removes_file() {
        let (connection, _temp_dir) = test_connection();
        let repo = CowRepository::new(Arc::new(connection));

        let cow = sample_cow("ranch-1", "cow-1");
        repo.store_cow("ranch-1", &cow).unwrap();
        repo.delete_cow("ranch-1", "cow-1").unwrap();

        assert!(repo.get_cow("ranch-1", "cow-1").unwrap().is_none());
    }

    #[test]
    fn list_cows_for_unknown_ranch_is_empty() {
        let (connection, _temp_dir) = test_connection();
        let repo = CowRepository::new(Arc::new(connection));

        assert!(repo.list_cows("nowhere").unwrap().is_empty());
    }
}
