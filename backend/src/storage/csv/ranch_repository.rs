use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::Arc;
use tracing::{debug, warn};

use super::connection::{write_atomic, CsvConnection};
use crate::domain::models::billing::{RanchBilling, Tier};
use crate::domain::models::ranch::Ranch;
use crate::storage::traits::RanchStorage;

/// Intermediate struct for YAML serialization with string date fields
#[derive(Debug, Clone, Serialize, Deserialize)]
struct YamlRanch {
    id: String,
    name: String,
    owner_user_id: String,
    subscription_tier: String,
    subscription_status: String,
    subscription_override: Option<String>,
    trial_ends_at: Option<String>,
    current_period_end: Option<String>,
    peak_cow_count: u32,
    created_at: String,
}

/// YAML-based ranch repository; one directory per ranch, discovered by
/// scanning the base directory.
#[derive(Clone)]
pub struct RanchRepository {
    connection: Arc<CsvConnection>,
}

impl RanchRepository {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    fn load_ranch_from_directory(&self, ranch_id: &str) -> Result<Option<Ranch>> {
        let yaml_path = self.connection.ranch_file(ranch_id);

        if !yaml_path.exists() {
            return Ok(None);
        }

        let yaml_content = fs::read_to_string(&yaml_path)?;
        let yaml_ranch: YamlRanch = serde_yaml::from_str(&yaml_content)?;

        let tier = match Tier::parse(&yaml_ranch.subscription_tier) {
            Some(tier) => tier,
            None => {
                warn!(
                    "Unknown subscription tier '{}' on ranch {}, treating as free",
                    yaml_ranch.subscription_tier, ranch_id
                );
                Tier::Free
            }
        };

        let ranch = Ranch {
            id: yaml_ranch.id,
            name: yaml_ranch.name,
            owner_user_id: yaml_ranch.owner_user_id,
            billing: RanchBilling {
                subscription_tier: tier,
                subscription_status: yaml_ranch.subscription_status,
                subscription_override: yaml_ranch.subscription_override,
                trial_ends_at: parse_optional_date(yaml_ranch.trial_ends_at.as_deref())?,
                current_period_end: parse_optional_date(
                    yaml_ranch.current_period_end.as_deref(),
                )?,
                peak_cow_count: yaml_ranch.peak_cow_count,
            },
            created_at: chrono::DateTime::parse_from_rfc3339(&yaml_ranch.created_at)
                .map_err(|e| anyhow::anyhow!("Failed to parse created_at: {}", e))?
                .with_timezone(&chrono::Utc),
        };

        Ok(Some(ranch))
    }

    fn save_ranch(&self, ranch: &Ranch) -> Result<()> {
        self.connection.ensure_ranch_layout(&ranch.id)?;

        let yaml_ranch = YamlRanch {
            id: ranch.id.clone(),
            name: ranch.name.clone(),
            owner_user_id: ranch.owner_user_id.clone(),
            subscription_tier: ranch.billing.subscription_tier.as_str().to_string(),
            subscription_status: ranch.billing.subscription_status.clone(),
            subscription_override: ranch.billing.subscription_override.clone(),
            trial_ends_at: ranch.billing.trial_ends_at.map(|d| d.to_rfc3339()),
            current_period_end: ranch.billing.current_period_end.map(|d| d.to_rfc3339()),
            peak_cow_count: ranch.billing.peak_cow_count,
            created_at: ranch.created_at.to_rfc3339(),
        };

        let yaml_content = serde_yaml::to_string(&yaml_ranch)?;
        write_atomic(&self.connection.ranch_file(&ranch.id), yaml_content.as_bytes())
    }
}

fn parse_optional_date(
    value: Option<&str>,
) -> Result<Option<chrono::DateTime<chrono::Utc>>> {
    match value {
        Some(raw) => Ok(Some(
            chrono::DateTime::parse_from_rfc3339(raw)
                .map_err(|e| anyhow::anyhow!("Failed to parse date '{}': {}", raw, e))?
                .with_timezone(&chrono::Utc),
        )),
        None => Ok(None),
    }
}

impl RanchStorage for RanchRepository {
    fn store_ranch(&self, ranch: &Ranch) -> Result<()> {
        self.save_ranch(ranch)
    }

    fn get_ranch(&self, ranch_id: &str) -> Result<Option<Ranch>> {
        self.load_ranch_from_directory(ranch_id)
    }

    fn list_ranches(&self) -> Result<Vec<Ranch>> {
        let base_dir = self.connection.base_directory();

        if !base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut ranches = Vec::new();
        for entry in fs::read_dir(base_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let dir_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => {
                    warn!("Skipping directory with invalid name: {:?}", path);
                    continue;
                }
            };

            match self.load_ranch_from_directory(&dir_name) {
                Ok(Some(ranch)) => ranches.push(ranch),
                Ok(None) => debug!("Directory {} has no ranch.yaml, skipping", dir_name),
                Err(e) => warn!("Error loading ranch from directory {}: {}", dir_name, e),
            }
        }

        ranches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(ranches)
    }

    fn update_ranch(&self, ranch: &Ranch) -> Result<()> {
        if !self.connection.ranch_file(&ranch.id).exists() {
            warn!("Attempted to update a non-existent ranch: {}", ranch.id);
            return Err(anyhow::anyhow!("Ranch not found for update"));
        }
        self.save_ranch(ranch)
    }

    fn delete_ranch(&self, ranch_id: &str) -> Result<()> {
        let ranch_dir = self.connection.ranch_directory(ranch_id);
        if ranch_dir.exists() {
            fs::remove_dir_all(&ranch_dir)?;
            debug!("Deleted ranch directory: {:?}", ranch_dir);
        } else {
            warn!("Attempted to delete a non-existent ranch: {}", ranch_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::test_connection;
    use chrono::Utc;

    fn sample_ranch(id: &str) -> Ranch {
        Ranch {
            id: id.to_string(),
            name: "Bar W".to_string(),
            owner_user_id: "user-1".to_string(),
            billing: RanchBilling::free(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn store_and_load_ranch() {
        let (connection, _temp_dir) = test_connection();
        let repo = RanchRepository::new(Arc::new(connection));

        let ranch = sample_ranch("ranch-1");
        repo.store_ranch(&ranch).unwrap();

        let loaded = repo.get_ranch("ranch-1").unwrap().unwrap();
        assert_eq!(loaded.name, "Bar W");
        assert_eq!(loaded.billing.subscription_tier, Tier::Free);
        assert_eq!(loaded.billing.peak_cow_count, 0);
    }

    #[test]
    fn list_ranches_sorted_by_name() {
        let (connection, _temp_dir) = test_connection();
        let repo = RanchRepository::new(Arc::new(connection));

        let mut first = sample_ranch("ranch-a");
        first.name = "Windmill".to_string();
        let mut second = sample_ranch("ranch-b");
        second.name = "Antler Creek".to_string();
        repo.store_ranch(&first).unwrap();
        repo.store_ranch(&second).unwrap();

        let ranches = repo.list_ranches().unwrap();
        assert_eq!(ranches.len(), 2);
        assert_eq!(ranches[0].name, "Antler Creek");
    }

    #[test]
    fn delete_ranch_removes_directory() {
        let (connection, _temp_dir) = test_connection();
        let repo = RanchRepository::new(Arc::new(connection.clone()));

        repo.store_ranch(&sample_ranch("ranch-1")).unwrap();
        assert!(connection.ranch_directory("ranch-1").exists());

        repo.delete_ranch("ranch-1").unwrap();
        assert!(!connection.ranch_directory("ranch-1").exists());
        assert!(repo.get_ranch("ranch-1").unwrap().is_none());
    }

    #[test]
    fn update_nonexistent_ranch_fails() {
        let (connection, _temp_dir) = test_connection();
        let repo = RanchRepository::new(Arc::new(connection));

        assert!(repo.update_ranch(&sample_ranch("ghost")).is_err());
    }

    #[test]
    fn billing_round_trip_with_trial() {
        let (connection, _temp_dir) = test_connection();
        let repo = RanchRepository::new(Arc::new(connection));

        let mut ranch = sample_ranch("ranch-1");
        ranch.billing.subscription_override = Some("trial".to_string());
        ranch.billing.trial_ends_at = Some(Utc::now());
        repo.store_ranch(&ranch).unwrap();

        let loaded = repo.get_ranch("ranch-1").unwrap().unwrap();
        assert_eq!(
            loaded.billing.subscription_override.as_deref(),
            Some("trial")
        );
        assert!(loaded.billing.trial_ends_at.is_some());
    }
}
