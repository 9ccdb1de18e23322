//! Herd export domain logic.
//!
//! Builds the one-worksheet herd spreadsheet as CSV content with a
//! fixed column order, plus the export-to-path variant with a sanitized
//! destination. Binary spreadsheet encoding and mail/share delivery
//! stay with the platform integrations.

use anyhow::Result;
use chrono::Utc;
use csv::Writer;
use std::fs;
use tracing::{error, info};

use crate::domain::commands::export::{
    ExportHerdCommand, ExportHerdResult, ExportToPathCommand, ExportToPathResult,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::herd_service::HerdService;
use crate::domain::models::cow::Cow;
use crate::domain::models::ranch::Pasture;
use crate::domain::ranch_service::RanchService;
use crate::storage::traits::Connection;

const COLUMNS: [&str; 10] = [
    "Primary Tag",
    "All Tags",
    "Status",
    "Breed",
    "Born",
    "Pasture",
    "Description",
    "Notes",
    "Photos",
    "Added",
];

/// Export service that handles all herd-export business logic.
#[derive(Clone)]
pub struct ExportService {
    // No internal state needed for now
}

impl ExportService {
    pub fn new() -> Self {
        Self {}
    }

    /// Export the herd as CSV content with complete orchestration:
    /// ranch lookup for the filename, herd fetch, row assembly.
    pub fn export_herd_csv<C: Connection>(
        &self,
        request: ExportHerdCommand,
        herd_service: &HerdService<C>,
        ranch_service: &RanchService,
    ) -> DomainResult<ExportHerdResult> {
        info!("Exporting herd for ranch {}", request.ranch_id);

        let ranch = ranch_service.get_ranch(&request.ranch_id)?;
        let pastures = ranch_service.list_pastures(&request.ranch_id)?;

        let mut cows = herd_service.list_cows(&request.ranch_id)?;
        // Oldest first, so the sheet reads in the order the herd grew.
        cows.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let csv_content =
            build_csv(&cows, &pastures).map_err(DomainError::from_store)?;

        let filename = format!(
            "{}_herd_{}.csv",
            ranch.name.replace(' ', "_").to_lowercase(),
            Utc::now().format("%Y%m%d")
        );

        info!(
            "Exported {} cow(s) for ranch '{}' ({} bytes) as {}",
            cows.len(),
            ranch.name,
            csv_content.len(),
            filename
        );

        Ok(ExportHerdResult {
            csv_content,
            filename,
            cow_count: cows.len(),
            ranch_name: ranch.name,
        })
    }

    /// Export directly to a path (or the default Documents location).
    pub fn export_to_path<C: Connection>(
        &self,
        request: ExportToPathCommand,
        herd_service: &HerdService<C>,
        ranch_service: &RanchService,
    ) -> DomainResult<ExportToPathResult> {
        info!(
            "Exporting herd to path for ranch {} - custom_path: {:?}",
            request.ranch_id, request.custom_path
        );

        let export = self.export_herd_csv(
            ExportHerdCommand {
                ranch_id: request.ranch_id,
            },
            herd_service,
            ranch_service,
        )?;

        let export_dir = match request.custom_path {
            Some(custom_path) if !custom_path.trim().is_empty() => {
                std::path::PathBuf::from(self.sanitize_path(&custom_path))
            }
            _ => match dirs::document_dir().or_else(dirs::home_dir) {
                Some(dir) => dir,
                None => {
                    error!("Could not determine default export directory");
                    return Ok(ExportToPathResult {
                        success: false,
                        message: "Failed to determine export directory".to_string(),
                        file_path: String::new(),
                        cow_count: 0,
                    });
                }
            },
        };

        let file_path = export_dir.join(&export.filename);

        if let Some(parent_dir) = file_path.parent() {
            if let Err(e) = fs::create_dir_all(parent_dir) {
                error!("Failed to create export directory {:?}: {}", parent_dir, e);
                return Ok(ExportToPathResult {
                    success: false,
                    message: format!("Failed to create export directory: {}", e),
                    file_path: parent_dir.to_string_lossy().to_string(),
                    cow_count: 0,
                });
            }
        }

        match fs::write(&file_path, &export.csv_content) {
            Ok(_) => {
                let file_path_str = file_path.to_string_lossy().to_string();
                info!(
                    "Exported {} cow(s) for '{}' to: {}",
                    export.cow_count, export.ranch_name, file_path_str
                );
                Ok(ExportToPathResult {
                    success: true,
                    message: format!("File exported successfully to: {}", file_path_str),
                    file_path: file_path_str,
                    cow_count: export.cow_count,
                })
            }
            Err(e) => {
                error!("Failed to write export file to {:?}: {}", file_path, e);
                Ok(ExportToPathResult {
                    success: false,
                    message: format!("Failed to write export file: {}", e),
                    file_path: file_path.to_string_lossy().to_string(),
                    cow_count: 0,
                })
            }
        }
    }

    /// Basic path sanitization to handle common user input issues.
    fn sanitize_path(&self, path: &str) -> String {
        let mut cleaned = path.trim().to_string();

        if (cleaned.starts_with('"') && cleaned.ends_with('"'))
            || (cleaned.starts_with('\'') && cleaned.ends_with('\''))
        {
            cleaned = cleaned[1..cleaned.len() - 1].to_string();
        }

        cleaned = cleaned.trim().to_string();
        cleaned = cleaned.replace("\\ ", " ");

        while cleaned.ends_with('/') || cleaned.ends_with('\\') {
            cleaned.pop();
        }

        if cleaned.starts_with('~') {
            if let Some(home) = dirs::home_dir() {
                if cleaned == "~" {
                    cleaned = home.to_string_lossy().to_string();
                } else if cleaned.starts_with("~/") || cleaned.starts_with("~\\") {
                    cleaned = home.join(&cleaned[2..]).to_string_lossy().to_string();
                }
            }
        }

        cleaned
    }
}

impl Default for ExportService {
    fn default() -> Self {
        Self::new()
    }
}

fn build_csv(cows: &[Cow], pastures: &[Pasture]) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS)?;

    for cow in cows {
        let pasture_name = cow
            .pasture_id
            .as_deref()
            .and_then(|id| pastures.iter().find(|p| p.id == id))
            .map(|p| p.name.clone())
            .unwrap_or_default();

        let all_tags = cow
            .tags
            .iter()
            .map(|t| format!("{}: {}", t.label.as_str(), t.number))
            .collect::<Vec<_>>()
            .join(", ");

        let born = match (cow.birth_month, cow.birth_year) {
            (Some(month), Some(year)) => format!("{:02}/{}", month, year),
            _ => String::new(),
        };

        let notes = cow
            .notes
            .iter()
            .map(|n| format!("{}: {}", n.created_at.format("%Y-%m-%d"), n.text))
            .collect::<Vec<_>>()
            .join(" | ");

        writer.write_record([
            cow.primary_tag().map(|t| t.number.as_str()).unwrap_or(""),
            all_tags.as_str(),
            cow.status.as_str().to_uppercase().as_str(),
            cow.breed.as_deref().unwrap_or(""),
            born.as_str(),
            pasture_name.as_str(),
            cow.description.as_deref().unwrap_or(""),
            notes.as_str(),
            cow.photos.len().to_string().as_str(),
            cow.created_at.format("%Y-%m-%d").to_string().as_str(),
        ])?;
    }

    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing_service::BillingService;
    use crate::domain::commands::herd::{AddNoteCommand, CreateCowCommand, TagDraft};
    use crate::domain::commands::ranches::{AddPastureCommand, CreateRanchCommand};
    use crate::domain::models::cow::{CowStatus, TagLabel};
    use crate::storage::csv::test_utils::test_connection;
    use crate::storage::csv::{CsvConnection, PastureRepository};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Fixture {
        export_service: ExportService,
        herd_service: HerdService<CsvConnection>,
        ranch_service: RanchService,
        ranch_id: String,
        _temp_dir: TempDir,
    }

    fn setup() -> Fixture {
        let (connection, temp_dir) = test_connection();
        let conn = Arc::new(connection);

        let ranch_service = RanchService::new(conn.clone());
        let ranch = ranch_service
            .create_ranch(CreateRanchCommand {
                name: "Bar W".to_string(),
                owner_user_id: "user-1".to_string(),
                owner_email: "owner@ranch.example".to_string(),
            })
            .unwrap()
            .ranch;

        let herd_service = HerdService::new(
            conn.as_ref().clone(),
            BillingService::new(conn.clone()),
            PastureRepository::new(conn.clone()),
        );

        Fixture {
            export_service: ExportService::new(),
            herd_service,
            ranch_service,
            ranch_id: ranch.id,
            _temp_dir: temp_dir,
        }
    }

    fn full_cow_command(fixture: &Fixture, pasture_id: &str) -> CreateCowCommand {
        CreateCowCommand {
            ranch_id: fixture.ranch_id.clone(),
            description: Some("gentle, good mother".to_string()),
            status: CowStatus::Wet,
            breed: Some("Angus".to_string()),
            birth_month: Some(3),
            birth_year: Some(2022),
            pasture_id: Some(pasture_id.to_string()),
            photos: vec!["photo-1.jpg".to_string(), "photo-2.jpg".to_string()],
            mother_tag: None,
            tags: vec![
                TagDraft {
                    label: TagLabel::EarTag,
                    number: "A100".to_string(),
                },
                TagDraft {
                    label: TagLabel::Rfid,
                    number: "R-1".to_string(),
                },
            ],
        }
    }

    #[test]
    fn export_has_fixed_column_order_and_formats() {
        let fixture = setup();

        let pasture = fixture
            .ranch_service
            .add_pasture(AddPastureCommand {
                ranch_id: fixture.ranch_id.clone(),
                name: "North Forty".to_string(),
            })
            .unwrap()
            .pasture;

        let cow = fixture
            .herd_service
            .create_cow(full_cow_command(&fixture, &pasture.id))
            .unwrap()
            .cow;
        fixture
            .herd_service
            .add_note(AddNoteCommand {
                ranch_id: fixture.ranch_id.clone(),
                cow_id: cow.id.clone(),
                text: "weaned".to_string(),
            })
            .unwrap();

        let result = fixture
            .export_service
            .export_herd_csv(
                ExportHerdCommand {
                    ranch_id: fixture.ranch_id.clone(),
                },
                &fixture.herd_service,
                &fixture.ranch_service,
            )
            .unwrap();

        assert_eq!(result.cow_count, 1);
        assert_eq!(result.ranch_name, "Bar W");
        assert!(result.filename.starts_with("bar_w_herd_"));
        assert!(result.filename.ends_with(".csv"));

        let mut lines = result.csv_content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Primary Tag,All Tags,Status,Breed,Born,Pasture,Description,Notes,Photos,Added"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("A100,"));
        assert!(row.contains("ear tag: A100, RFID: R-1"));
        assert!(row.contains("WET"));
        assert!(row.contains("Angus"));
        assert!(row.contains("03/2022"));
        assert!(row.contains("North Forty"));
        assert!(row.contains(": weaned"));
        assert!(row.contains(",2,"));
    }

    #[test]
    fn export_empty_herd_is_header_only() {
        let fixture = setup();

        let result = fixture
            .export_service
            .export_herd_csv(
                ExportHerdCommand {
                    ranch_id: fixture.ranch_id.clone(),
                },
                &fixture.herd_service,
                &fixture.ranch_service,
            )
            .unwrap();

        assert_eq!(result.cow_count, 0);
        assert_eq!(result.csv_content.lines().count(), 1);
    }

    #[test]
    fn export_to_path_writes_the_file() {
        let fixture = setup();
        let dest = TempDir::new().unwrap();

        let result = fixture
            .export_service
            .export_to_path(
                ExportToPathCommand {
                    ranch_id: fixture.ranch_id.clone(),
                    custom_path: Some(dest.path().to_string_lossy().to_string()),
                },
                &fixture.herd_service,
                &fixture.ranch_service,
            )
            .unwrap();

        assert!(result.success);
        let written = fs::read_to_string(&result.file_path).unwrap();
        assert!(written.starts_with("Primary Tag,"));
    }

    #[test]
    fn sanitize_path_handles_quotes_spaces_and_slashes() {
        let service = ExportService::new();

        assert_eq!(service.sanitize_path("  /path/to/dir  "), "/path/to/dir");
        assert_eq!(service.sanitize_path("\"/path/to/dir\""), "/path/to/dir");
        assert_eq!(service.sanitize_path("/path\\ to\\ dir"), "/path to dir");
        assert_eq!(service.sanitize_path("/path/to/dir/"), "/path/to/dir");
    }
}
